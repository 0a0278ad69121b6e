//! Rendering results

use serde::{Deserialize, Serialize};

/// What a rendering depicts
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderKind {
    Text,
    ConceptualChain,
    Equations,
    /// Inline LaTeX-ish equation listing
    Equation,
    ThoughtTree,
    StepByStep,
}

impl RenderKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::ConceptualChain => "conceptual_chain",
            Self::Equations => "equations",
            Self::Equation => "equation",
            Self::ThoughtTree => "thought_tree",
            Self::StepByStep => "step_by_step",
        }
    }
}

impl std::fmt::Display for RenderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encoding of `content`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderFormat {
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "image/png;base64")]
    PngBase64,
    #[serde(rename = "latex")]
    Latex,
}

/// `{type, format, content, ...}` record produced for every sketch
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rendering {
    #[serde(rename = "type")]
    pub kind: RenderKind,

    pub format: RenderFormat,

    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edges: Option<Vec<(String, String)>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equations: Option<Vec<String>>,

    /// Set when rendering failed and `content` fell back to the input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Rendering {
    pub fn new(kind: RenderKind, format: RenderFormat, content: impl Into<String>) -> Self {
        Self {
            kind,
            format,
            content: content.into(),
            nodes: None,
            edges: None,
            equations: None,
            error: None,
        }
    }

    /// Unrendered text
    pub fn text(content: impl Into<String>) -> Self {
        Self::new(RenderKind::Text, RenderFormat::Text, content)
    }

    /// Text fallback carrying the failure
    pub fn degraded(content: impl Into<String>, error: impl ToString) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::text(content)
        }
    }

    pub const fn is_image(&self) -> bool {
        matches!(self.format, RenderFormat::PngBase64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_rendering_serializes_compactly() {
        let value = serde_json::to_value(Rendering::text("hello")).unwrap();
        assert_eq!(value, json!({"type": "text", "format": "text", "content": "hello"}));
    }

    #[test]
    fn test_degraded_carries_error() {
        let value = serde_json::to_value(Rendering::degraded("x = 1", "no font")).unwrap();
        assert_eq!(value["type"], "text");
        assert_eq!(value["error"], "no font");
    }

    #[test]
    fn test_png_format_name() {
        let r = Rendering::new(RenderKind::ConceptualChain, RenderFormat::PngBase64, "");
        assert_eq!(serde_json::to_value(&r).unwrap()["format"], "image/png;base64");
        assert!(r.is_image());
    }
}
