//! Response Extraction
//!
//! Recovers structured fields from free-form completions. Nothing here fails loudly:
//! a missing marker or unparsable JSON is reported as `None` and callers fall back to
//! the raw text.

use serde_json::Value;

/// Text between the first `start` marker and the first `end` marker after it
///
/// Returns `None` when `start` is absent. When `end` is absent the rest of the text
/// after `start` is returned. Markers are literal strings.
pub fn extract_between<'a>(text: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let from = text.find(start)? + start.len();
    let rest = &text[from..];

    Some(rest.find(end).map_or(rest, |to| &rest[..to]))
}

/// Parse the JSON embedded in `text`
///
/// Tries the span from the first `{` to the last `}` first, then the whole text.
pub fn extract_json(text: &str) -> Option<Value> {
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            match serde_json::from_str(&text[start..=end]) {
                Ok(value) => return Some(value),
                Err(e) => tracing::debug!(error = %e, "Embedded JSON span did not parse"),
            }
        }
    }

    serde_json::from_str(text)
        .inspect_err(|_| tracing::debug!("Failed to parse as JSON"))
        .ok()
}

/// Whether a parsed value carries no information (`null`, `false`, `0`, `""`, `[]`, `{}`)
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
