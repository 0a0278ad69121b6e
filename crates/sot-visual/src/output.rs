//! Output Generator
//!
//! Shapes a reasoning result into the record the agent hands back: the answer,
//! the raw sketch, and a lightweight text visualization for paradigms that have one.

use serde::{Deserialize, Serialize};
use sot_core::{Paradigm, ReasoningResult};

use crate::rendering::{RenderFormat, RenderKind, Rendering};
use crate::sketch::{self, ARROW};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentOutput {
    /// The `<answer>` section
    pub text: String,

    /// The `<thinking>` section
    pub reasoning_sketch: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visualization: Option<Rendering>,
}

#[derive(Clone, Debug, Default)]
pub struct OutputGenerator;

impl OutputGenerator {
    pub fn new() -> Self {
        tracing::info!("OutputGenerator initialized");
        Self
    }

    pub fn generate(&self, result: &ReasoningResult) -> AgentOutput {
        let visualization = match result.paradigm {
            Paradigm::ConceptualChaining => chain_listing(&result.thinking),
            Paradigm::ChunkedSymbolism => equation_listing(&result.thinking),
            Paradigm::ExpertLexicon | Paradigm::Default => None,
        };

        tracing::info!(paradigm = %result.paradigm, "Generated output");
        AgentOutput {
            text: result.answer.clone(),
            reasoning_sketch: result.thinking.clone(),
            visualization,
        }
    }

    /// Numbered `1. step` listing
    pub fn step_by_step<S: AsRef<str>>(&self, steps: &[S]) -> Rendering {
        let content: String = steps
            .iter()
            .enumerate()
            .map(|(i, step)| format!("{}. {}\n", i + 1, step.as_ref()))
            .collect();
        Rendering::new(RenderKind::StepByStep, RenderFormat::Text, content)
    }
}

/// Chains normalised to `a -> b -> c`, one per line
fn chain_listing(thinking: &str) -> Option<Rendering> {
    let chains = sketch::parse_chains(thinking);
    if chains.is_empty() {
        return None;
    }

    let separator = format!(" {ARROW} ");
    let diagram: String = chains
        .iter()
        .map(|chain| format!("{}\n", chain.join(&separator)))
        .collect();
    Some(Rendering::new(RenderKind::ConceptualChain, RenderFormat::Text, diagram))
}

fn equation_listing(thinking: &str) -> Option<Rendering> {
    let equations = sketch::extract_equations(thinking);
    if equations.is_empty() {
        return None;
    }

    let latex: Vec<String> = equations.iter().map(|eq| to_latex(eq)).collect();
    Some(Rendering::new(RenderKind::Equation, RenderFormat::Latex, latex.join("\n")))
}

/// Light LaTeX markup: `*` → `\cdot `, `^` opens a group that the first space closes
pub fn to_latex(equation: &str) -> String {
    let converted = equation.replace('*', "\\cdot ").replace('^', "^{");
    if converted.contains("^{") {
        converted.replacen(' ', "} ", 1)
    } else {
        converted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(paradigm: Paradigm, thinking: &str) -> ReasoningResult {
        ReasoningResult {
            paradigm,
            thinking: thinking.into(),
            answer: "42".into(),
            full_response: String::new(),
        }
    }

    #[test]
    fn test_chain_visualization() {
        let out = OutputGenerator::new().generate(&result(
            Paradigm::ConceptualChaining,
            "cloud->rain ->  flood\nsome prose",
        ));
        assert_eq!(out.text, "42");
        let viz = out.visualization.unwrap();
        assert_eq!(viz.kind, RenderKind::ConceptualChain);
        assert_eq!(viz.format, RenderFormat::Text);
        assert_eq!(viz.content, "cloud -> rain -> flood\n");
    }

    #[test]
    fn test_equation_visualization() {
        let out = OutputGenerator::new().generate(&result(
            Paradigm::ChunkedSymbolism,
            "a = 3*2\n# skip = me\nb = a + 1",
        ));
        let viz = out.visualization.unwrap();
        assert_eq!(viz.kind, RenderKind::Equation);
        assert_eq!(viz.format, RenderFormat::Latex);
        assert_eq!(viz.content, "a = 3\\cdot 2\nb = a + 1");
    }

    #[test]
    fn test_no_visualization_for_lexicon() {
        let out = OutputGenerator::new()
            .generate(&result(Paradigm::ExpertLexicon, "STEMI -> PCI -> DAPT"));
        assert!(out.visualization.is_none());
        assert_eq!(out.reasoning_sketch, "STEMI -> PCI -> DAPT");
    }

    #[test]
    fn test_chain_paradigm_without_chains() {
        let out = OutputGenerator::new().generate(&result(Paradigm::ConceptualChaining, "plain"));
        assert!(out.visualization.is_none());
    }

    #[test]
    fn test_to_latex() {
        assert_eq!(to_latex("E = m*c^2"), "E} = m\\cdot c^{2");
        assert_eq!(to_latex("x = 1"), "x = 1");
    }

    #[test]
    fn test_step_by_step() {
        let r = OutputGenerator::new().step_by_step(&["read sensors", "reason"]);
        assert_eq!(r.content, "1. read sensors\n2. reason\n");
        assert_eq!(r.kind, RenderKind::StepByStep);
    }
}
