//! Sketch-of-Thought Reasoner
//!
//! Selects a paradigm for the task, fills that paradigm's template with the task and
//! the world model, sends it through the completion capability and splits the reply
//! into its `<thinking>` and `<answer>` sections.

use serde::{Deserialize, Serialize};

use crate::completion::TextGenerator;
use crate::extract::extract_between;
use crate::paradigm::{Paradigm, ParadigmSelector};
use crate::prompt::{self, ANSWER_END, ANSWER_START, THINKING_END, THINKING_START};
use crate::world::WorldModel;

/// Outcome of one reasoning pass
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasoningResult {
    pub paradigm: Paradigm,

    /// Trimmed `<thinking>` section; empty when the marker is missing
    pub thinking: String,

    /// Trimmed `<answer>` section; empty when the marker is missing
    pub answer: String,

    /// Completion text as received
    pub full_response: String,
}

impl ReasoningResult {
    /// Split a completion into its tagged sections
    pub fn from_response(paradigm: Paradigm, response: String) -> Self {
        let section = |start: &str, end: &str| {
            extract_between(&response, start, end)
                .unwrap_or_default()
                .trim()
                .to_owned()
        };

        Self {
            paradigm,
            thinking: section(THINKING_START, THINKING_END),
            answer: section(ANSWER_START, ANSWER_END),
            full_response: response,
        }
    }
}

/// Paradigm-routing reasoner
pub struct SotReasoner {
    generator: TextGenerator,
    selector: ParadigmSelector,
}

impl SotReasoner {
    pub fn new(generator: TextGenerator) -> Self {
        Self::with_selector(generator, ParadigmSelector::default())
    }

    pub fn with_selector(generator: TextGenerator, selector: ParadigmSelector) -> Self {
        tracing::info!("SotReasoner initialized");
        Self { generator, selector }
    }

    pub const fn generator(&self) -> &TextGenerator {
        &self.generator
    }

    pub fn select_paradigm(&self, task: &str) -> Paradigm {
        self.selector.select(task)
    }

    /// Reason about `task` with the paradigm its keywords call for
    pub async fn reason(&self, task: &str, world: &WorldModel) -> ReasoningResult {
        let paradigm = self.select_paradigm(task);
        let result = self.reason_with(paradigm, task, world).await;
        tracing::info!(%paradigm, "Reasoning completed");
        result
    }

    /// Reason about `task` with an explicit paradigm
    pub async fn reason_with(
        &self,
        paradigm: Paradigm,
        task: &str,
        world: &WorldModel,
    ) -> ReasoningResult {
        let prompt = prompt::render(paradigm, task, world);
        let response = self.generator.generate(&prompt).await;

        if response.trim().is_empty() {
            tracing::warn!(%paradigm, "Completion was empty");
        }

        ReasoningResult::from_response(paradigm, response)
    }
}
