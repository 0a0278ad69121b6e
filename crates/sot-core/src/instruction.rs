//! Instruction Following
//!
//! [`InstructionProcessor`] runs one instruction through analyze → execute → verify.
//! [`InstructionSet`] queues instructions by priority and gates them on dependencies.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::completion::TextGenerator;
use crate::error::Result;
use crate::extract::{extract_json, is_blank};
use crate::prompt;

/// Result of processing one instruction
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InstructionOutcome {
    Completed {
        instruction: String,
        analysis: Value,
        response: String,
        verification: Value,
    },
    Failed {
        instruction: String,
        error: String,
    },
}

impl InstructionOutcome {
    pub fn instruction(&self) -> &str {
        match self {
            Self::Completed { instruction, .. } | Self::Failed { instruction, .. } => instruction,
        }
    }

    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Three-stage instruction pipeline
pub struct InstructionProcessor {
    generator: TextGenerator,
}

impl InstructionProcessor {
    pub fn new(generator: TextGenerator) -> Self {
        tracing::info!("InstructionProcessor initialized");
        Self { generator }
    }

    /// Analyze, execute and verify `instruction`
    ///
    /// Never fails: anything that goes wrong collapses into [`InstructionOutcome::Failed`].
    pub async fn process(&self, instruction: &str) -> InstructionOutcome {
        match self.run_stages(instruction).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error = %e, "Error processing instruction");
                InstructionOutcome::Failed {
                    instruction: instruction.to_owned(),
                    error: e.to_string(),
                }
            }
        }
    }

    async fn run_stages(&self, instruction: &str) -> Result<InstructionOutcome> {
        let analysis_response = self
            .generator
            .generate(&prompt::instruction_analysis(instruction))
            .await;
        let analysis = structured_or_raw(&analysis_response, "raw_analysis");
        tracing::info!(components = component_count(&analysis), "Analyzed instruction");

        let analysis_text = serde_json::to_string_pretty(&analysis)?;

        let response = self
            .generator
            .generate(&prompt::instruction_execution(instruction, &analysis_text))
            .await;
        tracing::info!("Generated instruction execution response");

        let verification_response = self
            .generator
            .generate(&prompt::instruction_verification(
                instruction,
                &analysis_text,
                &response,
            ))
            .await;
        let verification = structured_or_raw(&verification_response, "raw_verification");

        Ok(InstructionOutcome::Completed {
            instruction: instruction.to_owned(),
            analysis,
            response,
            verification,
        })
    }

    /// Drain every eligible instruction of `set` in priority order
    ///
    /// Instructions caught in a dependency cycle are never eligible and are left pending.
    pub async fn run_set(&self, set: &mut InstructionSet) -> Vec<InstructionOutcome> {
        let mut outcomes = Vec::new();

        while let Some(text) = set.get_next().map(|i| i.text.clone()) {
            outcomes.push(self.process(&text).await);
            set.mark_current_completed();
        }

        if !set.all_completed() {
            tracing::warn!("Some instructions never became eligible");
        }
        outcomes
    }
}

/// Parsed JSON, or `{fallback_key: raw}` when the text carries none
fn structured_or_raw(text: &str, fallback_key: &str) -> Value {
    match extract_json(text) {
        Some(value) if !is_blank(&value) => value,
        _ => {
            tracing::warn!(field = fallback_key, "Failed to parse completion as JSON");
            let mut raw = Map::new();
            raw.insert(fallback_key.to_owned(), Value::String(text.to_owned()));
            Value::Object(raw)
        }
    }
}

fn component_count(value: &Value) -> usize {
    match value {
        Value::Object(map) => map.len(),
        Value::Array(items) => items.len(),
        _ => 1,
    }
}

/// One queued instruction
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub text: String,

    /// Higher runs first
    pub priority: i32,

    /// Indices that must be completed first
    pub dependencies: BTreeSet<usize>,

    pub completed: bool,

    /// Identity assigned at insertion; not a position
    pub index: usize,
}

/// Priority-ordered instruction queue with dependency gating
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InstructionSet {
    instructions: Vec<Instruction>,
    current: Option<usize>,
}

impl InstructionSet {
    pub fn new() -> Self {
        tracing::info!("InstructionSet initialized");
        Self::default()
    }

    /// Queue an instruction and return its index
    pub fn add(
        &mut self,
        text: impl Into<String>,
        priority: i32,
        dependencies: impl IntoIterator<Item = usize>,
    ) -> usize {
        let index = self.instructions.len();
        self.instructions.push(Instruction {
            text: text.into(),
            priority,
            dependencies: dependencies.into_iter().collect(),
            completed: false,
            index,
        });
        tracing::info!(index, "Added instruction");

        // stable: equal priorities keep insertion order
        self.instructions.sort_by_key(|i| std::cmp::Reverse(i.priority));

        index
    }

    /// First eligible instruction in priority order, remembered as current
    pub fn get_next(&mut self) -> Option<&Instruction> {
        let position = self
            .instructions
            .iter()
            .position(|i| !i.completed && self.dependencies_met(i))?;

        let next = &self.instructions[position];
        self.current = Some(next.index);
        Some(next)
    }

    /// Unknown dependency indices count as met
    fn dependencies_met(&self, instruction: &Instruction) -> bool {
        instruction
            .dependencies
            .iter()
            .all(|dep| self.get(*dep).is_none_or(|d| d.completed))
    }

    /// Mark the instruction last returned by [`get_next`](Self::get_next) as completed
    pub fn mark_current_completed(&mut self) -> bool {
        let Some(current) = self.current else {
            tracing::warn!("No current instruction to mark as completed");
            return false;
        };

        match self.instructions.iter_mut().find(|i| i.index == current) {
            Some(instruction) => {
                instruction.completed = true;
                self.current = None;
                tracing::info!(index = current, "Marked instruction as completed");
                true
            }
            None => {
                tracing::warn!(index = current, "Could not find current instruction");
                false
            }
        }
    }

    /// Whether every instruction is completed (true when empty)
    pub fn all_completed(&self) -> bool {
        self.instructions.iter().all(|i| i.completed)
    }

    /// Clear every completion flag and the current pointer
    pub fn reset(&mut self) {
        for instruction in &mut self.instructions {
            instruction.completed = false;
        }
        self.current = None;
        tracing::info!("Reset all instruction completion statuses");
    }

    pub fn get(&self, index: usize) -> Option<&Instruction> {
        self.instructions.iter().find(|i| i.index == index)
    }

    pub const fn current(&self) -> Option<usize> {
        self.current
    }

    /// Instructions in priority order
    pub fn iter(&self) -> impl Iterator<Item = &Instruction> {
        self.instructions.iter()
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::mock::ScriptedProvider;
    use crate::provider::GenerationOptions;

    fn processor(provider: Arc<ScriptedProvider>) -> InstructionProcessor {
        InstructionProcessor::new(TextGenerator::new(provider, GenerationOptions::default()))
    }

    fn drain(set: &mut InstructionSet) -> Vec<String> {
        let mut order = Vec::new();
        while let Some(next) = set.get_next() {
            order.push(next.text.clone());
            assert!(set.mark_current_completed());
        }
        order
    }

    #[test]
    fn test_priority_order() {
        let mut set = InstructionSet::new();
        set.add("low", 1, []);
        set.add("high", 5, []);
        set.add("mid", 3, []);

        assert_eq!(drain(&mut set), ["high", "mid", "low"]);
        assert!(set.all_completed());
    }

    #[test]
    fn test_indices_are_stable_identities() {
        let mut set = InstructionSet::new();
        assert_eq!(set.add("a", 0, []), 0);
        assert_eq!(set.add("b", 9, []), 1);

        assert_eq!(set.iter().next().map(|i| i.index), Some(1));
        assert_eq!(set.get(0).map(|i| i.text.as_str()), Some("a"));
    }

    #[test]
    fn test_equal_priorities_keep_insertion_order() {
        let mut set = InstructionSet::new();
        set.add("first", 2, []);
        set.add("second", 2, []);
        set.add("third", 2, []);
        assert_eq!(drain(&mut set), ["first", "second", "third"]);
    }

    #[test]
    fn test_dependencies_gate_eligibility() {
        let mut set = InstructionSet::new();
        let setup = set.add("setup", 0, []);
        set.add("deploy", 10, [setup]);

        assert_eq!(drain(&mut set), ["setup", "deploy"]);
    }

    #[test]
    fn test_unknown_dependency_is_vacuously_met() {
        let mut set = InstructionSet::new();
        set.add("orphan", 0, [42]);
        assert_eq!(set.get_next().map(|i| i.text.as_str()), Some("orphan"));
    }

    #[test]
    fn test_dependency_cycle_is_never_eligible() {
        let mut set = InstructionSet::new();
        set.add("a", 0, [1]);
        set.add("b", 0, [0]);
        set.add("free", 0, []);

        assert_eq!(drain(&mut set), ["free"]);
        assert!(!set.all_completed());
    }

    #[test]
    fn test_empty_set_is_all_completed() {
        assert!(InstructionSet::new().all_completed());
    }

    #[test]
    fn test_mark_without_current_fails() {
        let mut set = InstructionSet::new();
        set.add("a", 0, []);
        assert!(!set.mark_current_completed());

        set.get_next();
        assert!(set.mark_current_completed());
        assert!(!set.mark_current_completed());
    }

    #[test]
    fn test_reset_keeps_order_and_clears_progress() {
        let mut set = InstructionSet::new();
        set.add("a", 1, []);
        set.add("b", 2, []);
        drain(&mut set);
        set.get_next();

        set.reset();
        assert_eq!(set.current(), None);
        assert!(set.iter().all(|i| !i.completed));
        assert_eq!(drain(&mut set), ["b", "a"]);
    }

    #[tokio::test]
    async fn test_process_parses_structured_stages() {
        let provider = Arc::new(ScriptedProvider::new([
            r#"Here you go: {"primary_objectives": ["list fruits"]}"#,
            "apple, pear, fig",
            r#"{"verified": true, "explanation": "three fruits"}"#,
        ]));
        let outcome = processor(provider.clone()).process("List 3 fruits").await;

        assert_eq!(
            outcome,
            InstructionOutcome::Completed {
                instruction: "List 3 fruits".into(),
                analysis: json!({"primary_objectives": ["list fruits"]}),
                response: "apple, pear, fig".into(),
                verification: json!({"verified": true, "explanation": "three fruits"}),
            }
        );

        let calls = provider.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls[1][0].content.contains("\"primary_objectives\""));
        assert!(calls[2][0].content.contains("GENERATED RESPONSE: apple, pear, fig"));
    }

    #[tokio::test]
    async fn test_process_wraps_unstructured_text() {
        let provider = Arc::new(ScriptedProvider::new(["no json here", "done", "{}"]));
        let outcome = processor(provider).process("Do it").await;

        let InstructionOutcome::Completed { analysis, verification, .. } = outcome else {
            panic!("expected completed outcome");
        };
        assert_eq!(analysis, json!({"raw_analysis": "no json here"}));
        assert_eq!(verification, json!({"raw_verification": "{}"}));
    }

    #[tokio::test]
    async fn test_provider_errors_stay_in_the_text_channel() {
        let provider = Arc::new(ScriptedProvider::failing("offline"));
        let outcome = processor(provider).process("Do it").await;

        let InstructionOutcome::Completed { response, analysis, .. } = outcome else {
            panic!("expected completed outcome");
        };
        assert!(response.starts_with("Error: "));
        assert_eq!(analysis["raw_analysis"], json!("Error: Provider error: offline"));
    }

    #[test]
    fn test_outcome_shapes_serialize_flat() {
        let failed = InstructionOutcome::Failed {
            instruction: "x".into(),
            error: "boom".into(),
        };
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({"instruction": "x", "error": "boom"})
        );
    }

    #[tokio::test]
    async fn test_run_set_follows_queue_order() {
        let provider = Arc::new(ScriptedProvider::from_fn(|messages| {
            Ok(format!("echo {}", messages[0].content.len()))
        }));
        let mut set = InstructionSet::new();
        let first = set.add("gather data", 1, []);
        set.add("write report", 5, [first]);

        let outcomes = processor(provider).run_set(&mut set).await;
        let order: Vec<&str> = outcomes.iter().map(InstructionOutcome::instruction).collect();

        assert_eq!(order, ["gather data", "write report"]);
        assert!(outcomes.iter().all(InstructionOutcome::is_completed));
        assert!(set.all_completed());
    }
}
