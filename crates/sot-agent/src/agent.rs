//! Sketch-of-Thought Agent
//!
//! Perceive → reason → respond. Sensor readings flow into the world model,
//! threshold crossings become queued events, and queries (or, failing that, the
//! oldest event) are reasoned about with the paradigm their wording calls for.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sot_core::completion::preview;
use sot_core::{
    InstructionOutcome, InstructionProcessor, InstructionSet, ReasoningResult, SotReasoner,
    TextGenerator, WorldModel,
};
use sot_sensors::{SensorDataManager, SensorReadings};
use sot_visual::{AgentOutput, OutputGenerator, Rendering, SketchRenderer, Thought};

/// Result of [`SotAgent::process`]
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AgentResponse {
    /// No query and no pending event
    Idle,
    Success {
        input: String,
        reasoning: ReasoningResult,
        output: AgentOutput,
        timestamp: DateTime<Utc>,
    },
}

impl AgentResponse {
    pub const fn output(&self) -> Option<&AgentOutput> {
        match self {
            Self::Idle => None,
            Self::Success { output, .. } => Some(output),
        }
    }
}

/// One ingest + process cycle
#[derive(Clone, Debug, Serialize)]
pub struct CycleReport {
    #[serde(flatten)]
    pub response: AgentResponse,
    pub events_detected: Vec<String>,
}

pub struct SotAgent {
    reasoner: SotReasoner,
    instructions: InstructionProcessor,
    sensors: SensorDataManager,
    output: OutputGenerator,
    renderer: SketchRenderer,
    world: WorldModel,
    events: VecDeque<String>,
}

impl SotAgent {
    pub fn new(
        generator: TextGenerator,
        sensors: SensorDataManager,
        renderer: SketchRenderer,
    ) -> Self {
        tracing::info!(model = %generator.options().model, "SotAgent initialized");
        Self {
            reasoner: SotReasoner::new(generator.clone()),
            instructions: InstructionProcessor::new(generator),
            sensors,
            output: OutputGenerator::new(),
            renderer,
            world: WorldModel::new(),
            events: VecDeque::new(),
        }
    }

    pub const fn world(&self) -> &WorldModel {
        &self.world
    }

    pub fn pending_events(&self) -> impl Iterator<Item = &String> {
        self.events.iter()
    }

    /// Fold readings into the world model and queue any events they trigger.
    ///
    /// Without `data` the registered sensors are read.
    pub async fn ingest_data(&mut self, data: Option<SensorReadings>) -> Vec<String> {
        let raw = match data {
            Some(data) => data,
            None => self.sensors.read_all().await,
        };

        let processed = self.sensors.preprocess(&raw);
        for (key, value) in processed {
            self.world.insert(key, value);
        }

        let events = self.sensors.detect_events(&self.world);
        if !events.is_empty() {
            tracing::debug!(?events, "Detected events");
            self.events.extend(events.iter().cloned());
        }
        events
    }

    /// Reason about `query`, or the oldest queued event when there is none
    pub async fn process(&mut self, query: Option<&str>) -> AgentResponse {
        let task = match query {
            Some(q) => q.to_owned(),
            None => match self.events.pop_front() {
                Some(event) => event,
                None => {
                    tracing::debug!("No task to process");
                    return AgentResponse::Idle;
                }
            },
        };

        tracing::info!(task = %preview(&task), "Processing task");

        let reasoning = self.reasoner.reason(&task, &self.world).await;
        let output = self.output.generate(&reasoning);

        AgentResponse::Success {
            input: task,
            reasoning,
            output,
            timestamp: Utc::now(),
        }
    }

    /// Read sensors, then process
    pub async fn run_once(&mut self, query: Option<&str>) -> CycleReport {
        let events_detected = self.ingest_data(None).await;
        let response = self.process(query).await;
        CycleReport {
            response,
            events_detected,
        }
    }

    pub fn render_sketch(&self, text: &str) -> Rendering {
        self.renderer.render_sketch(text)
    }

    pub fn render_thought_tree(&self, thoughts: &[Thought]) -> Rendering {
        self.renderer.render_thought_tree(thoughts)
    }

    /// Run an instruction set to completion through the analyze/execute/verify pipeline
    pub async fn run_instructions(&self, set: &mut InstructionSet) -> Vec<InstructionOutcome> {
        self.instructions.run_set(set).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use sot_core::{mock::ScriptedProvider, GenerationOptions, Paradigm, Scalar};
    use sot_sensors::SimulatedDriver;

    const CHAIN_REPLY: &str =
        "<thinking>\nheat -> expansion -> pressure\n</thinking>\n<answer>\nPressure rises.\n</answer>";

    fn agent(provider: ScriptedProvider) -> SotAgent {
        let generator = TextGenerator::new(Arc::new(provider), GenerationOptions::default());
        let sensors = SensorDataManager::new(Arc::new(SimulatedDriver::seeded(1)));
        SotAgent::new(generator, sensors, SketchRenderer::default())
    }

    fn readings(pairs: &[(&str, Scalar)]) -> SensorReadings {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_ingest_queues_events() {
        let mut agent = agent(ScriptedProvider::new(Vec::<String>::new()));
        let events = agent
            .ingest_data(Some(readings(&[
                ("temperature", Scalar::Number(35.0)),
                ("humidity", Scalar::Number(50.0)),
                ("motion", Scalar::Bool(true)),
            ])))
            .await;

        assert_eq!(events.len(), 2);
        assert_eq!(agent.pending_events().count(), 2);
        assert!(agent.world().contains_key("heat_index"));
        assert!(agent.world().contains_key("timestamp"));
    }

    #[tokio::test]
    async fn test_process_idle_without_work() {
        let mut agent = agent(ScriptedProvider::new(Vec::<String>::new()));
        let response = agent.process(None).await;
        assert!(matches!(response, AgentResponse::Idle));
        assert_eq!(serde_json::to_value(&response).unwrap()["status"], "idle");
    }

    #[tokio::test]
    async fn test_process_query() {
        let mut agent = agent(ScriptedProvider::new([CHAIN_REPLY]));
        let response = agent.process(Some("Why does heating a sealed can matter?")).await;

        let AgentResponse::Success { reasoning, output, .. } = &response else {
            panic!("expected success");
        };
        assert_eq!(reasoning.paradigm, Paradigm::ConceptualChaining);
        assert_eq!(output.text, "Pressure rises.");
        assert!(output.visualization.is_some());

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["input"], "Why does heating a sealed can matter?");
    }

    #[tokio::test]
    async fn test_process_pops_oldest_event() {
        let mut agent = agent(ScriptedProvider::new([CHAIN_REPLY, CHAIN_REPLY]));
        agent
            .ingest_data(Some(readings(&[
                ("temperature", Scalar::Number(1.0)),
                ("motion", Scalar::Bool(true)),
            ])))
            .await;

        let AgentResponse::Success { input, .. } = agent.process(None).await else {
            panic!("expected success");
        };
        assert!(input.starts_with("Low temperature detected"));
        assert_eq!(agent.pending_events().count(), 1);
    }

    #[tokio::test]
    async fn test_provider_failure_flows_into_answer() {
        let mut agent = agent(ScriptedProvider::failing("connection refused"));
        let response = agent.process(Some("hello")).await;

        let AgentResponse::Success { reasoning, .. } = response else {
            panic!("expected success");
        };
        assert!(reasoning.full_response.starts_with("Error: "));
        assert!(reasoning.answer.is_empty());
    }

    #[tokio::test]
    async fn test_run_once_reports_events() {
        let mut agent = agent(ScriptedProvider::new([CHAIN_REPLY]));
        let report = agent.run_once(Some("status?")).await;

        // simulated readings stay inside every threshold; motion is random
        assert!(report.events_detected.len() <= 1);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "success");
        assert!(json["events_detected"].is_array());
    }

    #[tokio::test]
    async fn test_run_instructions() {
        let agent = agent(ScriptedProvider::from_fn(|_| Ok(r#"{"ok": true}"#.to_string())));
        let mut set = InstructionSet::new();
        set.add("second", 1, []);
        set.add("first", 5, []);

        let outcomes = agent.run_instructions(&mut set).await;
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].instruction(), "first");
        assert!(set.all_completed());
    }
}
