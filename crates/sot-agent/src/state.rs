//! Application State

use std::sync::Arc;

use sot_core::LlmProvider;
use tokio::sync::Mutex;

use crate::agent::SotAgent;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The one agent; its world model and event queue are mutated under this lock only
    pub agent: Arc<Mutex<SotAgent>>,

    /// Provider the agent talks to, for health and model listing
    pub provider: Arc<dyn LlmProvider>,
}

impl AppState {
    pub fn new(agent: SotAgent, provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            agent: Arc::new(Mutex::new(agent)),
            provider,
        }
    }
}
