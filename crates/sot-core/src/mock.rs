//! Scripted Provider
//!
//! For testing and offline demos. Replays canned completions in order, or answers
//! through a closure, and records every request it receives.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AgentError, Result};
use crate::message::Message;
use crate::provider::{Completion, GenerationOptions, LlmProvider, ModelInfo, ProviderInfo};

type Responder = Box<dyn Fn(&[Message]) -> Result<String> + Send + Sync>;

enum Script {
    Queue(Mutex<VecDeque<String>>),
    Respond(Responder),
    Fail(String),
}

/// Provider that never touches the network
pub struct ScriptedProvider {
    script: Script,
    delay: Option<Duration>,
    calls: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedProvider {
    /// Replay `responses` in order; once exhausted, every request fails
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_script(Script::Queue(Mutex::new(
            responses.into_iter().map(Into::into).collect(),
        )))
    }

    /// Answer every request through `responder`
    pub fn from_fn<F>(responder: F) -> Self
    where
        F: Fn(&[Message]) -> Result<String> + Send + Sync + 'static,
    {
        Self::with_script(Script::Respond(Box::new(responder)))
    }

    /// Fail every request with a provider error
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_script(Script::Fail(message.into()))
    }

    fn with_script(script: Script) -> Self {
        Self {
            script,
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Wait before answering (for timeout tests)
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every message list received so far
    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn respond(&self, messages: &[Message]) -> Result<String> {
        match &self.script {
            Script::Queue(queue) => queue
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front()
                .ok_or_else(|| AgentError::Provider("script exhausted".into())),
            Script::Respond(responder) => responder(messages),
            Script::Fail(message) => Err(AgentError::Provider(message.clone())),
        }
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn info(&self) -> Result<ProviderInfo> {
        Ok(ProviderInfo {
            name: "Scripted".into(),
            version: None,
            models: self.list_models().await?,
        })
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(!matches!(self.script, Script::Fail(_)))
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(messages.to_vec());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.respond(messages)
            .map(|content| Completion::text(content, &options.model))
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        Ok(vec![ModelInfo {
            id: "scripted".into(),
            name: "scripted".into(),
            context_length: None,
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_queue_replays_in_order() {
        let provider = ScriptedProvider::new(["first", "second"]);
        let opts = GenerationOptions::default();
        let msgs = [Message::user("q")];

        assert_eq!(provider.complete(&msgs, &opts).await.unwrap().content, "first");
        assert_eq!(provider.complete(&msgs, &opts).await.unwrap().content, "second");
        assert!(provider.complete(&msgs, &opts).await.is_err());
        assert_eq!(provider.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_responder_sees_prompt() {
        let provider = ScriptedProvider::from_fn(|messages| Ok(messages[0].content.to_uppercase()));
        let completion = provider
            .complete(&[Message::user("echo")], &GenerationOptions::default())
            .await
            .unwrap();
        assert_eq!(completion.content, "ECHO");
    }

    #[tokio::test]
    async fn test_failing_provider_is_unhealthy() {
        let provider = ScriptedProvider::failing("down");
        assert!(!provider.health_check().await.unwrap());
    }
}
