//! Text Completion Capability
//!
//! Wraps an [`LlmProvider`] behind the `generate(prompt) -> text` contract used by the
//! reasoner and the instruction pipeline. Provider failures never surface as errors here:
//! they come back as ordinary text starting with [`ERROR_PREFIX`].

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::{AgentError, Result};
use crate::message::Message;
use crate::provider::{GenerationOptions, LlmProvider};

/// Prefix of every completion that stands in for a provider failure
pub const ERROR_PREFIX: &str = "Error: ";

/// Default completion timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Whether a completion is a stringified provider failure
pub fn is_error_text(text: &str) -> bool {
    text.starts_with(ERROR_PREFIX)
}

/// Provider handle with generation settings, timeout and cancellation
#[derive(Clone)]
pub struct TextGenerator {
    provider: Arc<dyn LlmProvider>,
    options: GenerationOptions,
    timeout: Option<Duration>,
    cancel: CancellationToken,
}

impl TextGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>, options: GenerationOptions) -> Self {
        tracing::info!(model = %options.model, "TextGenerator initialized");
        Self {
            provider,
            options,
            timeout: Some(DEFAULT_TIMEOUT),
            cancel: CancellationToken::new(),
        }
    }

    /// Set the per-request timeout; `None` waits indefinitely
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Share a cancellation token with other components
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that aborts in-flight and future requests when cancelled
    pub const fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub const fn options(&self) -> &GenerationOptions {
        &self.options
    }

    pub fn provider(&self) -> &Arc<dyn LlmProvider> {
        &self.provider
    }

    /// Generate text for a single user prompt
    pub async fn generate(&self, prompt: &str) -> String {
        tracing::debug!(prompt = %preview(prompt), "Generating response");
        self.generate_chat(&[Message::user(prompt)]).await
    }

    /// Generate text with separate system instructions and user prompt
    pub async fn generate_with_system(&self, system_prompt: &str, user_prompt: &str) -> String {
        tracing::debug!("Generating response with system prompt");
        self.generate_chat(&[Message::system(system_prompt), Message::user(user_prompt)])
            .await
    }

    /// Generate text from a full conversation
    pub async fn generate_chat(&self, messages: &[Message]) -> String {
        match self.try_complete(messages).await {
            Ok(text) => {
                tracing::debug!(response = %preview(&text), "Generated response");
                text
            }
            Err(e) => {
                tracing::error!(error = %e, "Error generating response");
                format!("{ERROR_PREFIX}{e}")
            }
        }
    }

    /// Completion with the error channel kept intact
    pub async fn try_complete(&self, messages: &[Message]) -> Result<String> {
        let request = self.provider.complete(messages, &self.options);

        let bounded = async {
            match self.timeout {
                Some(limit) => tokio::time::timeout(limit, request)
                    .await
                    .map_err(|_| AgentError::Timeout(limit))?,
                None => request.await,
            }
        };

        tokio::select! {
            () = self.cancel.cancelled() => Err(AgentError::Cancelled),
            completion = bounded => completion.map(|c| c.content),
        }
    }
}

/// First 50 characters, for log lines
pub fn preview(text: &str) -> String {
    let head: String = text.chars().take(50).collect();
    if head.len() < text.len() {
        format!("{head}...")
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::ScriptedProvider;

    fn generator(provider: ScriptedProvider) -> TextGenerator {
        TextGenerator::new(Arc::new(provider), GenerationOptions::default())
    }

    #[tokio::test]
    async fn test_generate_returns_provider_text() {
        let generator = generator(ScriptedProvider::new(["hello"]));
        assert_eq!(generator.generate("hi").await, "hello");
    }

    #[tokio::test]
    async fn test_provider_failure_becomes_error_text() {
        let generator = generator(ScriptedProvider::failing("connection refused"));
        let text = generator.generate("hi").await;
        assert!(is_error_text(&text));
        assert_eq!(text, "Error: Provider error: connection refused");
    }

    #[tokio::test]
    async fn test_cancelled_generator_reports_error_text() {
        let generator = generator(ScriptedProvider::new(["never seen"]));
        generator.cancellation_token().cancel();
        assert_eq!(generator.generate("hi").await, "Error: Request cancelled");
    }

    #[tokio::test]
    async fn test_timeout_reports_error_text() {
        let provider = ScriptedProvider::new(["slow"]).with_delay(Duration::from_millis(200));
        let generator = generator(provider).with_timeout(Some(Duration::from_millis(10)));
        let text = generator.generate("hi").await;
        assert!(text.starts_with("Error: Request timed out"));
    }

    #[tokio::test]
    async fn test_system_prompt_is_sent_first() {
        let provider = Arc::new(ScriptedProvider::new(["ok"]));
        let generator = TextGenerator::new(provider.clone(), GenerationOptions::default());
        generator.generate_with_system("be terse", "question").await;

        let calls = provider.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0][0].role, crate::message::Role::System);
        assert_eq!(calls[0][1].content, "question");
    }

    #[test]
    fn test_preview_truncates_long_text() {
        let long = "x".repeat(80);
        assert_eq!(preview(&long).len(), 53);
        assert_eq!(preview("short"), "short");
        assert_eq!(preview(&"é".repeat(50)), "é".repeat(50));
        assert_eq!(preview(&"é".repeat(51)), format!("{}...", "é".repeat(50)));
    }
}
