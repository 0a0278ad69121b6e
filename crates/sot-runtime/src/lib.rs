//! # sot-runtime
//!
//! Completion providers for the Sketch-of-Thought agent.
//!
//! ## Providers
//!
//! - **Ollama** (default feature): local inference via Ollama
//! - **OpenAI-compatible**: any `/chat/completions` endpoint (OpenAI, LM Studio, vLLM)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sot_runtime::OpenAiProvider;
//!
//! let provider = Arc::new(OpenAiProvider::from_env()?);
//! let generator = TextGenerator::new(provider, GenerationOptions::default());
//! let reasoner = SotReasoner::new(generator);
//! ```

#[cfg(feature = "ollama")]
pub mod ollama;
pub mod openai;

#[cfg(feature = "ollama")]
pub use ollama::OllamaProvider;
pub use openai::{OpenAiConfig, OpenAiProvider};

// Re-export core types for convenience
pub use sot_core::{
    AgentError, GenerationOptions, LlmProvider, Message, Result, Role, SotReasoner, TextGenerator,
};
