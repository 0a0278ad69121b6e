//! Settings
//!
//! Everything the binary needs, read once from the environment (`.env` included).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use sot_core::{GenerationOptions, LlmProvider, TextGenerator};
use sot_runtime::{OpenAiConfig, OpenAiProvider, ollama::OllamaConfig, OllamaProvider};

use crate::offline;

/// Completion backend selected by `LLM_PROVIDER`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderKind {
    Ollama,
    OpenAi,
    /// Canned responses, no network
    Scripted,
}

impl std::str::FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" | "openai-compatible" | "lmstudio" | "vllm" => Ok(Self::OpenAi),
            "scripted" | "offline" | "mock" => Ok(Self::Scripted),
            other => bail!("Unknown LLM provider: {other}"),
        }
    }
}

impl ProviderKind {
    const fn default_model(self) -> &'static str {
        match self {
            Self::Ollama => "llama3.2",
            Self::OpenAi => "gpt-4",
            Self::Scripted => "scripted",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub provider: ProviderKind,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout: Duration,
    pub ollama: OllamaConfig,
    pub openai: OpenAiConfig,
    pub output_dir: Option<PathBuf>,
    pub font_path: Option<PathBuf>,
    pub log_level: String,
    pub debug: bool,
    pub bind_addr: String,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider: ProviderKind = get("LLM_PROVIDER")
            .as_deref()
            .unwrap_or("ollama")
            .parse()?;

        let temperature = match get("TEMPERATURE") {
            Some(v) => v.parse().with_context(|| format!("TEMPERATURE={v}"))?,
            None => 0.7,
        };
        let max_tokens = match get("MAX_TOKENS") {
            Some(v) => v.parse().with_context(|| format!("MAX_TOKENS={v}"))?,
            None => 1024,
        };
        let timeout_secs: u64 = match get("REQUEST_TIMEOUT_SECS") {
            Some(v) => v.parse().with_context(|| format!("REQUEST_TIMEOUT_SECS={v}"))?,
            None => 120,
        };

        let ollama_defaults = OllamaConfig::default();
        let ollama = OllamaConfig {
            host: get("OLLAMA_HOST").unwrap_or(ollama_defaults.host),
            port: match get("OLLAMA_PORT") {
                Some(v) => v.parse().with_context(|| format!("OLLAMA_PORT={v}"))?,
                None => ollama_defaults.port,
            },
        };

        let openai_defaults = OpenAiConfig::default();
        let openai = OpenAiConfig {
            api_key: get("OPENAI_API_KEY"),
            base_url: get("OPENAI_BASE_URL").unwrap_or(openai_defaults.base_url),
            timeout_secs,
        };

        Ok(Self {
            provider,
            model: get("MODEL_NAME").unwrap_or_else(|| provider.default_model().to_string()),
            temperature,
            max_tokens,
            request_timeout: Duration::from_secs(timeout_secs),
            ollama,
            openai,
            output_dir: get("SKETCH_OUTPUT_DIR").map(PathBuf::from),
            font_path: get("SKETCH_FONT_PATH").map(PathBuf::from),
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            debug: get("DEBUG_MODE").is_some_and(|v| v.eq_ignore_ascii_case("true")),
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".into()),
        })
    }

    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            ..GenerationOptions::default()
        }
    }

    pub fn build_provider(&self) -> Result<Arc<dyn LlmProvider>> {
        Ok(match self.provider {
            ProviderKind::Ollama => Arc::new(OllamaProvider::from_config(self.ollama.clone())),
            ProviderKind::OpenAi => Arc::new(
                OpenAiProvider::new(self.openai.clone())
                    .context("Failed to build OpenAI-compatible client")?,
            ),
            ProviderKind::Scripted => Arc::new(offline::provider()),
        })
    }

    pub fn text_generator(&self, provider: Arc<dyn LlmProvider>) -> TextGenerator {
        TextGenerator::new(provider, self.generation_options())
            .with_timeout(Some(self.request_timeout))
    }
}
