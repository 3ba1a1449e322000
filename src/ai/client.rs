//! Text generation backends.

use llm::LLMProvider;
use llm::builder::{LLMBackend, LLMBuilder};
use llm::chat::{ChatMessage, ChatProvider, ChatResponse};
use tracing::debug;

use super::AiError;
use super::prompt::Prompt;
use crate::config::AiConfig;

const SYSTEM_PROMPT: &str =
    "You are the assistant built into a scientific calculator. Answer concisely.";

/// Something that turns a prompt into text.
pub trait Generator: Send + Sync + 'static {
    fn generate(&self, prompt: &Prompt) -> impl Future<Output = Result<String, AiError>> + Send;
}

/// Generator backed by a chat model from the `llm` crate.
pub struct LlmGenerator {
    provider: Box<dyn LLMProvider>,
}

impl LlmGenerator {
    pub fn from_config(config: &AiConfig) -> Result<Self, AiError> {
        let backend: LLMBackend = config
            .backend
            .parse()
            .map_err(|e| AiError::Config(format!("unknown backend {:?}: {e}", config.backend)))?;

        let mut builder = LLMBuilder::new()
            .backend(backend)
            .system(SYSTEM_PROMPT)
            .max_tokens(config.max_tokens)
            .temperature(config.temperature);

        if let Some(model) = &config.model {
            builder = builder.model(model.clone());
        }
        if let Some(url) = &config.base_url {
            builder = builder.base_url(url.clone());
        }
        if let Some(key) = config.api_key() {
            builder = builder.api_key(key);
        }

        let provider = builder
            .build()
            .map_err(|e| AiError::Config(e.to_string()))?;

        Ok(Self { provider })
    }
}

impl Generator for LlmGenerator {
    async fn generate(&self, prompt: &Prompt) -> Result<String, AiError> {
        debug!(kind = %prompt.kind, "Sending prompt");

        let messages = vec![ChatMessage::user().content(prompt.text.clone()).build()];
        let response = self
            .provider
            .chat(&messages)
            .await
            .map_err(|e| AiError::Upstream(e.to_string()))?;

        response
            .text()
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| AiError::Upstream("model returned no text".to_string()))
    }
}
