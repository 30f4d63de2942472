//! Shared LLM plumbing for the vision OCR, translation and summary engines.
//!
//! All three engines send one chat completion and read back plain text, so
//! the request building, timeout and logging live here once. There is no
//! retry loop: every stage runs at most once per run, and a failed call is
//! surfaced to the caller as a stage failure.

use crate::config::PipelineConfig;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

/// Why a chat completion produced no text.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("{0}")]
    Provider(String),

    #[error("no response within {0}s")]
    Timeout(u64),
}

/// Sampling and timeout settings copied out of [`PipelineConfig`].
#[derive(Debug, Clone, Copy)]
pub struct ChatSettings {
    pub temperature: f32,
    pub max_tokens: usize,
    pub timeout_secs: u64,
}

impl ChatSettings {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout_secs: config.request_timeout_secs,
        }
    }

    fn options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
            ..Default::default()
        }
    }
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

/// Send `messages` once and return the completion text.
pub async fn complete(
    provider: &Arc<dyn LLMProvider>,
    messages: &[ChatMessage],
    settings: &ChatSettings,
) -> Result<String, ChatError> {
    let start = Instant::now();
    let options = settings.options();

    let response = tokio::time::timeout(
        Duration::from_secs(settings.timeout_secs),
        provider.chat(messages, Some(&options)),
    )
    .await
    .map_err(|_| ChatError::Timeout(settings.timeout_secs))?
    .map_err(|e| ChatError::Provider(e.to_string()))?;

    debug!(
        "LLM call: {} input tokens, {} output tokens, {:?}",
        response.prompt_tokens,
        response.completion_tokens,
        start.elapsed()
    );

    Ok(response.content)
}
