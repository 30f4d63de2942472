//! Translation stage.
//!
//! [`Translator`] is the backend seam. [`GoogleTranslator`] talks to the
//! keyless public Google endpoint with automatic source detection;
//! [`LlmTranslator`] uses any edgequake-llm provider.
//!
//! [`translate_text`] wraps a backend call into an [`Outcome`]: empty input is
//! `Empty` without a network call, and a backend error is `Failed`, which the
//! front ends render as `"Translation error"`.

use crate::config::{PipelineConfig, DEFAULT_TRANSLATE_ENDPOINT};
use crate::error::StageError;
use crate::language::TargetLanguage;
use crate::output::Outcome;
use crate::pipeline::llm::{complete, ChatSettings};
use crate::pipeline::normalize::split_sentences;
use crate::prompts::translation_system_prompt;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, LLMProvider};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// The public endpoint rejects requests over 5000 characters.
pub const GOOGLE_MAX_CHARS: usize = 5000;

/// Chunk size used against the public endpoint; leaves headroom for encoding.
pub const GOOGLE_CHUNK_CHARS: usize = 4500;

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("request failed: {0}")]
    Http(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response: {0}")]
    Parse(String),

    #[error("{0}")]
    Backend(String),
}

/// A translation backend.
#[async_trait]
pub trait Translator: Send + Sync {
    fn name(&self) -> &str;

    /// Translate `text` into `target`. The source language is auto-detected.
    async fn translate(&self, text: &str, target: &TargetLanguage) -> Result<String, TranslateError>;
}

/// Run one translation and classify the result.
pub async fn translate_text(
    translator: &dyn Translator,
    text: &str,
    target: &TargetLanguage,
) -> Outcome<String> {
    if text.trim().is_empty() {
        return Outcome::Empty;
    }

    info!("Translating {} chars to {} via {}", text.chars().count(), target, translator.name());
    match translator.translate(text, target).await {
        Ok(translated) => Outcome::from_text(translated),
        Err(e) => {
            warn!("Error during translation: {}", e);
            Outcome::Failed(StageError::TranslationFailed {
                backend: translator.name().to_string(),
                detail: e.to_string(),
            })
        }
    }
}

// ── Chunking ────────────────────────────────────────────────────────────────

/// Split `text` into pieces of at most `max_chars` characters.
///
/// Pieces break at sentence ends where possible, then at whitespace, and
/// only split inside a word when a single word is longer than `max_chars`.
/// Concatenating the chunks with single spaces gives back the
/// whitespace-collapsed input, except that a word split for being longer
/// than `max_chars` gains a space at each split.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let mut pieces = Vec::new();
    for sentence in split_sentences(text) {
        if sentence.chars().count() <= max_chars {
            pieces.push(sentence.to_string());
            continue;
        }
        for word in sentence.split_whitespace() {
            if word.chars().count() <= max_chars {
                pieces.push(word.to_string());
            } else {
                let chars: Vec<char> = word.chars().collect();
                pieces.extend(chars.chunks(max_chars).map(|c| c.iter().collect::<String>()));
            }
        }
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    for piece in pieces {
        let len = piece.chars().count();
        if current.is_empty() {
            current = piece;
            current_len = len;
        } else if current_len + 1 + len <= max_chars {
            current.push(' ');
            current.push_str(&piece);
            current_len += 1 + len;
        } else {
            chunks.push(std::mem::take(&mut current));
            current = piece;
            current_len = len;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

// ── Google ──────────────────────────────────────────────────────────────────

/// Keyless Google Translate client (`client=gtx`).
pub struct GoogleTranslator {
    client: reqwest::Client,
    endpoint: String,
    chunk_chars: usize,
}

impl GoogleTranslator {
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Result<Self, TranslateError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| TranslateError::Http(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            chunk_chars: GOOGLE_CHUNK_CHARS,
        })
    }

    pub fn from_config(config: &PipelineConfig) -> Result<Self, TranslateError> {
        Self::new(config.translate_endpoint.clone(), config.request_timeout_secs)
    }

    async fn translate_chunk(&self, chunk: &str, target: &TargetLanguage) -> Result<String, TranslateError> {
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("client", "gtx"), ("sl", "auto"), ("tl", target.code), ("dt", "t")])
            .form(&[("q", chunk)])
            .send()
            .await
            .map_err(|e| TranslateError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranslateError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| TranslateError::Parse(e.to_string()))?;
        parse_google_response(&body)
    }
}

impl Default for GoogleTranslator {
    fn default() -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: DEFAULT_TRANSLATE_ENDPOINT.to_string(),
            chunk_chars: GOOGLE_CHUNK_CHARS,
        }
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    fn name(&self) -> &str {
        "google"
    }

    async fn translate(&self, text: &str, target: &TargetLanguage) -> Result<String, TranslateError> {
        let chunks = chunk_text(text, self.chunk_chars);
        debug!("google: {} chunk(s)", chunks.len());

        let mut translated = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            translated.push(self.translate_chunk(chunk, target).await?);
        }
        Ok(translated.join(" "))
    }
}

/// Concatenate the translated segments out of a `dt=t` response.
///
/// Shape: `[[["Bonjour","Hello",null,null,10], …], null, "en", …]`.
fn parse_google_response(body: &serde_json::Value) -> Result<String, TranslateError> {
    let segments = body
        .get(0)
        .and_then(|v| v.as_array())
        .ok_or_else(|| TranslateError::Parse("missing segment list".to_string()))?;

    let text: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(|s| s.as_str()))
        .collect();

    if text.is_empty() {
        return Err(TranslateError::Parse("no translated segments".to_string()));
    }
    Ok(text)
}

// ── LLM ─────────────────────────────────────────────────────────────────────

/// Translation by chat completion.
pub struct LlmTranslator {
    provider: Arc<dyn LLMProvider>,
    settings: ChatSettings,
}

impl LlmTranslator {
    pub fn new(provider: Arc<dyn LLMProvider>, settings: ChatSettings) -> Self {
        Self { provider, settings }
    }
}

#[async_trait]
impl Translator for LlmTranslator {
    fn name(&self) -> &str {
        "llm"
    }

    async fn translate(&self, text: &str, target: &TargetLanguage) -> Result<String, TranslateError> {
        let messages = vec![
            ChatMessage::system(translation_system_prompt(target.name, target.code)),
            ChatMessage::user(text),
        ];
        let translated = complete(&self.provider, &messages, &self.settings)
            .await
            .map_err(|e| TranslateError::Backend(e.to_string()))?;
        Ok(translated.trim().to_string())
    }
}
