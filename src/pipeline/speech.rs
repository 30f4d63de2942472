//! Speech-to-text side flow.
//!
//! The browser records the microphone and uploads the clip; this module only
//! turns a clip into text. Transcripts are translated by the session with the
//! same target language as the document flow.

use crate::config::PipelineConfig;
use crate::error::StageError;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

/// A recorded audio clip held in memory.
#[derive(Clone)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    /// File name sent to the recognizer; its extension tells it the codec.
    pub file_name: String,
    pub mime_type: String,
}

impl AudioClip {
    pub fn new(bytes: Vec<u8>, file_name: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            file_name: file_name.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for AudioClip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioClip")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Something that can transcribe a clip.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// `Ok(None)` when the clip holds no recognisable speech.
    async fn transcribe(&self, clip: &AudioClip) -> Result<Option<String>, StageError>;
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// OpenAI-compatible `/audio/transcriptions` client.
pub struct WhisperRecognizer {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl WhisperRecognizer {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, StageError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| StageError::SpeechFailed {
                detail: e.to_string(),
            })?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    /// Build from config, reading the key from `OPENAI_API_KEY`.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, StageError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| StageError::SpeechFailed {
                detail: "OPENAI_API_KEY is not set; speech recognition is unavailable".to_string(),
            })?;
        Self::new(
            config.speech_endpoint.clone(),
            config.speech_model.clone(),
            api_key,
            config.request_timeout_secs,
        )
    }

    fn url(&self) -> String {
        format!("{}/audio/transcriptions", self.endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl SpeechRecognizer for WhisperRecognizer {
    async fn transcribe(&self, clip: &AudioClip) -> Result<Option<String>, StageError> {
        if clip.is_empty() {
            return Ok(None);
        }
        info!("Transcribing {} ({} bytes)", clip.file_name, clip.bytes.len());

        let failed = |detail: String| StageError::SpeechFailed { detail };

        let part = reqwest::multipart::Part::bytes(clip.bytes.clone())
            .file_name(clip.file_name.clone())
            .mime_str(&clip.mime_type)
            .map_err(|e| failed(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .text("model", self.model.clone())
            .part("file", part);

        let response = self
            .client
            .post(self.url())
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(failed(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body.chars().take(200).collect::<String>()
            )));
        }

        let parsed: TranscriptionResponse =
            response.json().await.map_err(|e| failed(e.to_string()))?;
        let text = parsed.text.trim().to_string();
        debug!("Transcript: {} chars", text.chars().count());
        Ok(if text.is_empty() { None } else { Some(text) })
    }
}
