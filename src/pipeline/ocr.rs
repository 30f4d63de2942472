//! OCR engines: turn one JPEG into text.
//!
//! [`OcrEngine`] is the seam the extraction stage depends on. Two engines
//! ship with the crate:
//!
//! * [`TesseractOcr`] runs the `tesseract` CLI locally. No network, no key.
//! * [`VisionOcr`] asks a vision LLM (any edgequake-llm provider) to
//!   transcribe the image.
//!
//! Engines return raw text; cleanup happens in [`crate::pipeline::normalize`].

use crate::config::PipelineConfig;
use crate::pipeline::encode::to_base64;
use crate::pipeline::llm::{complete, ChatSettings};
use crate::prompts::OCR_SYSTEM_PROMPT;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, ImageData, LLMProvider};
use std::io::Write;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Per-call OCR settings, shared by every engine.
#[derive(Debug, Clone)]
pub struct OcrOptions {
    /// Tesseract language codes, e.g. `["eng", "hin"]`.
    pub languages: Vec<String>,
    /// Let the engine use all cores / the GPU. Off pins the engine to one thread.
    pub hardware_acceleration: bool,
    pub timeout_secs: u64,
}

impl OcrOptions {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            languages: config.ocr_languages.clone(),
            hardware_acceleration: config.hardware_acceleration,
            timeout_secs: config.request_timeout_secs,
        }
    }
}

impl Default for OcrOptions {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to launch '{binary}': {source}. Install tesseract-ocr or choose --ocr vision")]
    Launch {
        binary: String,
        source: std::io::Error,
    },

    #[error("exited with {status}: {stderr}")]
    Exit { status: String, stderr: String },

    #[error("timed out after {0}s")]
    Timeout(u64),

    #[error("{0}")]
    Engine(String),
}

/// Something that can read text out of a JPEG.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Short engine name used in logs and error reports.
    fn name(&self) -> &str;

    /// Recognise text in `jpeg`. An image without glyphs yields `Ok("")`.
    async fn recognize(&self, jpeg: &[u8], options: &OcrOptions) -> Result<String, OcrError>;
}

// ── Tesseract ────────────────────────────────────────────────────────────────

/// Local OCR via the `tesseract` command-line tool.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    binary: String,
}

impl TesseractOcr {
    pub fn new() -> Self {
        Self {
            binary: "tesseract".to_string(),
        }
    }

    /// Use a tesseract binary at a non-default location.
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// `true` when `tesseract --version` can be spawned.
    pub fn is_available(&self) -> bool {
        std::process::Command::new(&self.binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok()
    }

    fn language_arg(options: &OcrOptions) -> String {
        if options.languages.is_empty() {
            "eng".to_string()
        } else {
            options.languages.join("+")
        }
    }
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn recognize(&self, jpeg: &[u8], options: &OcrOptions) -> Result<String, OcrError> {
        // Removed when `image_file` drops.
        let mut image_file = tempfile::Builder::new()
            .prefix("adaptxt-ocr-")
            .suffix(".jpg")
            .tempfile()?;
        image_file.write_all(jpeg)?;
        image_file.flush()?;

        let mut cmd = tokio::process::Command::new(&self.binary);
        cmd.arg(image_file.path())
            .arg("stdout")
            .arg("-l")
            .arg(Self::language_arg(options))
            .arg("--psm")
            .arg("3")
            .stdin(Stdio::null())
            .kill_on_drop(true);
        if !options.hardware_acceleration {
            cmd.env("OMP_THREAD_LIMIT", "1");
        }

        let output = tokio::time::timeout(Duration::from_secs(options.timeout_secs), cmd.output())
            .await
            .map_err(|_| OcrError::Timeout(options.timeout_secs))?
            .map_err(|source| OcrError::Launch {
                binary: self.binary.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(OcrError::Exit {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).to_string();
        debug!("tesseract: {} chars", text.len());
        Ok(text)
    }
}

// ── Vision LLM ──────────────────────────────────────────────────────────────

/// OCR by a vision-capable LLM.
pub struct VisionOcr {
    provider: Arc<dyn LLMProvider>,
    settings: ChatSettings,
}

impl VisionOcr {
    pub fn new(provider: Arc<dyn LLMProvider>, settings: ChatSettings) -> Self {
        Self { provider, settings }
    }
}

#[async_trait]
impl OcrEngine for VisionOcr {
    fn name(&self) -> &str {
        "vision"
    }

    async fn recognize(&self, jpeg: &[u8], _options: &OcrOptions) -> Result<String, OcrError> {
        let image = ImageData::new(to_base64(jpeg), "image/jpeg").with_detail("high");
        let messages = vec![
            ChatMessage::system(OCR_SYSTEM_PROMPT),
            ChatMessage::user_with_images("", vec![image]),
        ];
        complete(&self.provider, &messages, &self.settings)
            .await
            .map_err(|e| OcrError::Engine(e.to_string()))
    }
}
