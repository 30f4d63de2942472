//! Configuration types for a pipeline run.
//!
//! Every knob lives in [`PipelineConfig`], built via its
//! [`PipelineConfigBuilder`]. Both front ends (CLI and web UI) map their
//! flags onto the same builder, so a setting such as hardware acceleration
//! behaves identically wherever the run was started.

use crate::error::AdaptxtError;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Default OpenAI-compatible base URL for speech transcription.
pub const DEFAULT_SPEECH_ENDPOINT: &str = "https://api.openai.com/v1";

/// Default keyless Google translate endpoint.
pub const DEFAULT_TRANSLATE_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// Configuration for one pipeline run.
///
/// # Example
/// ```rust
/// use adaptxt::{OcrBackend, PipelineConfig};
///
/// let config = PipelineConfig::builder()
///     .ocr_backend(OcrBackend::Tesseract)
///     .ocr_languages(vec!["eng".into(), "hin".into()])
///     .summary_sentences(5)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct PipelineConfig {
    /// OCR engine for images and embedded PDF images. Default: Tesseract.
    pub ocr_backend: OcrBackend,

    /// Tesseract language packs, e.g. `["eng", "hin"]`. Default: `["eng"]`.
    pub ocr_languages: Vec<String>,

    /// Let the OCR engine use hardware parallelism. Default: false.
    ///
    /// Off pins Tesseract's OpenMP pool to one thread. The vision backend
    /// runs remotely and is unaffected.
    pub hardware_acceleration: bool,

    /// Translation backend. Default: Google.
    pub translation_backend: TranslationBackend,

    /// Summarization backend. Default: Extractive.
    pub summary_backend: SummaryBackend,

    /// Sentences kept by the extractive summarizer. Default: 3.
    pub summary_sentences: usize,

    /// Produce a translated summary in [`crate::process`]. Default: false.
    pub include_summary: bool,

    /// LLM model identifier for vision OCR / LLM translation / LLM summaries.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature for LLM calls. Default: 0.1.
    pub temperature: f32,

    /// Maximum tokens an LLM call may generate. Default: 4096.
    pub max_tokens: usize,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Timeout for each translation / transcription HTTP call. Default: 60.
    pub request_timeout_secs: u64,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Endpoint for the Google translation backend.
    pub translate_endpoint: String,

    /// OpenAI-compatible base URL for speech transcription.
    pub speech_endpoint: String,

    /// Transcription model. Default: "whisper-1".
    pub speech_model: String,

    /// Optional progress events sink.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ocr_backend: OcrBackend::default(),
            ocr_languages: vec!["eng".to_string()],
            hardware_acceleration: false,
            translation_backend: TranslationBackend::default(),
            summary_backend: SummaryBackend::default(),
            summary_sentences: 3,
            include_summary: false,
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.1,
            max_tokens: 4096,
            password: None,
            request_timeout_secs: 60,
            download_timeout_secs: 120,
            translate_endpoint: DEFAULT_TRANSLATE_ENDPOINT.to_string(),
            speech_endpoint: DEFAULT_SPEECH_ENDPOINT.to_string(),
            speech_model: "whisper-1".to_string(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("ocr_backend", &self.ocr_backend)
            .field("ocr_languages", &self.ocr_languages)
            .field("hardware_acceleration", &self.hardware_acceleration)
            .field("translation_backend", &self.translation_backend)
            .field("summary_backend", &self.summary_backend)
            .field("summary_sentences", &self.summary_sentences)
            .field("include_summary", &self.include_summary)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("speech_model", &self.speech_model)
            .finish()
    }
}

impl PipelineConfig {
    /// Create a new builder for `PipelineConfig`.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }

    /// True when any configured backend talks to an LLM provider.
    pub fn needs_llm(&self) -> bool {
        self.ocr_backend == OcrBackend::Vision
            || self.translation_backend == TranslationBackend::Llm
            || self.summary_backend == SummaryBackend::Llm
    }
}

/// Builder for [`PipelineConfig`].
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn ocr_backend(mut self, backend: OcrBackend) -> Self {
        self.config.ocr_backend = backend;
        self
    }

    pub fn ocr_languages(mut self, languages: Vec<String>) -> Self {
        self.config.ocr_languages = languages;
        self
    }

    pub fn hardware_acceleration(mut self, v: bool) -> Self {
        self.config.hardware_acceleration = v;
        self
    }

    pub fn translation_backend(mut self, backend: TranslationBackend) -> Self {
        self.config.translation_backend = backend;
        self
    }

    pub fn summary_backend(mut self, backend: SummaryBackend) -> Self {
        self.config.summary_backend = backend;
        self
    }

    pub fn summary_sentences(mut self, n: usize) -> Self {
        self.config.summary_sentences = n;
        self
    }

    pub fn include_summary(mut self, v: bool) -> Self {
        self.config.include_summary = v;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn translate_endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.translate_endpoint = url.into();
        self
    }

    pub fn speech_endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.speech_endpoint = url.into();
        self
    }

    pub fn speech_model(mut self, model: impl Into<String>) -> Self {
        self.config.speech_model = model.into();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, AdaptxtError> {
        let c = &self.config;
        if c.ocr_languages.iter().all(|l| l.trim().is_empty()) {
            return Err(AdaptxtError::InvalidConfig(
                "At least one OCR language is required".into(),
            ));
        }
        if c.summary_sentences == 0 {
            return Err(AdaptxtError::InvalidConfig(
                "Summary sentence count must be ≥ 1".into(),
            ));
        }
        if c.request_timeout_secs == 0 {
            return Err(AdaptxtError::InvalidConfig(
                "Request timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Which OCR engine reads raster content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrBackend {
    /// Local `tesseract` binary. (default)
    #[default]
    Tesseract,
    /// Vision LLM through edgequake-llm.
    Vision,
}

/// Which service translates extracted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationBackend {
    /// Keyless Google translate endpoint with automatic source detection. (default)
    #[default]
    Google,
    /// Chat completion through edgequake-llm.
    Llm,
}

/// Which routine produces summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryBackend {
    /// Word-frequency sentence extraction, offline. (default)
    #[default]
    Extractive,
    /// Chat completion through edgequake-llm.
    Llm,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_need_no_llm() {
        let config = PipelineConfig::default();
        assert_eq!(config.ocr_languages, vec!["eng".to_string()]);
        assert!(!config.hardware_acceleration);
        assert!(!config.needs_llm());
    }

    #[test]
    fn any_llm_backend_needs_provider() {
        let config = PipelineConfig::builder()
            .summary_backend(SummaryBackend::Llm)
            .build()
            .expect("valid config");
        assert!(config.needs_llm());
    }

    #[test]
    fn build_rejects_zero_sentences() {
        let err = PipelineConfig::builder().summary_sentences(0).build();
        assert!(matches!(err, Err(AdaptxtError::InvalidConfig(_))));
    }

    #[test]
    fn build_rejects_blank_ocr_languages() {
        let err = PipelineConfig::builder()
            .ocr_languages(vec!["  ".into()])
            .build();
        assert!(matches!(err, Err(AdaptxtError::InvalidConfig(_))));
    }

    #[test]
    fn temperature_is_clamped() {
        let config = PipelineConfig::builder()
            .temperature(5.0)
            .build()
            .expect("valid config");
        assert_eq!(config.temperature, 2.0);
    }
}
