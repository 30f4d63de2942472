//! Run orchestration.
//!
//! A [`Session`] bundles the engine handles one run needs. It is opened from
//! a [`PipelineConfig`], used for a single document (or a single speech
//! clip) and dropped; nothing is shared between runs.
//!
//! ```text
//! Document ─▶ extract ─▶ Outcome<text> ─▶ detect ─▶ translate ─▶ (summarize)
//!                              │
//!                              └─ not Success: detection and translation skipped
//! ```
//!
//! Every stage runs at most once. Only setup failures are returned as
//! `Err`; stage failures are carried in the [`Outcome`]s of the result.

use crate::config::{OcrBackend, PipelineConfig, SummaryBackend, TranslationBackend};
use crate::error::{AdaptxtError, StageError};
use crate::language::TargetLanguage;
use crate::output::{
    Analysis, DocumentInfo, Outcome, PipelineOutput, PipelineStats, SpeechResult, SummaryResult,
};
use crate::pipeline::detect::detect_language;
use crate::pipeline::extract::extract;
use crate::pipeline::input::{resolve_document, Document};
use crate::pipeline::llm::ChatSettings;
use crate::pipeline::ocr::{OcrEngine, OcrOptions, TesseractOcr, VisionOcr};
use crate::pipeline::speech::{AudioClip, SpeechRecognizer, WhisperRecognizer};
use crate::pipeline::summarize::{
    summarize_and_translate, ExtractiveSummarizer, LlmSummarizer, Summarizer,
};
use crate::pipeline::translate::{translate_text, GoogleTranslator, LlmTranslator, Translator};
use crate::progress::{NoopProgressCallback, ProgressCallback, Stage};
use edgequake_llm::{LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Default model when a provider is named without one.
pub const DEFAULT_MODEL: &str = "gpt-4.1-nano";

/// Engine handles injected into [`Session::with_engines`].
pub struct Engines {
    pub ocr: Arc<dyn OcrEngine>,
    pub translator: Arc<dyn Translator>,
    pub summarizer: Arc<dyn Summarizer>,
    /// `None` disables the speech flow.
    pub speech: Option<Arc<dyn SpeechRecognizer>>,
}

/// The per-run bundle of engines.
pub struct Session {
    config: PipelineConfig,
    ocr: Arc<dyn OcrEngine>,
    ocr_options: OcrOptions,
    translator: Arc<dyn Translator>,
    summarizer: Arc<dyn Summarizer>,
    speech: Result<Arc<dyn SpeechRecognizer>, StageError>,
    progress: ProgressCallback,
}

impl Session {
    /// Build engines from `config`.
    ///
    /// The LLM provider is resolved only when a configured backend needs it,
    /// so the default (Tesseract + Google + extractive) needs no API key.
    pub async fn open(config: &PipelineConfig) -> Result<Self, AdaptxtError> {
        let provider = if config.needs_llm() {
            Some(resolve_provider(config).await?)
        } else {
            None
        };
        let settings = ChatSettings::from_config(config);

        let ocr: Arc<dyn OcrEngine> = match (config.ocr_backend, &provider) {
            (OcrBackend::Vision, Some(p)) => Arc::new(VisionOcr::new(Arc::clone(p), settings)),
            _ => Arc::new(TesseractOcr::new()),
        };

        let translator: Arc<dyn Translator> = match (config.translation_backend, &provider) {
            (TranslationBackend::Llm, Some(p)) => {
                Arc::new(LlmTranslator::new(Arc::clone(p), settings))
            }
            _ => Arc::new(
                GoogleTranslator::from_config(config)
                    .map_err(|e| AdaptxtError::Internal(format!("HTTP client: {e}")))?,
            ),
        };

        let summarizer: Arc<dyn Summarizer> = match (config.summary_backend, &provider) {
            (SummaryBackend::Llm, Some(p)) => {
                Arc::new(LlmSummarizer::new(Arc::clone(p), settings))
            }
            _ => Arc::new(ExtractiveSummarizer::new(config.summary_sentences)),
        };

        let speech = WhisperRecognizer::from_config(config)
            .map(|w| Arc::new(w) as Arc<dyn SpeechRecognizer>);
        if let Err(ref e) = speech {
            debug!("Speech flow disabled: {}", e);
        }

        info!(
            "Session opened: ocr={}, translator={}, summarizer={}",
            ocr.name(),
            translator.name(),
            summarizer.name()
        );

        Ok(Self {
            config: config.clone(),
            ocr,
            ocr_options: OcrOptions::from_config(config),
            translator,
            summarizer,
            speech,
            progress: progress_of(config),
        })
    }

    /// Build a session around caller-supplied engines.
    pub fn with_engines(config: &PipelineConfig, engines: Engines) -> Self {
        Self {
            config: config.clone(),
            ocr: engines.ocr,
            ocr_options: OcrOptions::from_config(config),
            translator: engines.translator,
            summarizer: engines.summarizer,
            speech: engines.speech.ok_or_else(|| StageError::SpeechFailed {
                detail: "no speech recognizer configured".to_string(),
            }),
            progress: progress_of(config),
        }
    }

    /// Extract text and detect its language.
    pub async fn analyze(&self, document: &Document) -> Result<Analysis, AdaptxtError> {
        self.progress.on_stage_start(Stage::Extraction);
        let extraction = extract(
            document,
            self.ocr.as_ref(),
            &self.ocr_options,
            self.config.password.as_deref(),
            self.progress.as_ref(),
        )
        .await?;
        let text = extraction.outcome();
        self.progress.on_stage_complete(Stage::Extraction, text.status());

        let language = match &text {
            Outcome::Success(t) => {
                self.progress.on_stage_start(Stage::Detection);
                let language = detect_language(t);
                self.progress.on_stage_complete(Stage::Detection, language.status());
                language
            }
            _ => Outcome::Empty,
        };

        Ok(Analysis {
            extraction,
            text,
            language,
        })
    }

    /// Translate the analysed text. `Empty` when there is no text.
    pub async fn translate(&self, analysis: &Analysis, target: &TargetLanguage) -> Outcome<String> {
        let Outcome::Success(text) = &analysis.text else {
            debug!("No text extracted; translation skipped");
            return Outcome::Empty;
        };
        self.translate_str(text, target).await
    }

    /// Full document run.
    pub async fn run(
        &self,
        document: &Document,
        target: &TargetLanguage,
        summarize: bool,
    ) -> Result<PipelineOutput, AdaptxtError> {
        let start = Instant::now();

        let analysis = self.analyze(document).await?;
        let extraction_ms = start.elapsed().as_millis() as u64;

        let translation_start = Instant::now();
        let translation = self.translate(&analysis, target).await;
        let translation_ms = translation_start.elapsed().as_millis() as u64;

        let summary = match (&analysis.text, summarize) {
            (Outcome::Success(text), true) => Some(self.summarize(text, target).await),
            _ => None,
        };

        let stats = PipelineStats {
            total_units: analysis.extraction.units.len(),
            failed_units: analysis.extraction.failed_units(),
            extraction_ms,
            translation_ms,
            total_duration_ms: start.elapsed().as_millis() as u64,
        };
        info!(
            "Run finished: text={}, language={}, translation={} in {}ms",
            analysis.text.status(),
            analysis.language.language_or_unknown(),
            translation.status(),
            stats.total_duration_ms
        );

        Ok(PipelineOutput {
            document: DocumentInfo {
                name: document.name.clone(),
                format: document.format,
                size_bytes: document.bytes.len(),
            },
            analysis,
            target: *target,
            translation,
            summary,
            stats,
        })
    }

    /// Summarize `text` and translate the summary.
    pub async fn summarize(&self, text: &str, target: &TargetLanguage) -> SummaryResult {
        self.progress.on_stage_start(Stage::Summarization);
        let result =
            summarize_and_translate(self.summarizer.as_ref(), self.translator.as_ref(), text, target)
                .await;
        let status = match (&result.summary, &result.translated) {
            (Some(_), Some(_)) => "success",
            (Some(_), None) => "untranslated",
            _ => "empty",
        };
        self.progress.on_stage_complete(Stage::Summarization, status);
        result
    }

    /// Transcribe a recorded clip and translate the transcript.
    pub async fn transcribe(&self, clip: &AudioClip, target: &TargetLanguage) -> SpeechResult {
        self.progress.on_stage_start(Stage::Speech);
        let transcript = match &self.speech {
            Err(e) => Outcome::Failed(e.clone()),
            Ok(recognizer) => match recognizer.transcribe(clip).await {
                Ok(Some(text)) => Outcome::from_text(text),
                Ok(None) => Outcome::Empty,
                Err(e) => Outcome::Failed(e),
            },
        };
        self.progress.on_stage_complete(Stage::Speech, transcript.status());

        let translation = match &transcript {
            Outcome::Success(text) => self.translate_str(text, target).await,
            _ => Outcome::Empty,
        };
        SpeechResult {
            transcript,
            translation,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    async fn translate_str(&self, text: &str, target: &TargetLanguage) -> Outcome<String> {
        self.progress.on_stage_start(Stage::Translation);
        let outcome = translate_text(self.translator.as_ref(), text, target).await;
        self.progress.on_stage_complete(Stage::Translation, outcome.status());
        outcome
    }
}

fn progress_of(config: &PipelineConfig) -> ProgressCallback {
    config
        .progress_callback
        .clone()
        .unwrap_or_else(|| Arc::new(NoopProgressCallback))
}

// ── Entry points ─────────────────────────────────────────────────────────

/// Process a local path or URL end to end.
///
/// # Example
/// ```rust,no_run
/// use adaptxt::{process, PipelineConfig, TargetLanguage};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = PipelineConfig::default();
/// let target = TargetLanguage::from_code("fr").unwrap_or_default();
/// let output = process("scan.png", &target, &config).await?;
/// println!("{}", output.translation.text_or(adaptxt::output::TRANSLATION_ERROR));
/// # Ok(())
/// # }
/// ```
pub async fn process(
    input: impl AsRef<str>,
    target: &TargetLanguage,
    config: &PipelineConfig,
) -> Result<PipelineOutput, AdaptxtError> {
    let document = resolve_document(input.as_ref(), config.download_timeout_secs).await?;
    let session = Session::open(config).await?;
    session.run(&document, target, config.include_summary).await
}

/// Synchronous wrapper around [`process`].
///
/// Creates a temporary tokio runtime internally.
pub fn process_sync(
    input: impl AsRef<str>,
    target: &TargetLanguage,
    config: &PipelineConfig,
) -> Result<PipelineOutput, AdaptxtError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| AdaptxtError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(process(input, target, config))
}

/// Process an uploaded document held in memory.
///
/// `name` supplies the extension, which is validated before anything else.
pub async fn process_bytes(
    name: &str,
    bytes: Vec<u8>,
    target: &TargetLanguage,
    config: &PipelineConfig,
) -> Result<PipelineOutput, AdaptxtError> {
    let document = Document::from_bytes(name, bytes)?;
    let session = Session::open(config).await?;
    session.run(&document, target, config.include_summary).await
}

// ── Provider resolution ──────────────────────────────────────────────────

fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, AdaptxtError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        AdaptxtError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`), used as-is.
/// 2. **Named provider + model** (`config.provider_name`).
/// 3. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`).
/// 4. **`OPENAI_API_KEY`** present: OpenAI with the configured model.
/// 5. **Full auto-detection** (`ProviderFactory::from_env`).
async fn resolve_provider(config: &PipelineConfig) -> Result<Arc<dyn LLMProvider>, AdaptxtError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);

    if let Some(ref name) = config.provider_name {
        return create_provider(name, model);
    }

    if let (Ok(prov), Ok(env_model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !env_model.is_empty() {
            return create_provider(&prov, &env_model);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            return create_provider("openai", model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| AdaptxtError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "An LLM backend was selected but no provider could be auto-detected.\n\
                Set OPENAI_API_KEY or ANTHROPIC_API_KEY, pass --provider, or use the\n\
                default tesseract/google/extractive backends.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}
