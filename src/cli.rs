//! Command-line plumbing shared by the `adaptxt` and `adaptxt-web` binaries.
//!
//! Both binaries flatten [`EngineArgs`] into their own parser, so an engine
//! flag (and its `ADAPTXT_*` variable) means the same thing in the batch CLI
//! and in the web UI.

use crate::config::{
    OcrBackend, PipelineConfig, PipelineConfigBuilder, SummaryBackend, TranslationBackend,
};
use clap::{Args, ValueEnum};
use std::io;
use tracing_subscriber::EnvFilter;

/// Engine selection and tuning flags.
#[derive(Args, Debug, Clone)]
pub struct EngineArgs {
    /// OCR engine for images and embedded PDF images.
    #[arg(long, env = "ADAPTXT_OCR", value_enum, default_value = "tesseract")]
    pub ocr: OcrArg,

    /// Tesseract language packs, joined with '+' (e.g. eng+hin).
    #[arg(long, env = "ADAPTXT_OCR_LANG", default_value = "eng", value_delimiter = '+')]
    pub ocr_lang: Vec<String>,

    /// Let the OCR engine use all cores / the GPU.
    #[arg(long, env = "ADAPTXT_GPU")]
    pub gpu: bool,

    /// Translation backend.
    #[arg(long, env = "ADAPTXT_TRANSLATOR", value_enum, default_value = "google")]
    pub translator: TranslatorArg,

    /// Summarization backend.
    #[arg(long, env = "ADAPTXT_SUMMARIZER", value_enum, default_value = "extractive")]
    pub summarizer: SummarizerArg,

    /// Sentences kept by the extractive summarizer.
    #[arg(long, env = "ADAPTXT_SENTENCES", default_value_t = 3,
          value_parser = clap::value_parser!(u16).range(1..=50))]
    pub sentences: u16,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(
        long,
        env = "ADAPTXT_PROVIDER",
        long_help = "LLM provider for --ocr vision, --translator llm and --summarizer llm.\n\
          Auto-detected from API key env vars if not set."
    )]
    pub provider: Option<String>,

    /// LLM model ID (e.g. gpt-4.1-nano, gpt-4.1, claude-sonnet-4-20250514).
    #[arg(long, env = "ADAPTXT_MODEL")]
    pub model: Option<String>,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "ADAPTXT_TEMPERATURE", default_value_t = 0.1)]
    pub temperature: f32,

    /// Max LLM output tokens per call.
    #[arg(long, env = "ADAPTXT_MAX_TOKENS", default_value_t = 4096)]
    pub max_tokens: usize,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "ADAPTXT_PASSWORD")]
    pub password: Option<String>,

    /// Timeout for each OCR, translation and transcription call, in seconds.
    #[arg(long, env = "ADAPTXT_REQUEST_TIMEOUT", default_value_t = 60)]
    pub request_timeout: u64,

    /// HTTP download timeout for URL inputs, in seconds.
    #[arg(long, env = "ADAPTXT_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    pub download_timeout: u64,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum OcrArg {
    Tesseract,
    Vision,
}

impl From<OcrArg> for OcrBackend {
    fn from(v: OcrArg) -> Self {
        match v {
            OcrArg::Tesseract => OcrBackend::Tesseract,
            OcrArg::Vision => OcrBackend::Vision,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum TranslatorArg {
    Google,
    Llm,
}

impl From<TranslatorArg> for TranslationBackend {
    fn from(v: TranslatorArg) -> Self {
        match v {
            TranslatorArg::Google => TranslationBackend::Google,
            TranslatorArg::Llm => TranslationBackend::Llm,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum SummarizerArg {
    Extractive,
    Llm,
}

impl From<SummarizerArg> for SummaryBackend {
    fn from(v: SummarizerArg) -> Self {
        match v {
            SummarizerArg::Extractive => SummaryBackend::Extractive,
            SummarizerArg::Llm => SummaryBackend::Llm,
        }
    }
}

impl EngineArgs {
    /// Map the flags onto a config builder.
    pub fn builder(&self) -> PipelineConfigBuilder {
        let mut builder = PipelineConfig::builder()
            .ocr_backend(self.ocr.into())
            .ocr_languages(self.ocr_lang.clone())
            .hardware_acceleration(self.gpu)
            .translation_backend(self.translator.into())
            .summary_backend(self.summarizer.into())
            .summary_sentences(self.sentences as usize)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .request_timeout_secs(self.request_timeout)
            .download_timeout_secs(self.download_timeout);

        if let Some(ref provider) = self.provider {
            builder = builder.provider_name(provider);
        }
        if let Some(ref model) = self.model {
            builder = builder.model(model);
        }
        if let Some(ref password) = self.password {
            builder = builder.password(password);
        }
        builder
    }
}

/// Install the stderr `tracing` subscriber.
///
/// INFO-level library logs are suppressed while a progress display is
/// active; `RUST_LOG` overrides everything.
pub fn init_tracing(verbose: bool, quiet: bool, progress: bool) {
    let filter = if verbose {
        "debug"
    } else if quiet || progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        engine: EngineArgs,
    }

    #[test]
    fn defaults_map_to_default_config() {
        let cli = TestCli::parse_from(["adaptxt"]);
        let config = cli.engine.builder().build().expect("valid");
        assert_eq!(config.ocr_backend, OcrBackend::Tesseract);
        assert_eq!(config.translation_backend, TranslationBackend::Google);
        assert_eq!(config.ocr_languages, vec!["eng".to_string()]);
        assert!(!config.hardware_acceleration);
        assert!(!config.needs_llm());
    }

    #[test]
    fn ocr_languages_split_on_plus() {
        let cli = TestCli::parse_from(["adaptxt", "--ocr-lang", "eng+hin", "--gpu"]);
        let config = cli.engine.builder().build().expect("valid");
        assert_eq!(config.ocr_languages, vec!["eng".to_string(), "hin".to_string()]);
        assert!(config.hardware_acceleration);
    }

    #[test]
    fn llm_flags_need_provider() {
        let cli = TestCli::parse_from(["adaptxt", "--translator", "llm", "--model", "gpt-4.1"]);
        let config = cli.engine.builder().build().expect("valid");
        assert!(config.needs_llm());
        assert_eq!(config.model.as_deref(), Some("gpt-4.1"));
    }

    #[test]
    fn zero_sentences_rejected_by_parser() {
        assert!(TestCli::try_parse_from(["adaptxt", "--sentences", "0"]).is_err());
    }
}
