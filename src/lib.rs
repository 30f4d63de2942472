//! # adaptxt
//!
//! Extract text from PDFs and images, detect its language, translate it and
//! optionally summarize it.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF / JPG / PNG
//!  │
//!  ├─ 1. Input      validate extension + magic bytes, load path / URL / upload
//!  ├─ 2. Extract    PDF text layer page by page (pdfium, spawn_blocking),
//!  │                then OCR of embedded images; images OCR'd whole
//!  ├─ 3. Normalize  whitespace / invisible-char cleanup per unit
//!  ├─ 4. Detect     whatlang, ISO 639-3 → 639-1
//!  ├─ 5. Translate  Google (keyless) or any edgequake-llm provider
//!  └─ 6. Summarize  extractive or LLM, then translated (optional)
//! ```
//!
//! A failed page or image never aborts a run. Each stage reports an
//! [`Outcome`]: `Success`, `Empty` (nothing to work on) or `Failed` (with a
//! [`StageError`]), so "no text in this document" and "extraction broke" stay
//! distinguishable.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use adaptxt::{process, PipelineConfig, TargetLanguage};
//! use adaptxt::output::{NO_TEXT_EXTRACTED, TRANSLATION_ERROR};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Tesseract + Google + extractive summaries: no API key needed.
//!     let config = PipelineConfig::default();
//!     let target = TargetLanguage::from_code("hi").unwrap_or_default();
//!     let output = process("letter.pdf", &target, &config).await?;
//!
//!     if output.analysis.text.is_success() {
//!         println!("{}", output.analysis.language.language_or_unknown());
//!         println!("{}", output.translation.text_or(TRANSLATION_ERROR));
//!     } else {
//!         println!("{NO_TEXT_EXTRACTED}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `adaptxt` binary (clap + anyhow + tracing-subscriber + indicatif) |
//! | `web`   | on      | Enables the `adaptxt-web` binary and [`server`] (axum + tower-http) |
//!
//! Disable both when using only the library:
//! ```toml
//! adaptxt = { version = "0.1", default-features = false }
//! ```
//!
//! ## Backends
//!
//! | Stage | Default | Alternative |
//! |-------|---------|-------------|
//! | OCR | `tesseract` CLI | vision LLM (`--ocr vision`) |
//! | Translation | Google public endpoint | LLM (`--translator llm`) |
//! | Summary | extractive, 3 sentences | LLM (`--summarizer llm`) |
//! | Speech | OpenAI-compatible Whisper endpoint | |

// ── Modules ──────────────────────────────────────────────────────────────

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod language;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
#[cfg(feature = "web")]
pub mod server;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    OcrBackend, PipelineConfig, PipelineConfigBuilder, SummaryBackend, TranslationBackend,
};
pub use error::{AdaptxtError, StageError};
pub use language::{LanguageCode, TargetLanguage, TARGET_LANGUAGES};
pub use output::{
    Analysis, Detection, Extraction, ExtractionUnit, Outcome, PipelineOutput, PipelineStats,
    SpeechResult, SummaryResult, UnitReport,
};
pub use pipeline::input::{Document, DocumentFormat};
pub use pipeline::ocr::{OcrEngine, OcrOptions};
pub use pipeline::speech::{AudioClip, SpeechRecognizer};
pub use pipeline::summarize::Summarizer;
pub use pipeline::translate::Translator;
pub use progress::{NoopProgressCallback, PipelineProgressCallback, ProgressCallback, Stage};
pub use session::{process, process_bytes, process_sync, Engines, Session};
