//! Result types produced by a pipeline run.
//!
//! Every stage reports through [`Outcome`], a three-way tag that keeps
//! "nothing was found" apart from "something broke". The legacy display
//! values ("unknown", "Translation error") are produced only when rendering.

use crate::error::StageError;
use crate::pipeline::input::DocumentFormat;
use crate::language::{LanguageCode, TargetLanguage};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Shown instead of a language code when detection produced nothing.
pub const UNKNOWN_LANGUAGE: &str = "unknown";

/// Shown instead of translated text when the translation stage failed.
pub const TRANSLATION_ERROR: &str = "Translation error";

/// Shown when neither the text layer nor OCR produced any text.
pub const NO_TEXT_EXTRACTED: &str = "No text could be extracted from the PDF or images.";

/// Tagged result of one pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Outcome<T> {
    /// The stage produced a value.
    Success(T),
    /// The stage ran (or was skipped) and there was nothing to produce.
    Empty,
    /// The stage failed.
    Failed(StageError),
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Outcome::Empty)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Success(v) => Some(v),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&StageError> {
        match self {
            Outcome::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Success(v) => Outcome::Success(f(v)),
            Outcome::Empty => Outcome::Empty,
            Outcome::Failed(e) => Outcome::Failed(e),
        }
    }

    /// Short machine-readable status: `success`, `empty` or `failed`.
    pub fn status(&self) -> &'static str {
        match self {
            Outcome::Success(_) => "success",
            Outcome::Empty => "empty",
            Outcome::Failed(_) => "failed",
        }
    }
}

impl Outcome<String> {
    /// Wrap text, treating whitespace-only text as [`Outcome::Empty`].
    pub fn from_text(text: String) -> Self {
        if text.trim().is_empty() {
            Outcome::Empty
        } else {
            Outcome::Success(text)
        }
    }

    /// The text on success, `fallback` otherwise.
    pub fn text_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self {
            Outcome::Success(t) => t,
            _ => fallback,
        }
    }
}

impl Outcome<Detection> {
    /// Detected code, or `"unknown"` when detection was skipped or failed.
    pub fn language_or_unknown(&self) -> &str {
        match self {
            Outcome::Success(d) => d.code.as_str(),
            _ => UNKNOWN_LANGUAGE,
        }
    }
}

/// A language detected in extracted text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub code: LanguageCode,
    /// English name, e.g. "Hindi".
    pub name: String,
    /// Detector confidence in `0.0..=1.0`.
    pub confidence: f64,
}

/// One unit of extraction work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractionUnit {
    /// Text layer of a PDF page (1-indexed).
    PageText { page: usize },
    /// Embedded raster image on a PDF page (both 1-indexed).
    PageImage { page: usize, index: usize },
    /// A standalone image document.
    Image,
}

impl fmt::Display for ExtractionUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionUnit::PageText { page } => write!(f, "page {page} text"),
            ExtractionUnit::PageImage { page, index } => write!(f, "page {page} image {index}"),
            ExtractionUnit::Image => f.write_str("image"),
        }
    }
}

/// What happened to one extraction unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitReport {
    pub unit: ExtractionUnit,
    /// Characters contributed after normalisation.
    pub chars: usize,
    pub duration_ms: u64,
    /// `Some` when the unit failed and contributed nothing.
    pub error: Option<StageError>,
}

/// Output of the extraction stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Extraction {
    /// PDF text layer, pages joined by single spaces.
    pub text_layer: String,
    /// OCR output, images joined by single spaces.
    pub image_text: String,
    pub units: Vec<UnitReport>,
    /// Set when the document could not be opened at all.
    pub document_error: Option<StageError>,
}

impl Extraction {
    /// Text layer followed by OCR text, joined by one space.
    pub fn combined(&self) -> String {
        [self.text_layer.trim(), self.image_text.trim()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn failed_units(&self) -> usize {
        self.units.iter().filter(|u| u.error.is_some()).count()
    }

    /// `Success` when any unit produced text. Otherwise `Failed` when the
    /// document was unreadable or any unit failed (the first error wins), and
    /// `Empty` when every unit ran cleanly and found no glyphs.
    pub fn outcome(&self) -> Outcome<String> {
        let combined = self.combined();
        if !combined.is_empty() {
            return Outcome::Success(combined);
        }
        if let Some(ref e) = self.document_error {
            return Outcome::Failed(e.clone());
        }
        match self.units.iter().find_map(|u| u.error.clone()) {
            Some(e) => Outcome::Failed(e),
            None => Outcome::Empty,
        }
    }
}

/// Extraction plus detection: everything that does not need a target language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub extraction: Extraction,
    pub text: Outcome<String>,
    pub language: Outcome<Detection>,
}

/// Summary of the original text and its translation; either may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub summary: Option<String>,
    pub translated: Option<String>,
}

/// Transcript of a recorded clip and its translation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechResult {
    pub transcript: Outcome<String>,
    pub translation: Outcome<String>,
}

/// Basic facts about the input document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub name: String,
    pub format: DocumentFormat,
    pub size_bytes: usize,
}

/// Timing and unit counts for a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineStats {
    pub total_units: usize,
    pub failed_units: usize,
    pub extraction_ms: u64,
    pub translation_ms: u64,
    pub total_duration_ms: u64,
}

/// Everything a single run produced.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub document: DocumentInfo,
    pub analysis: Analysis,
    pub target: TargetLanguage,
    pub translation: Outcome<String>,
    pub summary: Option<SummaryResult>,
    pub stats: PipelineStats,
}
