//! Error types for the adaptxt library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`AdaptxtError`] is **fatal**: the run cannot start at all (file missing,
//!   unsupported format, pdfium not available, provider not configured).
//!   Returned as `Err(AdaptxtError)` from document intake and session setup.
//!
//! * [`StageError`] is **non-fatal**: one page, one image or one stage failed.
//!   Carried inside [`crate::output::Outcome::Failed`] and
//!   [`crate::output::UnitReport`] so the rest of the run can still finish
//!   with degraded output, and callers can tell a failure apart from a
//!   document that simply had no text.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the adaptxt library.
#[derive(Debug, Error)]
pub enum AdaptxtError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The extension is not one of pdf, jpg, jpeg, png.
    #[error("Invalid file format '{name}'. Supported formats: PDF, JPG, JPEG, PNG.")]
    UnsupportedFormat { name: String },

    /// The extension is supported but the bytes do not match it.
    #[error("'{name}' does not look like a {expected} file (first bytes: {magic:02X?})")]
    FormatMismatch {
        name: String,
        expected: &'static str,
        magic: Vec<u8>,
    },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{name}' is corrupt: {detail}")]
    CorruptPdf { name: String, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{name}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { name: String },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{name}'")]
    WrongPassword { name: String },

    // ── Engine setup errors ───────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Place libpdfium next to the binary, install it system-wide, or set\n\
PDFIUM_LIB_PATH=/path/to/libpdfium.\n"
    )]
    PdfiumBindingFailed(String),

    /// The configured LLM provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single extraction unit or pipeline stage.
#[derive(Debug, Clone, PartialEq, Error, serde::Serialize, serde::Deserialize)]
pub enum StageError {
    /// The PDF could not be opened, so no unit could run.
    #[error("Document unreadable: {detail}")]
    DocumentUnreadable { detail: String },

    /// Reading the text layer of a page failed.
    #[error("Page {page}: text layer extraction failed: {detail}")]
    PageTextFailed { page: usize, detail: String },

    /// An embedded or uploaded image could not be decoded or re-encoded.
    #[error("{unit}: image decoding failed: {detail}")]
    ImageDecodeFailed { unit: String, detail: String },

    /// The OCR engine failed on an image.
    #[error("{unit}: OCR failed ({engine}): {detail}")]
    OcrFailed {
        unit: String,
        engine: String,
        detail: String,
    },

    /// The language detector could not decide.
    #[error("Language detection failed: {detail}")]
    DetectionFailed { detail: String },

    /// The translation backend failed.
    #[error("Translation failed ({backend}): {detail}")]
    TranslationFailed { backend: String, detail: String },

    /// The summarizer failed.
    #[error("Summarization failed ({backend}): {detail}")]
    SummaryFailed { backend: String, detail: String },

    /// The speech recognizer failed.
    #[error("Speech recognition failed: {detail}")]
    SpeechFailed { detail: String },
}
