//! Document intake: validate a path, URL or upload and load its bytes.
//!
//! The extension check runs first, before the file is opened, so an upload
//! such as `report.docx` is rejected without any extraction work. Magic bytes
//! are then checked against the claimed format so callers get a precise
//! error instead of an opaque decoder failure deep in the pipeline.

use crate::error::AdaptxtError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Extensions accepted by both front ends.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "jpg", "jpeg", "png"];

/// Supported document encodings. `.jpg` and `.jpeg` are both [`DocumentFormat::Jpeg`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Jpeg,
    Png,
}

impl DocumentFormat {
    /// Case-insensitive extension lookup (without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "jpg" | "jpeg" => Some(DocumentFormat::Jpeg),
            "png" => Some(DocumentFormat::Png),
            _ => None,
        }
    }

    /// Resolve the format from a file name, rejecting anything unsupported.
    pub fn from_file_name(name: &str) -> Result<Self, AdaptxtError> {
        Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| AdaptxtError::UnsupportedFormat {
                name: name.to_string(),
            })
    }

    /// Guess the format from leading bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        [DocumentFormat::Pdf, DocumentFormat::Jpeg, DocumentFormat::Png]
            .into_iter()
            .find(|f| bytes.starts_with(f.magic()))
    }

    pub fn magic(&self) -> &'static [u8] {
        match self {
            DocumentFormat::Pdf => b"%PDF",
            DocumentFormat::Jpeg => &[0xFF, 0xD8, 0xFF],
            DocumentFormat::Png => &[0x89, b'P', b'N', b'G'],
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "application/pdf",
            DocumentFormat::Jpeg => "image/jpeg",
            DocumentFormat::Png => "image/png",
        }
    }

    pub fn is_image(&self) -> bool {
        !matches!(self, DocumentFormat::Pdf)
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::Jpeg => "JPEG",
            DocumentFormat::Png => "PNG",
        };
        f.write_str(s)
    }
}

/// A document held in memory for the duration of one run.
#[derive(Clone)]
pub struct Document {
    pub name: String,
    pub format: DocumentFormat,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("name", &self.name)
            .field("format", &self.format)
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl Document {
    /// Build a document from uploaded bytes, validating name then content.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, AdaptxtError> {
        let name = name.into();
        let format = DocumentFormat::from_file_name(&name)?;
        check_magic(&name, format, &bytes)?;
        Ok(Self { name, format, bytes })
    }

    /// Load a local file. The extension is checked before the file is opened.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AdaptxtError> {
        let path = path.as_ref();
        let name = path.to_string_lossy().to_string();
        let format = DocumentFormat::from_file_name(&name)?;

        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AdaptxtError::FileNotFound {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::PermissionDenied => AdaptxtError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => AdaptxtError::Internal(format!("Failed to read '{}': {}", path.display(), e)),
        })?;

        check_magic(&name, format, &bytes)?;
        debug!("Loaded {} document: {} ({} bytes)", format, path.display(), bytes.len());
        Ok(Self { name, format, bytes })
    }
}

fn check_magic(name: &str, format: DocumentFormat, bytes: &[u8]) -> Result<(), AdaptxtError> {
    if bytes.starts_with(format.magic()) {
        return Ok(());
    }
    Err(AdaptxtError::FormatMismatch {
        name: name.to_string(),
        expected: match format {
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::Jpeg => "JPEG",
            DocumentFormat::Png => "PNG",
        },
        magic: bytes.iter().take(4).copied().collect(),
    })
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve a user-supplied path or HTTP/HTTPS URL to a [`Document`].
pub async fn resolve_document(input: &str, timeout_secs: u64) -> Result<Document, AdaptxtError> {
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        Document::from_path(PathBuf::from(input.trim()))
    }
}

/// Download a URL into memory.
///
/// The name comes from the last path segment; when it carries no supported
/// extension the format is sniffed from the content instead.
async fn download_url(url: &str, timeout_secs: u64) -> Result<Document, AdaptxtError> {
    info!("Downloading document from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| AdaptxtError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            AdaptxtError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            AdaptxtError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(AdaptxtError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| AdaptxtError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?
        .to_vec();

    let mut name = file_name_from_url(url);
    if DocumentFormat::from_file_name(&name).is_err() {
        if let Some(format) = DocumentFormat::sniff(&bytes) {
            name = format!("{name}.{}", default_extension(format));
        }
    }

    info!("Downloaded {} bytes as '{}'", bytes.len(), name);
    Document::from_bytes(name, bytes)
}

fn default_extension(format: DocumentFormat) -> &'static str {
    match format {
        DocumentFormat::Pdf => "pdf",
        DocumentFormat::Jpeg => "jpg",
        DocumentFormat::Png => "png",
    }
}

/// Last non-empty path segment of `url`, or `"download"`.
fn file_name_from_url(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .filter(|last| !last.is_empty())
        .unwrap_or_else(|| "download".to_string())
}
