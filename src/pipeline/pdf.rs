//! PDF reading: text layers and embedded raster images via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, which keeps thread-local
//! state and blocks while it parses. [`read_pdf`] moves the whole document
//! walk onto the blocking pool so Tokio worker threads never stall.
//!
//! Embedded images are re-encoded to JPEG on the same blocking thread, so the
//! async side only ever receives plain bytes ready for OCR. Images wrapped in
//! form XObjects are found too, in content-stream order.

use crate::error::{AdaptxtError, StageError};
use crate::output::ExtractionUnit;
use crate::pipeline::encode::encode_jpeg;
use pdfium_render::prelude::*;
use tracing::{debug, info, warn};

/// Everything read from one PDF page.
#[derive(Debug)]
pub struct PdfPageContent {
    /// 1-indexed page number.
    pub page: usize,
    pub text: Result<String, StageError>,
    /// JPEG bytes per embedded image, in content-stream order.
    pub images: Vec<Result<Vec<u8>, StageError>>,
}

/// Bind to a pdfium library.
///
/// Lookup order: `PDFIUM_LIB_PATH`, then the working directory, then the
/// system library search path.
pub fn bind_pdfium() -> Result<Pdfium, AdaptxtError> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(path) if !path.trim().is_empty() => {
            debug!("Binding pdfium from PDFIUM_LIB_PATH={}", path);
            Pdfium::bind_to_library(path.trim())
        }
        _ => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| AdaptxtError::PdfiumBindingFailed(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

/// Read every page of a PDF held in memory.
///
/// Fails only when pdfium cannot be bound or the document cannot be opened.
/// Per-page and per-image failures are returned inside [`PdfPageContent`].
pub async fn read_pdf(
    name: &str,
    bytes: Vec<u8>,
    password: Option<String>,
) -> Result<Vec<PdfPageContent>, AdaptxtError> {
    let name = name.to_string();

    tokio::task::spawn_blocking(move || read_pdf_blocking(&name, &bytes, password.as_deref()))
        .await
        .map_err(|e| AdaptxtError::Internal(format!("PDF task panicked: {}", e)))?
}

fn read_pdf_blocking(
    name: &str,
    bytes: &[u8],
    password: Option<&str>,
) -> Result<Vec<PdfPageContent>, AdaptxtError> {
    let pdfium = bind_pdfium()?;

    let document = pdfium
        .load_pdf_from_byte_slice(bytes, password)
        .map_err(|e| open_error(name, password.is_some(), e))?;

    let pages = document.pages();
    info!("PDF loaded: {} pages", pages.len());

    let mut contents = Vec::with_capacity(pages.len() as usize);
    for (idx, page) in pages.iter().enumerate() {
        let page_num = idx + 1;

        let text = page
            .text()
            .map(|t| t.all())
            .map_err(|e| StageError::PageTextFailed {
                page: page_num,
                detail: format!("{:?}", e),
            });

        let mut raw = Vec::new();
        collect_images(page.objects().iter().collect(), &mut classify_object, 0, &mut raw);
        let images = raw
            .into_iter()
            .enumerate()
            .map(|(i, encoded)| {
                encoded.map_err(|detail| {
                    let unit = ExtractionUnit::PageImage {
                        page: page_num,
                        index: i + 1,
                    };
                    warn!("{}: {}", unit, detail);
                    StageError::ImageDecodeFailed {
                        unit: unit.to_string(),
                        detail,
                    }
                })
            })
            .collect::<Vec<_>>();

        debug!("Page {}: {} embedded image(s)", page_num, images.len());
        contents.push(PdfPageContent {
            page: page_num,
            text,
            images,
        });
    }

    Ok(contents)
}

/// Maximum nesting of form XObjects followed when looking for images.
const MAX_FORM_DEPTH: usize = 8;

/// How one page object takes part in image collection.
enum PageNode<N, L> {
    /// A raster image, already encoded (or the reason it could not be).
    Image(L),
    /// A form XObject; its children are visited in content-stream order.
    Form(Vec<N>),
    Other,
}

/// Depth-first walk collecting images in content-stream order, descending
/// into form XObjects up to [`MAX_FORM_DEPTH`].
fn collect_images<N, L>(
    nodes: Vec<N>,
    classify: &mut impl FnMut(N) -> PageNode<N, L>,
    depth: usize,
    out: &mut Vec<L>,
) {
    for node in nodes {
        match classify(node) {
            PageNode::Image(image) => out.push(image),
            PageNode::Form(children) if depth < MAX_FORM_DEPTH => {
                collect_images(children, classify, depth + 1, out)
            }
            PageNode::Form(_) => debug!("Form XObject nested deeper than {}; skipped", MAX_FORM_DEPTH),
            PageNode::Other => {}
        }
    }
}

fn classify_object(object: PdfPageObject<'_>) -> PageNode<PdfPageObject<'_>, Result<Vec<u8>, String>> {
    if let Some(image_object) = object.as_image_object() {
        let encoded = image_object
            .get_raw_image()
            .map_err(|e| format!("{:?}", e))
            .and_then(|img| encode_jpeg(&img).map_err(|e| e.to_string()));
        return PageNode::Image(encoded);
    }
    if let PdfPageObject::XObjectForm(form) = &object {
        let children = (0..form.len()).filter_map(|i| form.get(i).ok()).collect();
        return PageNode::Form(children);
    }
    PageNode::Other
}

fn open_error(name: &str, had_password: bool, e: PdfiumError) -> AdaptxtError {
    let detail = format!("{:?}", e);
    if detail.contains("Password") || detail.contains("password") {
        if had_password {
            AdaptxtError::WrongPassword {
                name: name.to_string(),
            }
        } else {
            AdaptxtError::PasswordRequired {
                name: name.to_string(),
            }
        }
    } else {
        AdaptxtError::CorruptPdf {
            name: name.to_string(),
            detail,
        }
    }
}
