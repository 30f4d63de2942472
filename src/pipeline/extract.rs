//! Extraction stage: turn a [`Document`] into an [`Extraction`].
//!
//! A PDF contributes its text layer page by page, then the OCR output of each
//! embedded image in reading order. An image document is normalised to JPEG
//! and OCR'd whole.
//!
//! Every page text and every image is a separate unit. A unit that fails is
//! logged at `warn`, reported to the progress callback and recorded on its
//! [`UnitReport`]; it contributes no text and the loop moves on.

use crate::error::{AdaptxtError, StageError};
use crate::output::{Extraction, ExtractionUnit, UnitReport};
use crate::pipeline::encode::normalize_to_jpeg;
use crate::pipeline::input::{Document, DocumentFormat};
use crate::pipeline::normalize::clean_text;
use crate::pipeline::ocr::{OcrEngine, OcrOptions};
use crate::pipeline::pdf::{read_pdf, PdfPageContent};
use crate::progress::PipelineProgressCallback;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Extract all text from `document`.
///
/// Returns `Err` only for setup failures (pdfium cannot be bound, the
/// blocking task panicked). A PDF that cannot be opened yields an
/// [`Extraction`] with `document_error` set.
pub async fn extract(
    document: &Document,
    engine: &dyn OcrEngine,
    options: &OcrOptions,
    password: Option<&str>,
    progress: &dyn PipelineProgressCallback,
) -> Result<Extraction, AdaptxtError> {
    info!("Extracting text from {} ({})", document.name, document.format);

    let extraction = match document.format {
        DocumentFormat::Pdf => {
            match read_pdf(
                &document.name,
                document.bytes.clone(),
                password.map(str::to_string),
            )
            .await
            {
                Ok(pages) => extract_pdf_pages(pages, engine, options, progress).await,
                Err(e @ (AdaptxtError::PdfiumBindingFailed(_) | AdaptxtError::Internal(_))) => {
                    return Err(e)
                }
                Err(e) => {
                    warn!("Error reading PDF: {}", e);
                    Extraction {
                        document_error: Some(StageError::DocumentUnreadable {
                            detail: e.to_string(),
                        }),
                        ..Extraction::default()
                    }
                }
            }
        }
        DocumentFormat::Jpeg | DocumentFormat::Png => {
            extract_image(&document.bytes, engine, options, progress).await
        }
    };

    info!(
        "Extraction finished: {} unit(s), {} failed, {} chars",
        extraction.units.len(),
        extraction.failed_units(),
        extraction.combined().chars().count()
    );
    Ok(extraction)
}

/// OCR a standalone image document.
pub async fn extract_image(
    bytes: &[u8],
    engine: &dyn OcrEngine,
    options: &OcrOptions,
    progress: &dyn PipelineProgressCallback,
) -> Extraction {
    let unit = ExtractionUnit::Image;
    let start = Instant::now();

    let (text, report) = match normalize_to_jpeg(bytes) {
        Ok(jpeg) => ocr_unit(unit, &jpeg, engine, options, progress).await,
        Err(e) => failed_unit(
            unit.clone(),
            StageError::ImageDecodeFailed {
                unit: unit.to_string(),
                detail: e.to_string(),
            },
            start,
            progress,
        ),
    };

    Extraction {
        text_layer: String::new(),
        image_text: text,
        units: vec![report],
        document_error: None,
    }
}

/// Assemble text layers and OCR output from already-read PDF pages.
///
/// All page texts come first, then every image in page order.
pub async fn extract_pdf_pages(
    pages: Vec<PdfPageContent>,
    engine: &dyn OcrEngine,
    options: &OcrOptions,
    progress: &dyn PipelineProgressCallback,
) -> Extraction {
    let mut units = Vec::new();
    let mut page_texts = Vec::with_capacity(pages.len());
    let mut images = Vec::new();

    for content in pages {
        let unit = ExtractionUnit::PageText { page: content.page };
        let start = Instant::now();
        match content.text {
            Ok(raw) => {
                let cleaned = clean_text(&raw);
                debug!("{}: {} chars", unit, cleaned.chars().count());
                progress.on_unit_complete(&unit, cleaned.chars().count());
                units.push(UnitReport {
                    unit,
                    chars: cleaned.chars().count(),
                    duration_ms: start.elapsed().as_millis() as u64,
                    error: None,
                });
                page_texts.push(cleaned);
            }
            Err(e) => {
                let (_, report) = failed_unit(unit, e, start, progress);
                units.push(report);
            }
        }

        for (i, image) in content.images.into_iter().enumerate() {
            let unit = ExtractionUnit::PageImage {
                page: content.page,
                index: i + 1,
            };
            images.push((unit, image));
        }
    }

    let mut image_texts = Vec::with_capacity(images.len());
    for (unit, image) in images {
        let (text, report) = match image {
            Ok(jpeg) => ocr_unit(unit, &jpeg, engine, options, progress).await,
            Err(e) => failed_unit(unit, e, Instant::now(), progress),
        };
        units.push(report);
        image_texts.push(text);
    }

    Extraction {
        text_layer: join_non_empty(&page_texts),
        image_text: join_non_empty(&image_texts),
        units,
        document_error: None,
    }
}

async fn ocr_unit(
    unit: ExtractionUnit,
    jpeg: &[u8],
    engine: &dyn OcrEngine,
    options: &OcrOptions,
    progress: &dyn PipelineProgressCallback,
) -> (String, UnitReport) {
    let start = Instant::now();
    match engine.recognize(jpeg, options).await {
        Ok(raw) => {
            let text = clean_text(&raw);
            let chars = text.chars().count();
            debug!("{}: {} chars via {}", unit, chars, engine.name());
            progress.on_unit_complete(&unit, chars);
            let report = UnitReport {
                unit,
                chars,
                duration_ms: start.elapsed().as_millis() as u64,
                error: None,
            };
            (text, report)
        }
        Err(e) => {
            let error = StageError::OcrFailed {
                unit: unit.to_string(),
                engine: engine.name().to_string(),
                detail: e.to_string(),
            };
            failed_unit(unit, error, start, progress)
        }
    }
}

fn failed_unit(
    unit: ExtractionUnit,
    error: StageError,
    start: Instant,
    progress: &dyn PipelineProgressCallback,
) -> (String, UnitReport) {
    warn!("{}: {}", unit, error);
    progress.on_unit_error(&unit, &error.to_string());
    let report = UnitReport {
        unit,
        chars: 0,
        duration_ms: start.elapsed().as_millis() as u64,
        error: Some(error),
    };
    (String::new(), report)
}

fn join_non_empty(parts: &[String]) -> String {
    parts
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
