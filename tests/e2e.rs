//! End-to-end tests against the real engines.
//!
//! They need pdfium (and, for the OCR and translation tests, the
//! `tesseract` binary and network access). They are gated behind the
//! `E2E_ENABLED` environment variable so they do not run in CI unless
//! explicitly requested.
//!
//! Run with:
//!   E2E_ENABLED=1 PDFIUM_LIB_PATH=./libpdfium.so cargo test --test e2e -- --nocapture

use adaptxt::output::TRANSLATION_ERROR;
use adaptxt::pipeline::ocr::TesseractOcr;
use adaptxt::pipeline::pdf::bind_pdfium;
use adaptxt::{process_bytes, Document, PipelineConfig, Session, TargetLanguage};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Skip unless E2E_ENABLED is set *and* pdfium can be bound.
macro_rules! e2e_skip_unless_ready {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP: set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        if let Err(e) = bind_pdfium() {
            println!("SKIP: pdfium not available: {e}");
            return;
        }
    }};
}

/// A one-page PDF whose text layer holds `text` (Helvetica, no images).
fn text_pdf(text: &str) -> Vec<u8> {
    let content = format!("BT /F1 18 Tf 72 720 Td ({text}) Tj ET");
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>"
            .to_string(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        format!("<< /Length {} >>\nstream\n{content}\nendstream", content.len()),
    ];

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
    }
    let xref = pdf.len();
    pdf.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
    for offset in offsets {
        pdf.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    pdf.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref}\n%%EOF\n",
            objects.len() + 1
        )
        .as_bytes(),
    );
    pdf
}

// ── Offline (pdfium only) ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_text_layer_is_read() {
    e2e_skip_unless_ready!();

    let doc = Document::from_bytes("hello.pdf", text_pdf("Hello from the text layer"))
        .expect("valid pdf upload");
    let config = PipelineConfig::builder()
        .translate_endpoint("http://127.0.0.1:9/translate")
        .build()
        .expect("valid config");
    let session = Session::open(&config).await.expect("session");

    let analysis = session.analyze(&doc).await.expect("analysis");
    assert_eq!(
        analysis.text.value().map(String::as_str),
        Some("Hello from the text layer")
    );
    assert_eq!(analysis.extraction.units.len(), 1);
    assert_eq!(analysis.extraction.failed_units(), 0);
}

#[tokio::test]
async fn test_truncated_pdf_is_failed_not_fatal() {
    e2e_skip_unless_ready!();

    let mut bytes = text_pdf("cut short");
    bytes.truncate(12);
    let doc = Document::from_bytes("broken.pdf", bytes).expect("magic bytes intact");
    let session = Session::open(&PipelineConfig::default()).await.expect("session");

    let analysis = session.analyze(&doc).await.expect("not a setup error");
    assert!(analysis.text.is_failed(), "got {:?}", analysis.text);
    assert_eq!(analysis.language.language_or_unknown(), "unknown");
}

#[tokio::test]
async fn test_blank_page_is_empty() {
    e2e_skip_unless_ready!();

    let doc = Document::from_bytes("blank.pdf", text_pdf("")).expect("valid pdf upload");
    let session = Session::open(&PipelineConfig::default()).await.expect("session");

    let analysis = session.analyze(&doc).await.expect("analysis");
    assert!(analysis.text.is_empty(), "got {:?}", analysis.text);
}

// ── Live services ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_translate_to_french() {
    e2e_skip_unless_ready!();

    let target = TargetLanguage::from_code("fr").expect("fr");
    let output = process_bytes(
        "greeting.pdf",
        text_pdf("Good morning, how are you today?"),
        &target,
        &PipelineConfig::default(),
    )
    .await
    .expect("run");

    assert_eq!(output.analysis.language.language_or_unknown(), "en");
    let translated = output.translation.text_or(TRANSLATION_ERROR);
    assert_ne!(translated, TRANSLATION_ERROR);
    println!("Translated: {translated}");
}

#[tokio::test]
async fn test_summary_included_when_configured() {
    e2e_skip_unless_ready!();

    let config = PipelineConfig::builder()
        .include_summary(true)
        .summary_sentences(1)
        .build()
        .expect("valid config");
    let output = process_bytes(
        "summary.pdf",
        text_pdf("Rust is fast. Rust is safe. Rust is fun."),
        &TargetLanguage::default(),
        &config,
    )
    .await
    .expect("run");

    let summary = output.summary.expect("summary requested");
    assert!(summary.summary.is_some());
}

#[tokio::test]
async fn test_tesseract_is_installed() {
    if std::env::var("E2E_ENABLED").is_err() {
        println!("SKIP");
        return;
    }
    assert!(
        TesseractOcr::new().is_available(),
        "tesseract binary must be on PATH for e2e OCR runs"
    );
}
