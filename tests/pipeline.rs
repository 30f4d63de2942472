//! Offline integration tests: the full session flow with mock engines.
//!
//! No network, no pdfium, no tesseract. PDF reading is exercised through
//! [`extract_pdf_pages`] with pre-read page content; image documents go
//! through the real [`Session::analyze`] path.

use adaptxt::error::StageError;
use adaptxt::output::TRANSLATION_ERROR;
use adaptxt::pipeline::extract::extract_pdf_pages;
use adaptxt::pipeline::ocr::OcrError;
use adaptxt::pipeline::pdf::PdfPageContent;
use adaptxt::pipeline::summarize::ExtractiveSummarizer;
use adaptxt::pipeline::translate::{chunk_text, TranslateError};
use adaptxt::{
    AdaptxtError, AudioClip, Document, Engines, NoopProgressCallback, OcrEngine, OcrOptions,
    Outcome, PipelineConfig, Session, SpeechRecognizer, Summarizer, TargetLanguage, Translator,
};
use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ── Mock engines ─────────────────────────────────────────────────────────────

/// Returns a fixed string for every image.
struct FixedOcr(&'static str);

#[async_trait]
impl OcrEngine for FixedOcr {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn recognize(&self, _jpeg: &[u8], _options: &OcrOptions) -> Result<String, OcrError> {
        Ok(self.0.to_string())
    }
}

struct BrokenOcr;

#[async_trait]
impl OcrEngine for BrokenOcr {
    fn name(&self) -> &str {
        "broken"
    }

    async fn recognize(&self, _jpeg: &[u8], _options: &OcrOptions) -> Result<String, OcrError> {
        Err(OcrError::Engine("engine crashed".into()))
    }
}

/// Prefixes the text with the target code and counts calls.
#[derive(Default)]
struct TaggingTranslator {
    calls: AtomicUsize,
}

#[async_trait]
impl Translator for TaggingTranslator {
    fn name(&self) -> &str {
        "tagging"
    }

    async fn translate(&self, text: &str, target: &TargetLanguage) -> Result<String, TranslateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("[{}] {}", target.code, text))
    }
}

struct OfflineTranslator;

#[async_trait]
impl Translator for OfflineTranslator {
    fn name(&self) -> &str {
        "offline"
    }

    async fn translate(&self, _text: &str, _target: &TargetLanguage) -> Result<String, TranslateError> {
        Err(TranslateError::Http("connection refused".into()))
    }
}

struct FirstSentence;

#[async_trait]
impl Summarizer for FirstSentence {
    fn name(&self) -> &str {
        "first-sentence"
    }

    async fn summarize(&self, text: &str) -> Result<String, StageError> {
        Ok(text.split_inclusive('.').next().unwrap_or("").trim().to_string())
    }
}

/// Returns the payload of the clip as its transcript; empty payload means silence.
struct EchoRecognizer;

#[async_trait]
impl SpeechRecognizer for EchoRecognizer {
    async fn transcribe(&self, clip: &AudioClip) -> Result<Option<String>, StageError> {
        Ok(String::from_utf8(clip.bytes.clone())
            .ok()
            .filter(|s| !s.trim().is_empty()))
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn session(ocr: Arc<dyn OcrEngine>, translator: Arc<dyn Translator>) -> Session {
    Session::with_engines(
        &PipelineConfig::default(),
        Engines {
            ocr,
            translator,
            summarizer: Arc::new(FirstSentence),
            speech: Some(Arc::new(EchoRecognizer)),
        },
    )
}

fn png_bytes() -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, image::Rgb([255, 255, 255])));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).expect("encode png");
    buf.into_inner()
}

fn fr() -> TargetLanguage {
    TargetLanguage::from_code("fr").expect("fr in table")
}

// ── Input validation ─────────────────────────────────────────────────────────

#[test]
fn disallowed_extension_is_rejected_before_reading() {
    let err = Document::from_path("/definitely/not/here/report.docx").unwrap_err();
    assert!(matches!(err, AdaptxtError::UnsupportedFormat { .. }));
    assert!(err.to_string().contains("Supported formats: PDF, JPG, JPEG, PNG."));
}

#[test]
fn missing_supported_file_is_not_found() {
    let err = Document::from_path("/definitely/not/here/report.pdf").unwrap_err();
    assert!(matches!(err, AdaptxtError::FileNotFound { .. }));
}

#[test]
fn png_named_as_pdf_is_mismatch() {
    let err = Document::from_bytes("scan.pdf", png_bytes()).unwrap_err();
    assert!(matches!(err, AdaptxtError::FormatMismatch { .. }));
}

#[test]
fn uppercase_extension_is_accepted() {
    let doc = Document::from_bytes("SCAN.PNG", png_bytes()).expect("png accepted");
    assert!(doc.format.is_image());
}

// ── Menu ─────────────────────────────────────────────────────────────────────

#[test]
fn menu_choices_resolve_to_table_entries() {
    assert_eq!(TargetLanguage::from_menu_choice("1").code, "hi");
    assert_eq!(TargetLanguage::from_menu_choice("2").code, "fr");
    assert_eq!(TargetLanguage::from_menu_choice("4").code, "zh-CN");
    assert_eq!(TargetLanguage::from_menu_choice("6").code, "ta");
}

#[test]
fn unrecognised_menu_choice_is_english() {
    for choice in ["9", "0", "", "two", "-1"] {
        assert_eq!(TargetLanguage::from_menu_choice(choice).code, "en", "choice {choice:?}");
    }
}

// ── Image documents ──────────────────────────────────────────────────────────

#[tokio::test]
async fn png_upload_is_ocrd_detected_and_translated() {
    let translator = Arc::new(TaggingTranslator::default());
    let session = session(
        Arc::new(FixedOcr("The quick brown fox jumps over the lazy dog near the river bank.")),
        translator.clone(),
    );
    let doc = Document::from_bytes("scan.png", png_bytes()).expect("doc");

    let analysis = session.analyze(&doc).await.expect("analysis");
    assert!(analysis.text.is_success());
    assert_eq!(analysis.language.language_or_unknown(), "en");
    assert_eq!(analysis.extraction.units.len(), 1);

    let translation = session.translate(&analysis, &fr()).await;
    assert_eq!(
        translation.text_or(TRANSLATION_ERROR),
        "[fr] The quick brown fox jumps over the lazy dog near the river bank."
    );
    assert_eq!(translator.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn blank_image_skips_detection_and_translation() {
    let translator = Arc::new(TaggingTranslator::default());
    let session = session(Arc::new(FixedOcr("   \n ")), translator.clone());
    let doc = Document::from_bytes("blank.png", png_bytes()).expect("doc");

    let analysis = session.analyze(&doc).await.expect("analysis");
    assert!(analysis.text.is_empty());
    assert_eq!(analysis.language.language_or_unknown(), "unknown");

    let translation = session.translate(&analysis, &fr()).await;
    assert!(translation.is_empty());
    assert_eq!(translator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failing_ocr_on_only_unit_is_failed_not_empty() {
    let session = session(Arc::new(BrokenOcr), Arc::new(TaggingTranslator::default()));
    let doc = Document::from_bytes("scan.png", png_bytes()).expect("doc");

    let analysis = session.analyze(&doc).await.expect("analysis");
    assert!(analysis.text.is_failed());
    assert_eq!(analysis.extraction.failed_units(), 1);
    assert!(session.translate(&analysis, &fr()).await.is_empty());
}

#[tokio::test]
async fn translation_failure_renders_sentinel() {
    let session = session(
        Arc::new(FixedOcr("Bonjour tout le monde, comment allez-vous aujourd'hui ?")),
        Arc::new(OfflineTranslator),
    );
    let doc = Document::from_bytes("scan.png", png_bytes()).expect("doc");

    let output = session.run(&doc, &TargetLanguage::default(), false).await.expect("run");
    assert!(output.translation.is_failed());
    assert_eq!(output.translation.text_or(TRANSLATION_ERROR), "Translation error");
    assert!(output.summary.is_none());
}

#[tokio::test]
async fn run_with_summary_translates_summary() {
    let session = session(
        Arc::new(FixedOcr("Rust is a systems language. It is fast. It is safe.")),
        Arc::new(TaggingTranslator::default()),
    );
    let doc = Document::from_bytes("scan.png", png_bytes()).expect("doc");

    let output = session.run(&doc, &fr(), true).await.expect("run");
    let summary = output.summary.expect("summary requested");
    assert_eq!(summary.summary.as_deref(), Some("Rust is a systems language."));
    assert_eq!(summary.translated.as_deref(), Some("[fr] Rust is a systems language."));
    assert_eq!(output.stats.total_units, 1);
    assert_eq!(output.document.size_bytes, png_bytes().len());
}

#[tokio::test]
async fn summary_without_translation_keeps_summary() {
    let session = session(Arc::new(FixedOcr("")), Arc::new(OfflineTranslator));
    let result = session.summarize("One sentence here. Another one.", &fr()).await;
    assert_eq!(result.summary.as_deref(), Some("One sentence here."));
    assert!(result.translated.is_none());
}

// ── PDF assembly ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn text_layer_only_pdf_needs_no_ocr() {
    let pages = vec![
        PdfPageContent {
            page: 1,
            text: Ok("Hello\r\nworld".into()),
            images: vec![],
        },
        PdfPageContent {
            page: 2,
            text: Ok("second page".into()),
            images: vec![],
        },
    ];
    let extraction =
        extract_pdf_pages(pages, &BrokenOcr, &OcrOptions::default(), &NoopProgressCallback).await;

    assert_eq!(extraction.combined(), "Hello world second page");
    assert!(extraction.image_text.is_empty());
    assert_eq!(extraction.failed_units(), 0);
}

#[tokio::test]
async fn pdf_without_glyphs_is_empty() {
    let pages = vec![PdfPageContent {
        page: 1,
        text: Ok(String::new()),
        images: vec![],
    }];
    let extraction =
        extract_pdf_pages(pages, &BrokenOcr, &OcrOptions::default(), &NoopProgressCallback).await;
    assert!(extraction.outcome().is_empty());
}

#[tokio::test]
async fn scanned_pdf_with_failing_ocr_is_failed() {
    let pages = (1..=3)
        .map(|page| PdfPageContent {
            page,
            text: Ok(String::new()),
            images: vec![Ok(vec![0xFF, 0xD8, 0xFF])],
        })
        .collect();
    let extraction =
        extract_pdf_pages(pages, &BrokenOcr, &OcrOptions::default(), &NoopProgressCallback).await;

    assert_eq!(extraction.units.len(), 6);
    assert_eq!(extraction.failed_units(), 3);
    let outcome = extraction.outcome();
    assert!(outcome.is_failed(), "got {outcome:?}");
    assert!(matches!(outcome.error(), Some(StageError::OcrFailed { .. })));
}

#[tokio::test]
async fn image_ocr_text_follows_every_text_layer() {
    let jpeg = vec![0xFF, 0xD8, 0xFF];
    let pages = vec![
        PdfPageContent {
            page: 1,
            text: Ok("first".into()),
            images: vec![Ok(jpeg.clone())],
        },
        PdfPageContent {
            page: 2,
            text: Ok("second".into()),
            images: vec![],
        },
    ];
    let extraction = extract_pdf_pages(
        pages,
        &FixedOcr("caption"),
        &OcrOptions::default(),
        &NoopProgressCallback,
    )
    .await;
    assert_eq!(extraction.combined(), "first second caption");
    assert_eq!(extraction.units.len(), 3);
}

// ── Translation chunking ─────────────────────────────────────────────────────

#[test]
fn long_text_chunks_keep_order() {
    let sentence = "This sentence is exactly long enough. ";
    let text = sentence.repeat(300);
    let chunks = chunk_text(text.trim(), 4500);
    assert!(chunks.len() > 1);
    assert!(chunks.iter().all(|c| c.chars().count() <= 4500));
    assert_eq!(chunks.join(" "), text.trim());
}

// ── Summaries ────────────────────────────────────────────────────────────────

#[test]
fn extractive_summary_keeps_document_order() {
    let text = "Cats sleep. Rust compiles code fast. Dogs bark. Rust code is safe code.";
    let picked = ExtractiveSummarizer::new(2).select(text);
    assert_eq!(picked, vec!["Rust compiles code fast.", "Rust code is safe code."]);
}

// ── Speech ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn speech_clip_is_transcribed_and_translated() {
    let session = session(Arc::new(FixedOcr("")), Arc::new(TaggingTranslator::default()));
    let clip = AudioClip::new(b"good morning".to_vec(), "clip.webm", "audio/webm");

    let result = session.transcribe(&clip, &fr()).await;
    assert_eq!(result.transcript, Outcome::Success("good morning".to_string()));
    assert_eq!(result.translation, Outcome::Success("[fr] good morning".to_string()));
}

#[tokio::test]
async fn silent_clip_is_empty() {
    let session = session(Arc::new(FixedOcr("")), Arc::new(TaggingTranslator::default()));
    let clip = AudioClip::new(b"   ".to_vec(), "clip.webm", "audio/webm");

    let result = session.transcribe(&clip, &fr()).await;
    assert!(result.transcript.is_empty());
    assert!(result.translation.is_empty());
}

#[tokio::test]
async fn missing_recognizer_fails_speech_only() {
    let session = Session::with_engines(
        &PipelineConfig::default(),
        Engines {
            ocr: Arc::new(FixedOcr("")),
            translator: Arc::new(TaggingTranslator::default()),
            summarizer: Arc::new(FirstSentence),
            speech: None,
        },
    );
    let clip = AudioClip::new(b"hello".to_vec(), "clip.webm", "audio/webm");
    let result = session.transcribe(&clip, &fr()).await;
    assert!(result.transcript.is_failed());
    assert!(result.translation.is_empty());
}
