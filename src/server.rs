//! HTTP front end: single-page UI plus a small JSON API.
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `GET /` | upload widget, language dropdown, Summarize and Speech to Text buttons |
//! | `GET /api/languages` | the shared target-language table |
//! | `POST /api/process` | multipart `file` + `target` → detection and translation |
//! | `POST /api/summarize` | JSON `{text, target}` → translated summary |
//! | `POST /api/speech` | multipart `audio` + `target` → transcript and translation |
//!
//! Every request opens its own [`Session`]. Errors are returned as JSON
//! `{"error": …}` bodies for the page to show as inline banners.

use crate::config::PipelineConfig;
use crate::error::AdaptxtError;
use crate::language::{TargetLanguage, TARGET_LANGUAGES};
use crate::output::{Analysis, Outcome, UnitReport, TRANSLATION_ERROR};
use crate::pipeline::input::{Document, DocumentFormat};
use crate::pipeline::speech::AudioClip;
use crate::session::Session;
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

const INDEX_HTML: &str = include_str!("../templates/index.html");

const NO_TEXT_MESSAGE: &str = "No text could be extracted.";
const NO_AUDIO_MESSAGE: &str = "No audio input detected.";

/// Default upload limit in megabytes.
pub const DEFAULT_MAX_UPLOAD_MB: usize = 25;

// ============================================================================
// AppState
// ============================================================================

pub struct AppState {
    pub config: PipelineConfig,
}

// ============================================================================
// Error type
// ============================================================================

pub struct AppError(StatusCode, String);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.0, Json(serde_json::json!({"error": self.1}))).into_response()
    }
}

impl From<AdaptxtError> for AppError {
    fn from(e: AdaptxtError) -> Self {
        let status = match e {
            AdaptxtError::UnsupportedFormat { .. } | AdaptxtError::FormatMismatch { .. } => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
            AdaptxtError::InvalidConfig(_) => StatusCode::BAD_REQUEST,
            AdaptxtError::ProviderNotConfigured { .. } | AdaptxtError::PdfiumBindingFailed(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        AppError(status, e.to_string())
    }
}

fn bad_request(msg: impl Into<String>) -> AppError {
    AppError(StatusCode::BAD_REQUEST, msg.into())
}

// ============================================================================
// Request / Response types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    /// Extraction outcome: `success`, `empty` or `failed`.
    pub status: &'static str,
    pub detected_language: String,
    pub original_text: Option<String>,
    pub translated_text: Option<String>,
    pub translation_status: &'static str,
    pub target: TargetLanguage,
    /// Banner texts for the page.
    pub messages: Vec<String>,
    pub units: Vec<UnitReport>,
}

impl ProcessResponse {
    pub fn new(analysis: &Analysis, translation: &Outcome<String>, target: TargetLanguage) -> Self {
        let mut messages = Vec::new();
        match analysis.text {
            Outcome::Success(_) => {}
            Outcome::Empty => messages.push(NO_TEXT_MESSAGE.to_string()),
            Outcome::Failed(ref e) => messages.push(format!("Error extracting text: {e}")),
        }
        for report in &analysis.extraction.units {
            if let Some(ref e) = report.error {
                messages.push(e.to_string());
            }
        }
        if translation.is_failed() {
            messages.push(TRANSLATION_ERROR.to_string());
        }

        Self {
            status: analysis.text.status(),
            detected_language: analysis.language.language_or_unknown().to_string(),
            original_text: analysis.text.value().cloned(),
            translated_text: match translation {
                Outcome::Success(t) => Some(t.clone()),
                Outcome::Failed(_) => Some(TRANSLATION_ERROR.to_string()),
                Outcome::Empty => None,
            },
            translation_status: translation.status(),
            target,
            messages,
            units: analysis.extraction.units.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    pub text: String,
    #[serde(default)]
    pub target: TargetLanguage,
}

#[derive(Debug, Serialize)]
pub struct SummarizeResponse {
    pub summary: Option<String>,
    pub translated: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SpeechResponse {
    pub status: &'static str,
    pub transcript: Option<String>,
    pub translation: Option<String>,
    pub message: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn languages_handler() -> Json<&'static [TargetLanguage]> {
    Json(TARGET_LANGUAGES)
}

fn parse_target(raw: &str) -> Result<TargetLanguage, AppError> {
    if raw.trim().is_empty() {
        return Ok(TargetLanguage::default());
    }
    TargetLanguage::parse(raw).ok_or_else(|| bad_request(format!("Unknown target language '{raw}'")))
}

async fn process_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ProcessResponse>, AppError> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    let mut target = TargetLanguage::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("Failed to read form field: {e}")))?
    {
        match field.name().unwrap_or("") {
            "file" => {
                let name = field.file_name().unwrap_or("").to_string();
                // Rejected before the body is read.
                DocumentFormat::from_file_name(&name)?;
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| bad_request(format!("Failed to read file data: {e}")))?
                    .to_vec();
                upload = Some((name, data));
            }
            "target" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| bad_request(format!("Failed to read target: {e}")))?;
                target = parse_target(&raw)?;
            }
            _ => {}
        }
    }

    let (name, data) = upload.ok_or_else(|| bad_request("No file uploaded"))?;
    let document = Document::from_bytes(name, data)?;
    info!("Processing upload {} ({} bytes) → {}", document.name, document.bytes.len(), target);

    let session = Session::open(&state.config).await?;
    let analysis = session.analyze(&document).await?;
    let translation = session.translate(&analysis, &target).await;

    Ok(Json(ProcessResponse::new(&analysis, &translation, target)))
}

async fn summarize_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SummarizeRequest>,
) -> Result<Json<SummarizeResponse>, AppError> {
    if req.text.trim().is_empty() {
        return Err(bad_request("No text to summarize"));
    }
    let session = Session::open(&state.config).await?;
    let result = session.summarize(&req.text, &req.target).await;
    Ok(Json(SummarizeResponse {
        summary: result.summary,
        translated: result.translated,
    }))
}

async fn speech_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<SpeechResponse>, AppError> {
    let mut clip: Option<AudioClip> = None;
    let mut target = TargetLanguage::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("Failed to read form field: {e}")))?
    {
        match field.name().unwrap_or("") {
            "audio" => {
                let file_name = field.file_name().unwrap_or("clip.webm").to_string();
                let mime = field.content_type().unwrap_or("audio/webm").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| bad_request(format!("Failed to read audio data: {e}")))?
                    .to_vec();
                clip = Some(AudioClip::new(data, file_name, mime));
            }
            "target" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| bad_request(format!("Failed to read target: {e}")))?;
                target = parse_target(&raw)?;
            }
            _ => {}
        }
    }

    let Some(clip) = clip.filter(|c| !c.is_empty()) else {
        return Ok(Json(SpeechResponse {
            status: "empty",
            transcript: None,
            translation: None,
            message: Some(NO_AUDIO_MESSAGE.to_string()),
        }));
    };

    let session = Session::open(&state.config).await?;
    let result = session.transcribe(&clip, &target).await;

    let message = match result.transcript {
        Outcome::Success(_) => None,
        Outcome::Empty => Some(NO_AUDIO_MESSAGE.to_string()),
        Outcome::Failed(ref e) => {
            warn!("Speech flow failed: {}", e);
            Some(e.to_string())
        }
    };
    Ok(Json(SpeechResponse {
        status: result.transcript.status(),
        transcript: result.transcript.value().cloned(),
        translation: match result.translation {
            Outcome::Success(t) => Some(t),
            Outcome::Failed(_) => Some(TRANSLATION_ERROR.to_string()),
            Outcome::Empty => None,
        },
        message,
    }))
}

// ============================================================================
// Router
// ============================================================================

/// Build the application router.
pub fn router(config: PipelineConfig, max_upload_bytes: usize) -> Router {
    let state = Arc::new(AppState { config });

    Router::new()
        .route("/", get(index_handler))
        .route("/api/languages", get(languages_handler))
        .route("/api/process", post(process_handler))
        .route("/api/summarize", post(summarize_handler))
        .route("/api/speech", post(speech_handler))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StageError;
    use crate::output::{Detection, Extraction, ExtractionUnit};
    use crate::language::LanguageCode;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    const BOUNDARY: &str = "adaptxt-test-boundary";

    fn test_router() -> Router {
        let config = PipelineConfig::builder()
            .translate_endpoint("http://127.0.0.1:9/translate")
            .request_timeout_secs(2)
            .build()
            .expect("config");
        router(config, 1024 * 1024)
    }

    fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, file_name, data) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match file_name {
                Some(f) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn multipart_request(uri: &str, body: Vec<u8>) -> Request<Body> {
        Request::post(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("request")
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        serde_json::from_slice(&bytes).expect("json")
    }

    #[tokio::test]
    async fn index_serves_upload_page() {
        let response = test_router()
            .oneshot(Request::get("/").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let html = String::from_utf8_lossy(&bytes);
        assert!(html.contains("accept=\".pdf,.jpg,.jpeg,.png\""));
        assert!(html.contains("Speech to Text"));
    }

    #[tokio::test]
    async fn languages_lists_shared_table() {
        let response = test_router()
            .oneshot(Request::get("/api/languages").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        let json = json_body(response).await;
        let codes: Vec<&str> = json
            .as_array()
            .expect("array")
            .iter()
            .filter_map(|l| l["code"].as_str())
            .collect();
        assert_eq!(codes, vec!["hi", "fr", "es", "zh-CN", "en", "ta"]);
    }

    #[tokio::test]
    async fn disallowed_upload_is_415() {
        let body = multipart_body(&[
            ("target", None, b"fr"),
            ("file", Some("notes.docx"), b"PK\x03\x04"),
        ]);
        let response = test_router()
            .oneshot(multipart_request("/api/process", body))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        let json = json_body(response).await;
        assert!(json["error"]
            .as_str()
            .expect("error")
            .contains("Supported formats: PDF, JPG, JPEG, PNG"));
    }

    #[tokio::test]
    async fn upload_with_wrong_magic_is_415() {
        let body = multipart_body(&[("file", Some("scan.png"), b"%PDF-1.4")]);
        let response = test_router()
            .oneshot(multipart_request("/api/process", body))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn unknown_target_is_400() {
        let body = multipart_body(&[("target", None, b"klingon")]);
        let response = test_router()
            .oneshot(multipart_request("/api/process", body))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_audio_reports_no_input() {
        let body = multipart_body(&[("target", None, b"hi")]);
        let response = test_router()
            .oneshot(multipart_request("/api/speech", body))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["message"], "No audio input detected.");
        assert_eq!(json["status"], "empty");
    }

    #[tokio::test]
    async fn summary_survives_unreachable_translator() {
        let text = "Rust is fast. Rust is safe. Cats sleep a lot. Rust has great tooling.";
        let request = Request::post("/api/summarize")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({"text": text, "target": "fr"}).to_string(),
            ))
            .expect("request");
        let response = test_router().oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert!(json["summary"].is_string());
        assert!(json["translated"].is_null());
    }

    #[test]
    fn empty_extraction_shows_no_text_banner() {
        let analysis = Analysis {
            extraction: Extraction::default(),
            text: Outcome::Empty,
            language: Outcome::Empty,
        };
        let response = ProcessResponse::new(&analysis, &Outcome::Empty, TargetLanguage::default());
        assert_eq!(response.status, "empty");
        assert_eq!(response.detected_language, "unknown");
        assert_eq!(response.messages, vec![NO_TEXT_MESSAGE.to_string()]);
        assert!(response.translated_text.is_none());
    }

    #[test]
    fn failed_translation_shows_sentinel() {
        let analysis = Analysis {
            extraction: Extraction {
                image_text: "Hello world".into(),
                units: vec![UnitReport {
                    unit: ExtractionUnit::Image,
                    chars: 11,
                    duration_ms: 3,
                    error: None,
                }],
                ..Extraction::default()
            },
            text: Outcome::Success("Hello world".into()),
            language: Outcome::Success(Detection {
                code: LanguageCode::new("en"),
                name: "English".into(),
                confidence: 0.9,
            }),
        };
        let translation = Outcome::Failed(StageError::TranslationFailed {
            backend: "google".into(),
            detail: "HTTP 503".into(),
        });
        let response = ProcessResponse::new(&analysis, &translation, TargetLanguage::default());
        assert_eq!(response.translated_text.as_deref(), Some("Translation error"));
        assert_eq!(response.translation_status, "failed");
        assert_eq!(response.messages, vec!["Translation error".to_string()]);
    }
}
