//! Source-language detection.
//!
//! `whatlang` reports ISO 639-3 codes; they are mapped to the short ISO 639-1
//! codes the translation backends expect via `isolang`. Mandarin becomes
//! `zh-CN` to match the target-language table.

use crate::error::StageError;
use crate::language::LanguageCode;
use crate::output::{Detection, Outcome};
use isolang::Language;
use tracing::debug;

/// Detect the language of `text`.
///
/// * `Empty` for empty or whitespace-only text
/// * `Failed` when the detector cannot decide
/// * `Success` otherwise
pub fn detect_language(text: &str) -> Outcome<Detection> {
    if text.trim().is_empty() {
        return Outcome::Empty;
    }

    let Some(info) = whatlang::detect(text) else {
        return Outcome::Failed(StageError::DetectionFailed {
            detail: "no language matched the text".to_string(),
        });
    };

    let iso3 = info.lang().code();
    let (code, name) = short_code(iso3);
    debug!(
        "Detected {} ({}) with confidence {:.2}, reliable={}",
        name,
        code,
        info.confidence(),
        info.is_reliable()
    );

    Outcome::Success(Detection {
        code: LanguageCode::new(code),
        name,
        confidence: info.confidence(),
    })
}

/// Map an ISO 639-3 code to `(short code, English name)`.
///
/// Falls back to the 639-3 code when the language has no 639-1 form.
fn short_code(iso3: &str) -> (String, String) {
    let language = Language::from_639_3(iso3);
    let name = language
        .map(|l| l.to_name().to_string())
        .unwrap_or_else(|| iso3.to_string());

    if iso3 == "cmn" {
        return ("zh-CN".to_string(), name);
    }

    let code = language
        .and_then(|l| l.to_639_1())
        .unwrap_or(iso3)
        .to_string();
    (code, name)
}
