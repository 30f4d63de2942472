//! Prompts for the LLM-backed engines.
//!
//! Every prompt lives here so the engines in [`crate::pipeline`] stay focused
//! on request plumbing, and so tests can inspect prompts without a provider.

/// System prompt for transcribing an image with a vision model.
pub const OCR_SYSTEM_PROMPT: &str = r#"You are an OCR engine. Transcribe every piece of text visible in the image.

Rules:
- Output ONLY the transcribed text, in natural reading order
- Keep the original language and spelling; do NOT translate or correct
- Do NOT describe the image, add commentary, or wrap the output in code fences
- If the image contains no readable text, output nothing at all"#;

/// System prompt for summarizing extracted text.
pub const SUMMARY_SYSTEM_PROMPT: &str = r#"You summarize documents. Write a concise summary of the text the user provides, in the same language as the text, in at most five sentences. Output only the summary."#;

/// System prompt for translating into `target_name`.
pub fn translation_system_prompt(target_name: &str, target_code: &str) -> String {
    format!(
        "You are a professional translator. Detect the language of the text the user \
provides and translate it into {target_name} (language code: {target_code}).\n\n\
Rules:\n\
- Output ONLY the translation\n\
- Preserve line breaks, numbers and proper nouns\n\
- If the text is already in {target_name}, return it unchanged"
    )
}
