//! Pipeline stages for document text extraction and translation.
//!
//! Each submodule implements exactly one step, so a stage can be swapped
//! (say, a different OCR engine) without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ pdf / encode ──▶ ocr ──▶ normalize ──▶ extract ──▶ detect ──▶ translate ──▶ summarize
//! (path/URL)  (pdfium/JPEG)  (engine)  (cleanup)   (assemble)  (whatlang)  (backend)     (optional)
//! ```
//!
//! 1. [`input`]: validate the extension and magic bytes, load the bytes
//! 2. [`pdf`]: read text layers and embedded images; runs in
//!    `spawn_blocking` because pdfium is blocking C code
//! 3. [`encode`]: normalise every raster image to JPEG
//! 4. [`ocr`]: Tesseract or vision-LLM text recognition
//! 5. [`normalize`]: deterministic whitespace / invisible-char cleanup
//! 6. [`extract`]: per-unit loop; one failed unit never aborts the stage
//! 7. [`detect`]: source language detection
//! 8. [`translate`]: Google or LLM translation
//! 9. [`summarize`]: extractive or LLM summary, then translation of it
//!
//! [`speech`] is a side flow (record → transcribe → translate) that shares
//! only the selected target language with the document pipeline.

pub mod detect;
pub mod encode;
pub mod extract;
pub mod input;
pub mod llm;
pub mod normalize;
pub mod ocr;
pub mod pdf;
pub mod speech;
pub mod summarize;
pub mod translate;
