//! Image normalisation: every raster image reaching OCR is a JPEG.
//!
//! OCR engines are fed one encoding only, so uploaded PNGs and
//! whatever codec a PDF embedded (Flate, JPX, CCITT …) are all re-encoded
//! in memory. JPEG has no alpha channel, so images are flattened to RGB8
//! first. Nothing is written to disk.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use tracing::debug;

/// JPEG quality used for re-encoding. High enough that small glyphs survive.
pub const JPEG_QUALITY: u8 = 92;

/// Encode a decoded image as JPEG.
pub fn encode_jpeg(img: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut buf = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
    rgb.write_with_encoder(encoder)?;
    debug!(
        "Encoded {}x{} image → {} bytes JPEG",
        rgb.width(),
        rgb.height(),
        buf.len()
    );
    Ok(buf)
}

/// Return JPEG bytes for an encoded image, passing JPEG input through untouched.
pub fn normalize_to_jpeg(bytes: &[u8]) -> Result<Vec<u8>, image::ImageError> {
    let format = image::guess_format(bytes)?;
    if format == ImageFormat::Jpeg {
        return Ok(bytes.to_vec());
    }
    let img = image::load(Cursor::new(bytes), format)?;
    encode_jpeg(&img)
}

/// Base64 wrapper for vision payloads.
pub fn to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}
