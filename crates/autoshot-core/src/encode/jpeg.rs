//! JPEG encoding for export.
//!
//! JPEG has no alpha channel, so the buffer is flattened onto black first.
//! That matches what `canvas.toBlob(cb, "image/jpeg")` does with transparent
//! pixels.

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use std::io::Cursor;

use super::{validate, EncodeError};
use crate::raster::RgbaBuffer;

/// Quality used for the final export (0.95 on the canvas scale).
pub const EXPORT_JPEG_QUALITY: u8 = 95;

/// Encode an RGBA buffer to JPEG bytes.
///
/// # Arguments
///
/// * `buffer` - Source pixels; alpha is flattened onto black
/// * `quality` - JPEG quality (1-100, clamped)
///
/// # Errors
///
/// - `EncodeError::InvalidDimensions` for a zero-sized buffer
/// - `EncodeError::InvalidPixelData` if the pixel length is inconsistent
/// - `EncodeError::EncodingFailed` if the encoder itself fails
pub fn encode_jpeg(buffer: &RgbaBuffer, quality: u8) -> Result<Vec<u8>, EncodeError> {
    validate(buffer)?;

    let quality = quality.clamp(1, 100);
    let rgb = buffer.flatten_rgb([0, 0, 0]);

    let mut out = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut out, quality)
        .write_image(&rgb, buffer.width, buffer.height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(out.into_inner())
}
