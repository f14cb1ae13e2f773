//! Lossless encoders that keep the alpha channel (PNG, WebP).

use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;

use super::{validate, EncodeError};
use crate::raster::RgbaBuffer;

/// Encode an RGBA buffer to PNG bytes, preserving transparency.
pub fn encode_png(buffer: &RgbaBuffer) -> Result<Vec<u8>, EncodeError> {
    validate(buffer)?;

    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(
            &buffer.pixels,
            buffer.width,
            buffer.height,
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;
    Ok(out)
}

/// Encode an RGBA buffer to lossless WebP bytes.
pub fn encode_webp(buffer: &RgbaBuffer) -> Result<Vec<u8>, EncodeError> {
    validate(buffer)?;

    let mut out = Vec::new();
    WebPEncoder::new_lossless(&mut out)
        .write_image(
            &buffer.pixels,
            buffer.width,
            buffer.height,
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;
    Ok(out)
}
