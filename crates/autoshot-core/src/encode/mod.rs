//! Image encoding pipeline for Autoshot.
//!
//! This module provides functionality for:
//! - Encoding JPEG with configurable quality (final export, crop of a JPEG)
//! - Encoding PNG and WebP with alpha (segmentation, background compositing)
//!
//! # Examples
//!
//! ```ignore
//! use autoshot_core::encode::{encode_as, EXPORT_JPEG_QUALITY};
//! use autoshot_core::decode::ImageFormat;
//!
//! let bytes = encode_as(&buffer, ImageFormat::Jpeg, EXPORT_JPEG_QUALITY).unwrap();
//! ```

mod jpeg;
mod png;

pub use jpeg::{encode_jpeg, EXPORT_JPEG_QUALITY};
pub use png::{encode_png, encode_webp};

use crate::decode::ImageFormat;
use crate::raster::RgbaBuffer;
use thiserror::Error;

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The underlying encoder failed
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
}

/// Encode into `format`. `quality` only affects JPEG.
pub fn encode_as(
    buffer: &RgbaBuffer,
    format: ImageFormat,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    match format {
        ImageFormat::Jpeg => encode_jpeg(buffer, quality),
        ImageFormat::Png => encode_png(buffer),
        ImageFormat::Webp => encode_webp(buffer),
    }
}

fn validate(buffer: &RgbaBuffer) -> Result<(), EncodeError> {
    if buffer.width == 0 || buffer.height == 0 {
        return Err(EncodeError::InvalidDimensions {
            width: buffer.width,
            height: buffer.height,
        });
    }
    let expected = buffer.width as usize * buffer.height as usize * 4;
    if buffer.pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: buffer.pixels.len(),
        });
    }
    Ok(())
}
