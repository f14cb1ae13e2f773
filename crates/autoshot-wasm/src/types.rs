//! WASM-compatible wrapper types for image data.
//!
//! This module provides JavaScript-friendly types that wrap the core Autoshot
//! raster, handling the conversion between Rust and JavaScript data
//! representations.

use autoshot_core::raster::RgbaBuffer;
use autoshot_core::EngineConfig;
use wasm_bindgen::prelude::*;

/// A decoded RGBA image for JavaScript.
///
/// Pixels are straight-alpha RGBA, 4 bytes per pixel, row-major, the same
/// layout as `ImageData.data`.
///
/// # Memory Management
///
/// The pixel data is stored in WASM memory. When you call `pixels()`, a copy
/// is made to JavaScript memory as a `Uint8Array`.
#[wasm_bindgen]
pub struct JsImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsImage {
    /// Create a new JsImage from dimensions and RGBA pixel data.
    ///
    /// Fails if `pixels.length` is not `width * height * 4`.
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<JsImage, JsValue> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(JsValue::from_str(&format!(
                "Invalid pixel data: expected {} bytes, got {}",
                expected,
                pixels.len()
            )));
        }
        Ok(JsImage {
            width,
            height,
            pixels,
        })
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of bytes in the pixel buffer (width * height * 4)
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// Whether any pixel is not fully opaque.
    #[wasm_bindgen(getter)]
    pub fn has_transparency(&self) -> bool {
        self.pixels.chunks_exact(4).any(|px| px[3] < 255)
    }

    /// Returns RGBA pixel data as Uint8Array (a copy).
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }
}

impl JsImage {
    pub(crate) fn from_buffer(buffer: RgbaBuffer) -> Self {
        Self {
            width: buffer.width,
            height: buffer.height,
            pixels: buffer.pixels,
        }
    }

    /// Copy into a core buffer. Clones the pixel data.
    pub(crate) fn to_buffer(&self) -> RgbaBuffer {
        RgbaBuffer {
            width: self.width,
            height: self.height,
            pixels: self.pixels.clone(),
        }
    }
}

/// Map any displayable error onto a JS string value.
pub(crate) fn js_error<E: std::fmt::Display>(err: E) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Read an optional partial `EngineConfig` object; missing fields and a
/// missing object take the defaults.
pub(crate) fn config_from_js(value: JsValue) -> Result<EngineConfig, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(EngineConfig::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(js_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use autoshot_core::raster::Rgba;

    #[test]
    fn test_js_image_from_buffer() {
        let img = JsImage::from_buffer(RgbaBuffer::new(100, 50));
        assert_eq!(img.width(), 100);
        assert_eq!(img.height(), 50);
        assert_eq!(img.byte_length(), 20000);
        assert!(img.has_transparency());
    }

    #[test]
    fn test_round_trip_buffer() {
        let buffer = RgbaBuffer::filled(3, 2, Rgba::new(1, 2, 3, 255));
        let img = JsImage::from_buffer(buffer.clone());
        assert!(!img.has_transparency());
        assert_eq!(img.to_buffer(), buffer);
        assert_eq!(img.pixels(), buffer.pixels);
    }
}
