//! Image encoding WASM bindings.
//!
//! # Functions
//!
//! - [`encode_png`] - Lossless, keeps transparency
//! - [`encode_jpeg`] - Flattens transparency onto black
//!
//! # Example
//!
//! ```typescript
//! import { encode_png, encode_jpeg } from '@autoshot/wasm';
//!
//! const png = encode_png(cutout);
//! const jpeg = encode_jpeg(image, 95);
//! ```

use crate::types::{js_error, JsImage};
use autoshot_core::encode;
use wasm_bindgen::prelude::*;

/// Encode an image as PNG bytes.
#[wasm_bindgen]
pub fn encode_png(image: &JsImage) -> Result<Vec<u8>, JsValue> {
    encode::encode_png(&image.to_buffer()).map_err(js_error)
}

/// Encode an image as JPEG bytes.
///
/// # Arguments
///
/// * `image` - Image to encode; alpha is flattened onto black
/// * `quality` - JPEG quality (1-100, clamped; export uses 95)
#[wasm_bindgen]
pub fn encode_jpeg(image: &JsImage, quality: u8) -> Result<Vec<u8>, JsValue> {
    encode::encode_jpeg(&image.to_buffer(), quality).map_err(js_error)
}

#[cfg(test)]
mod tests {
    use crate::types::JsImage;
    use autoshot_core::encode;
    use autoshot_core::raster::{Rgba, RgbaBuffer};

    #[test]
    fn test_encode_from_js_image_creates_valid_files() {
        let img = JsImage::from_buffer(RgbaBuffer::filled(10, 10, Rgba::new(128, 128, 128, 255)));

        let jpeg = encode::encode_jpeg(&img.to_buffer(), 90).unwrap();
        assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);

        let png = encode::encode_png(&img.to_buffer()).unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }
}
