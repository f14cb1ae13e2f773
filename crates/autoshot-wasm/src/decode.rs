//! Image decoding WASM bindings.
//!
//! # Functions
//!
//! - [`decode_image`] - Decode a JPEG, PNG or WebP upload to RGBA
//! - [`detect_mime`] - Sniff the MIME type from the leading bytes
//!
//! # Example
//!
//! ```typescript
//! import { decode_image, detect_mime } from '@autoshot/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! console.log(detect_mime(bytes)); // "image/jpeg"
//! const image = decode_image(bytes);
//! console.log(`Decoded ${image.width}x${image.height}`);
//! ```

use crate::types::{js_error, JsImage};
use autoshot_core::decode;
use wasm_bindgen::prelude::*;

/// Decode an uploaded image.
///
/// EXIF orientation is applied for JPEG, as the browser does when it draws
/// the file.
///
/// # Errors
///
/// Returns an error if the bytes are not a JPEG, PNG or WebP file, or if the
/// file is corrupted or has no pixels.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsImage, JsValue> {
    decode::decode_image(bytes)
        .map(|(_, buffer)| JsImage::from_buffer(buffer))
        .map_err(js_error)
}

/// MIME type of an accepted upload, from its magic bytes.
#[wasm_bindgen]
pub fn detect_mime(bytes: &[u8]) -> Result<String, JsValue> {
    decode::detect_format(bytes)
        .map(|format| format.mime_type().to_string())
        .map_err(js_error)
}

#[cfg(test)]
mod tests {
    use autoshot_core::decode::detect_format;
    use autoshot_core::encode::encode_png;
    use autoshot_core::raster::{Rgba, RgbaBuffer};

    #[test]
    fn test_core_decode_of_png() {
        let bytes = encode_png(&RgbaBuffer::filled(4, 3, Rgba::new(9, 8, 7, 255))).unwrap();
        assert_eq!(detect_format(&bytes).unwrap().mime_type(), "image/png");

        let (source, buffer) = autoshot_core::decode::decode_image(&bytes).unwrap();
        assert_eq!((source.natural_width, source.natural_height), (4, 3));
        assert_eq!(buffer.pixel(0, 0), Some(Rgba::new(9, 8, 7, 255)));
    }
}
