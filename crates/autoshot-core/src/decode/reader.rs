//! Raster decoding with EXIF orientation handling.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageReader};

use super::{DecodeError, ImageFormat, Orientation, SourceImage};
use crate::raster::RgbaBuffer;

/// Decode JPEG, PNG or WebP bytes into an RGBA buffer.
///
/// The format is sniffed from the magic bytes, not from a file name or a
/// declared MIME type. EXIF orientation is applied so the buffer matches
/// what a browser would display.
///
/// # Errors
///
/// - `DecodeError::InvalidFormat` if the bytes are not a recognizable image
/// - `DecodeError::UnsupportedFormat` for recognized but rejected formats (GIF, TIFF, ...)
/// - `DecodeError::CorruptedFile` if decoding fails part way
/// - `DecodeError::EmptyImage` if the image has zero width or height
pub fn decode_image(bytes: &[u8]) -> Result<(SourceImage, RgbaBuffer), DecodeError> {
    let detected = image::guess_format(bytes).map_err(|_| DecodeError::InvalidFormat)?;
    let format = ImageFormat::from_image_format(detected)?;

    let img = decode_dynamic(bytes, format)?;
    let orientation = extract_orientation(bytes);
    let img = apply_orientation(img, orientation);

    let buffer = RgbaBuffer::from_rgba_image(img.into_rgba8());
    if buffer.is_empty() {
        return Err(DecodeError::EmptyImage);
    }

    log::debug!(
        "Decoded {} {}x{} ({} bytes, orientation {:?})",
        format.mime_type(),
        buffer.width,
        buffer.height,
        bytes.len(),
        orientation
    );

    let source = SourceImage {
        natural_width: buffer.width,
        natural_height: buffer.height,
        format,
        byte_size: bytes.len(),
        orientation,
    };
    Ok((source, buffer))
}

/// Detect the format of encoded bytes without decoding pixels.
pub fn detect_format(bytes: &[u8]) -> Result<ImageFormat, DecodeError> {
    let detected = image::guess_format(bytes).map_err(|_| DecodeError::InvalidFormat)?;
    ImageFormat::from_image_format(detected)
}

fn decode_dynamic(bytes: &[u8], format: ImageFormat) -> Result<DynamicImage, DecodeError> {
    let mut reader = ImageReader::new(Cursor::new(bytes));
    reader.set_format(format.to_image_format());
    reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))
}

/// Extract EXIF orientation.
///
/// Returns `Orientation::Normal` if no EXIF data is found or orientation
/// cannot be determined.
fn extract_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);

    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
    }
}

/// Apply EXIF orientation transformation to an image.
fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}
