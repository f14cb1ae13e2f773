//! Final export: bake, re-redact, encode, and pick a delivery path.
//!
//! Export always produces a JPEG at the configured quality. Committed blur
//! regions are stored in working-image pixels; they are mapped through the
//! bake's rotate/flip and redacted again on the baked pixels, so no color
//! filter can bring a plate back into view.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::adjustments::{bake_descriptor, compute_filter_descriptor, map_rect, AdjustmentState};
use crate::config::EngineConfig;
use crate::decode::ImageFormat;
use crate::encode::{encode_jpeg, EncodeError};
use crate::raster::{PixelRect, RgbaBuffer};
use crate::redact::apply_blur_natural;

/// File name used when the upload had none.
pub const FALLBACK_FILE_NAME: &str = "car-photo-enhanced.jpg";

const ENHANCED_SUFFIX: &str = "-enhanced";

/// Errors that can occur when exporting.
#[derive(Debug, Error)]
pub enum ExportError {
    /// There is nothing to export
    #[error("Cannot export an empty image")]
    EmptyImage,

    /// JPEG encoding failed
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Encoded export ready to hand to the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedImage {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
}

impl ExportedImage {
    /// Derive the file name from the uploaded file's name.
    pub fn named(mut self, original: Option<&str>) -> Self {
        self.file_name = export_file_name(original);
        self
    }
}

/// What the browser can do with a generated blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DownloadCapabilities {
    /// `<a download>` triggers a file save.
    pub supports_download_attribute: bool,
    /// A blob URL can be opened in a new tab.
    pub can_open_blob_urls: bool,
}

/// How the page should deliver the exported file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeliveryMethod {
    /// Click a temporary `<a download>` element.
    Anchor,
    /// Open the blob in a new tab; the user saves it by long-press.
    OpenInNewTab,
}

impl DeliveryMethod {
    /// Choose by capability, never by user agent.
    pub fn select(capabilities: DownloadCapabilities) -> Self {
        if capabilities.supports_download_attribute || !capabilities.can_open_blob_urls {
            DeliveryMethod::Anchor
        } else {
            DeliveryMethod::OpenInNewTab
        }
    }
}

/// `photo.png` becomes `photo-enhanced.jpg`.
pub fn export_file_name(original: Option<&str>) -> String {
    let name = original
        .map(|n| n.rsplit(|c| c == '/' || c == '\\').next().unwrap_or(n).trim())
        .unwrap_or_default();
    let stem = match name.rfind('.') {
        Some(0) | None => name,
        Some(i) => &name[..i],
    };
    if stem.is_empty() {
        return FALLBACK_FILE_NAME.to_string();
    }
    format!("{}{}.{}", stem, ENHANCED_SUFFIX, ImageFormat::Jpeg.extension())
}

/// Bake `adjustments` onto `image`, redact `committed_blurs` again on the
/// result, and encode as JPEG.
///
/// `committed_blurs` are rectangles in `image` pixels.
pub fn export(
    image: &RgbaBuffer,
    adjustments: &AdjustmentState,
    committed_blurs: &[PixelRect],
    config: &EngineConfig,
) -> Result<ExportedImage, ExportError> {
    if image.is_empty() {
        return Err(ExportError::EmptyImage);
    }

    let descriptor = compute_filter_descriptor(adjustments);
    let mut baked = bake_descriptor(image, &descriptor, config);

    for &rect in committed_blurs {
        let mapped = map_rect(rect, image.width, image.height, &descriptor.transform);
        baked = apply_blur_natural(&baked, mapped, config);
    }

    let bytes = encode_jpeg(&baked, config.jpeg_quality)?;
    log::info!(
        "Exported {}x{} JPEG ({} bytes, {} blur regions)",
        baked.width,
        baked.height,
        bytes.len(),
        committed_blurs.len()
    );

    Ok(ExportedImage {
        bytes,
        mime: ImageFormat::Jpeg.mime_type(),
        file_name: FALLBACK_FILE_NAME.to_string(),
        width: baked.width,
        height: baked.height,
    })
}
