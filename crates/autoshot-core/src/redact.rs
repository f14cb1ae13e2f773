//! Irreversible redaction of a rectangular region (blur box).
//!
//! The region is blurred at escalating radii, pixelated by a
//! downsample/upsample round trip, washed with translucent white and pasted
//! back over the original pixels. The original data for the region is gone
//! from the returned buffer.
//!
//! Redaction fails closed: if any step cannot run, the region is covered
//! with a flat translucent gray instead. Failures are logged, never returned.

use image::imageops::{self, FilterType};
use thiserror::Error;

use crate::adjustments::apply_blur as gaussian_blur;
use crate::config::EngineConfig;
use crate::crop::fit_rounding;
use crate::raster::{PixelRect, Rgb, Rgba, RgbaBuffer};
use crate::region::{DisplayGeometry, Rect};

/// Fill used when the blur pipeline cannot run.
pub const FALLBACK_FILL: Rgba = Rgba::new(150, 150, 150, 217);

/// Smallest pixelation block edge.
const MIN_PIXEL_SIZE: u32 = 5;
/// Target number of blocks across the shorter edge.
const PIXEL_BLOCKS: u32 = 15;

/// Why the blur pipeline could not run.
#[derive(Debug, Clone, PartialEq, Error)]
enum RedactionError {
    #[error("Invalid display geometry")]
    InvalidGeometry,

    #[error("Redaction region is empty")]
    EmptyRegion,

    #[error("Redaction region {0:?} exceeds image {1}x{2}")]
    OutOfBounds(PixelRect, u32, u32),

    #[error("No blur radii configured")]
    NoBlurPasses,
}

/// Redact a displayed-space region of `image`.
pub fn apply_blur(
    image: &RgbaBuffer,
    region: &Rect,
    geometry: &DisplayGeometry,
    config: &EngineConfig,
) -> RgbaBuffer {
    if !geometry.is_valid() {
        log::warn!("Redacting whole image: {}", RedactionError::InvalidGeometry);
        // Region cannot be mapped; cover everything.
        return fallback(image, PixelRect::new(0, 0, image.width, image.height));
    }
    apply_blur_natural(image, geometry.to_natural(region), config)
}

/// Redact a region already in natural pixels.
pub fn apply_blur_natural(image: &RgbaBuffer, rect: PixelRect, config: &EngineConfig) -> RgbaBuffer {
    match redact(image, rect, config) {
        Ok(out) => out,
        Err(err) => {
            log::warn!("Redaction fell back to a flat fill: {}", err);
            fallback(image, rect)
        }
    }
}

/// Pixel size of the pixelation blocks for a region.
pub fn pixel_size(width: u32, height: u32) -> u32 {
    MIN_PIXEL_SIZE.max(width.min(height) / PIXEL_BLOCKS)
}

fn redact(image: &RgbaBuffer, rect: PixelRect, config: &EngineConfig) -> Result<RgbaBuffer, RedactionError> {
    if rect.is_empty() {
        return Err(RedactionError::EmptyRegion);
    }
    let rect = fit_rounding(rect, image.width, image.height)
        .ok_or(RedactionError::OutOfBounds(rect, image.width, image.height))?;
    if config.blur_radii.is_empty() {
        return Err(RedactionError::NoBlurPasses);
    }

    let mut region = image.extract(rect);

    for &radius in &config.blur_radii {
        gaussian_blur(&mut region, radius);
    }

    let mut region = pixelate(&region);
    let overlay = Rgb::WHITE.with_alpha(config.redaction_overlay_alpha);
    region.fill_rect_over(PixelRect::new(0, 0, region.width, region.height), overlay);

    let mut out = image.clone();
    out.paste(&region, rect.x, rect.y);

    log::debug!(
        "Redacted {}x{} at ({}, {}) with {} blur passes",
        rect.width,
        rect.height,
        rect.x,
        rect.y,
        config.blur_radii.len()
    );
    Ok(out)
}

/// Downsample to blocks, then scale back up with nearest-neighbor.
fn pixelate(region: &RgbaBuffer) -> RgbaBuffer {
    let (w, h) = (region.width, region.height);
    let size = pixel_size(w, h);
    let small_w = (w / size).max(1);
    let small_h = (h / size).max(1);

    let small = imageops::resize(&region.to_rgba_image(), small_w, small_h, FilterType::Triangle);
    let big = imageops::resize(&small, w, h, FilterType::Nearest);
    RgbaBuffer::from_rgba_image(big)
}

fn fallback(image: &RgbaBuffer, rect: PixelRect) -> RgbaBuffer {
    let mut out = image.clone();
    out.fill_rect_over(rect, FALLBACK_FILL);
    out
}
