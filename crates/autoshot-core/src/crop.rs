//! Destructive crop of the working image.
//!
//! The region arrives in displayed coordinates and is mapped to natural
//! pixels with independent X and Y scale factors. The output is sized
//! exactly to the mapped rectangle: no padding, no letterboxing. The aspect
//! ratio of the interactive box is not checked here; any rectangle crops.
//!
//! # Example
//!
//! ```ignore
//! let geometry = DisplayGeometry::new(400.0, 300.0, 1200, 900);
//! let cropped = apply_crop(&image, &Rect::new(40.0, 30.0, 300.0, 200.0), &geometry)?;
//! assert_eq!((cropped.width, cropped.height), (900, 600));
//! ```

use thiserror::Error;

use crate::raster::{PixelRect, RgbaBuffer};
use crate::region::{DisplayGeometry, Rect};

/// Errors that can occur when cropping.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CropError {
    /// Displayed or natural dimensions are zero or not finite
    #[error("Invalid display geometry: {displayed_width}x{displayed_height} shown, {natural_width}x{natural_height} natural")]
    InvalidGeometry {
        displayed_width: f64,
        displayed_height: f64,
        natural_width: u32,
        natural_height: u32,
    },

    /// The natural-space rectangle has no area
    #[error("Crop region is empty")]
    EmptyRegion,

    /// The natural-space rectangle does not fit the image
    #[error("Crop region {x},{y} {width}x{height} exceeds image {image_width}x{image_height}")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        image_width: u32,
        image_height: u32,
    },
}

/// Crop `image` to `region`.
///
/// The output is `round(w * sx) x round(h * sy)` starting at
/// `(round(x * sx), round(y * sy))`. A rectangle that overshoots the image
/// by at most one pixel (rounding) is shifted back inside; anything larger
/// is rejected and the input is left as is.
pub fn apply_crop(
    image: &RgbaBuffer,
    region: &Rect,
    geometry: &DisplayGeometry,
) -> Result<RgbaBuffer, CropError> {
    if !geometry.is_valid() {
        return Err(CropError::InvalidGeometry {
            displayed_width: geometry.displayed_width,
            displayed_height: geometry.displayed_height,
            natural_width: geometry.natural_width,
            natural_height: geometry.natural_height,
        });
    }

    let rect = geometry.to_natural(region);
    if rect.is_empty() {
        return Err(CropError::EmptyRegion);
    }

    let rect = fit_rounding(rect, image.width, image.height).ok_or(CropError::OutOfBounds {
        x: rect.x,
        y: rect.y,
        width: rect.width,
        height: rect.height,
        image_width: image.width,
        image_height: image.height,
    })?;

    // Fast path: full crop returns a clone
    if rect == PixelRect::new(0, 0, image.width, image.height) {
        return Ok(image.clone());
    }

    log::debug!(
        "Cropping {}x{} to {}x{} at ({}, {})",
        image.width,
        image.height,
        rect.width,
        rect.height,
        rect.x,
        rect.y
    );

    Ok(image.extract(rect))
}

/// Pull a rectangle that overhangs by a rounding pixel back inside.
pub(crate) fn fit_rounding(rect: PixelRect, width: u32, height: u32) -> Option<PixelRect> {
    if rect.width > width || rect.height > height {
        return None;
    }
    let fit = |origin: u32, size: u32, limit: u32| -> Option<u32> {
        let end = origin.saturating_add(size);
        if end <= limit {
            Some(origin)
        } else if end - limit <= 1 {
            Some(limit - size)
        } else {
            None
        }
    };
    Some(PixelRect::new(
        fit(rect.x, rect.width, width)?,
        fit(rect.y, rect.height, height)?,
        rect.width,
        rect.height,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Create a test image where each pixel has a unique value based on position.
    pub(super) fn test_image(width: u32, height: u32) -> RgbaBuffer {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = ((y * width + x) % 256) as u8;
                pixels.extend_from_slice(&[v, v, v, 255]);
            }
        }
        RgbaBuffer {
            width,
            height,
            pixels,
        }
    }

    #[test]
    fn test_full_crop() {
        let img = test_image(100, 100);
        let g = DisplayGeometry::new(50.0, 50.0, 100, 100);
        let result = apply_crop(&img, &Rect::new(0.0, 0.0, 50.0, 50.0), &g).unwrap();
        assert_eq!(result, img);
    }

    #[test]
    fn test_scaled_crop() {
        let img = test_image(10, 10);
        let g = DisplayGeometry::new(5.0, 5.0, 10, 10);
        let result = apply_crop(&img, &Rect::new(1.0, 1.0, 3.0, 3.0), &g).unwrap();

        assert_eq!((result.width, result.height), (6, 6));
        // First pixel comes from (2, 2): (2 * 10 + 2) % 256 = 22
        assert_eq!(result.pixels[0], 22);
    }

    #[test]
    fn test_independent_axis_scales() {
        let img = test_image(120, 40);
        let g = DisplayGeometry::new(60.0, 40.0, 120, 40);
        let result = apply_crop(&img, &Rect::new(0.0, 0.0, 30.0, 20.0), &g).unwrap();
        assert_eq!((result.width, result.height), (60, 20));
    }

    #[test]
    fn test_rounding_overhang_is_shifted_inside() {
        let img = test_image(10, 10);
        let g = DisplayGeometry::new(4.0, 4.0, 10, 10);
        // x: round(1.5) = 2, width: round(8.5) = 9 -> would end at 11
        let result = apply_crop(&img, &Rect::new(0.6, 0.0, 3.4, 4.0), &g).unwrap();
        assert_eq!((result.width, result.height), (9, 10));
        assert_eq!(result.pixels[0], 1);
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let img = test_image(10, 10);
        let g = DisplayGeometry::unscaled(10, 10);
        let err = apply_crop(&img, &Rect::new(8.0, 0.0, 5.0, 5.0), &g).unwrap_err();
        assert!(matches!(err, CropError::OutOfBounds { .. }));
    }

    #[test]
    fn test_empty_region_rejected() {
        let img = test_image(10, 10);
        let g = DisplayGeometry::unscaled(10, 10);
        assert_eq!(
            apply_crop(&img, &Rect::new(2.0, 2.0, 0.2, 5.0), &g),
            Err(CropError::EmptyRegion)
        );
    }

    #[test]
    fn test_invalid_geometry_rejected() {
        let img = test_image(10, 10);
        let g = DisplayGeometry::new(0.0, 10.0, 10, 10);
        assert!(matches!(
            apply_crop(&img, &Rect::new(0.0, 0.0, 5.0, 5.0), &g),
            Err(CropError::InvalidGeometry { .. })
        ));
    }

    #[test]
    fn test_alpha_preserved() {
        let mut img = test_image(4, 4);
        img.put_pixel(1, 1, crate::raster::Rgba::new(1, 2, 3, 0));
        let g = DisplayGeometry::unscaled(4, 4);
        let result = apply_crop(&img, &Rect::new(1.0, 1.0, 2.0, 2.0), &g).unwrap();
        assert_eq!(result.pixels[..4], [1, 2, 3, 0]);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
