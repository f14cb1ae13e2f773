//! On-screen rectangles for the crop and blur tools.
//!
//! Regions live in *displayed* coordinates: pixels of the scaled `<img>` the
//! user drags over. [`DisplayGeometry`] maps them to natural (source) pixels
//! with independent X and Y scale factors.
//!
//! Both region types keep two invariants after every constructor and
//! mutation:
//! - **Containment**: the rectangle stays inside the displayed image
//! - **Minimum size**: each edge is at least the configured minimum, unless
//!   the displayed image itself is smaller
//!
//! [`CropRegion`] additionally keeps a fixed aspect ratio.

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::raster::PixelRect;

/// Share of the displayed image the initial crop box covers.
const INITIAL_CROP_FRACTION: f64 = 0.8;
/// Initial blur box width as a share of the displayed width.
const INITIAL_BLUR_FRACTION: f64 = 0.3;

/// A rectangle in displayed coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// True if the rectangle lies within `0..width` x `0..height`.
    pub fn is_within(&self, width: f64, height: f64) -> bool {
        const EPS: f64 = 1e-9;
        self.x >= -EPS
            && self.y >= -EPS
            && self.right() <= width + EPS
            && self.bottom() <= height + EPS
    }
}

/// Displayed and natural size of the image being edited.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayGeometry {
    pub displayed_width: f64,
    pub displayed_height: f64,
    pub natural_width: u32,
    pub natural_height: u32,
}

impl DisplayGeometry {
    pub fn new(displayed_width: f64, displayed_height: f64, natural_width: u32, natural_height: u32) -> Self {
        Self {
            displayed_width,
            displayed_height,
            natural_width,
            natural_height,
        }
    }

    /// Geometry of an image shown at its natural size.
    pub fn unscaled(natural_width: u32, natural_height: u32) -> Self {
        Self::new(
            natural_width as f64,
            natural_height as f64,
            natural_width,
            natural_height,
        )
    }

    /// Both displayed dimensions finite and positive, natural non-zero.
    pub fn is_valid(&self) -> bool {
        self.displayed_width.is_finite()
            && self.displayed_height.is_finite()
            && self.displayed_width > 0.0
            && self.displayed_height > 0.0
            && self.natural_width > 0
            && self.natural_height > 0
    }

    /// `natural_width / displayed_width`
    pub fn scale_x(&self) -> f64 {
        self.natural_width as f64 / self.displayed_width
    }

    /// `natural_height / displayed_height`
    pub fn scale_y(&self) -> f64 {
        self.natural_height as f64 / self.displayed_height
    }

    /// Map a displayed rectangle to natural pixels.
    ///
    /// Origin and size are scaled and rounded independently, so the output
    /// size is exactly `round(w * sx) x round(h * sy)`. Negative values
    /// saturate to zero. The result is not clamped to the image.
    pub fn to_natural(&self, rect: &Rect) -> PixelRect {
        let (sx, sy) = (self.scale_x(), self.scale_y());
        let px = |v: f64| {
            if v.is_finite() {
                v.round().clamp(0.0, u32::MAX as f64) as u32
            } else {
                0
            }
        };
        PixelRect::new(
            px(rect.x * sx),
            px(rect.y * sy),
            px(rect.width * sx),
            px(rect.height * sy),
        )
    }
}

/// Fixed-ratio crop rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CropRegion {
    rect: Rect,
    aspect: f64,
    min_size: f64,
}

impl CropRegion {
    /// The largest centered box of the configured ratio that fits in 80 % of
    /// the displayed image.
    pub fn initial(geometry: &DisplayGeometry, config: &EngineConfig) -> Self {
        let aspect = config.crop_ratio();
        let (dw, dh) = (geometry.displayed_width, geometry.displayed_height);

        let mut width = dw * INITIAL_CROP_FRACTION;
        let mut height = width / aspect;
        if height > dh * INITIAL_CROP_FRACTION {
            height = dh * INITIAL_CROP_FRACTION;
            width = height * aspect;
        }

        let region = Self {
            rect: Rect::new((dw - width) / 2.0, (dh - height) / 2.0, width, height),
            aspect,
            min_size: config.crop_min_size,
        };
        region.constrained(geometry)
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Width divided by height.
    pub fn aspect(&self) -> f64 {
        self.aspect
    }

    /// Move the top-left corner, keeping the size. The box is pushed back
    /// inside the image if needed.
    pub fn moved_to(&self, x: f64, y: f64, geometry: &DisplayGeometry) -> Self {
        let (dw, dh) = (geometry.displayed_width, geometry.displayed_height);
        let mut rect = self.rect;
        rect.x = clamp_or_zero(x, dw - rect.width);
        rect.y = clamp_or_zero(y, dh - rect.height);
        Self { rect, ..*self }
    }

    /// Resize from the top-left anchor. The ratio is kept by deriving height
    /// from width; the larger of the two requested extents wins.
    pub fn resized_to(&self, width: f64, height: f64, geometry: &DisplayGeometry) -> Self {
        let width = finite_or(width, self.rect.width).max(finite_or(height, 0.0) * self.aspect);
        let rect = Rect::new(self.rect.x, self.rect.y, width, width / self.aspect);
        Self { rect, ..*self }.constrained(geometry)
    }

    fn constrained(self, geometry: &DisplayGeometry) -> Self {
        let (dw, dh) = (geometry.displayed_width, geometry.displayed_height);
        let aspect = self.aspect;

        // Widest box that fits from the current origin, then from (0, 0).
        let x = clamp_or_zero(self.rect.x, dw);
        let y = clamp_or_zero(self.rect.y, dh);
        let max_from = |x: f64, y: f64| ((dw - x).min((dh - y) * aspect)).max(0.0);
        let min_w = self.min_size.max(self.min_size * aspect);

        let mut width = self.rect.width.max(min_w);
        let (mut x, mut y) = (x, y);
        if width > max_from(x, y) {
            x = clamp_or_zero(x, dw - width);
            y = clamp_or_zero(y, dh - width / aspect);
            width = width.min(max_from(x, y));
        }
        let height = width / aspect;

        Self {
            rect: Rect::new(x, y, width, height),
            ..self
        }
    }
}

/// Free-form blur rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BlurRegion {
    rect: Rect,
    min_size: f64,
}

impl BlurRegion {
    /// A plate-shaped box (3:1) centered in the image.
    pub fn initial(geometry: &DisplayGeometry, config: &EngineConfig) -> Self {
        let (dw, dh) = (geometry.displayed_width, geometry.displayed_height);
        let width = dw * INITIAL_BLUR_FRACTION;
        let height = width / 3.0;
        Self::new(
            Rect::new((dw - width) / 2.0, (dh - height) / 2.0, width, height),
            geometry,
            config,
        )
    }

    /// Build from an arbitrary rectangle, enforcing both invariants.
    pub fn new(rect: Rect, geometry: &DisplayGeometry, config: &EngineConfig) -> Self {
        Self {
            rect,
            min_size: config.blur_min_size,
        }
        .constrained(geometry)
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn moved_to(&self, x: f64, y: f64, geometry: &DisplayGeometry) -> Self {
        let (dw, dh) = (geometry.displayed_width, geometry.displayed_height);
        let mut rect = self.rect;
        rect.x = clamp_or_zero(x, dw - rect.width);
        rect.y = clamp_or_zero(y, dh - rect.height);
        Self { rect, ..*self }
    }

    pub fn resized_to(&self, width: f64, height: f64, geometry: &DisplayGeometry) -> Self {
        let rect = Rect::new(
            self.rect.x,
            self.rect.y,
            finite_or(width, self.rect.width),
            finite_or(height, self.rect.height),
        );
        Self { rect, ..*self }.constrained(geometry)
    }

    fn constrained(self, geometry: &DisplayGeometry) -> Self {
        let (dw, dh) = (geometry.displayed_width, geometry.displayed_height);
        let width = finite_or(self.rect.width, 0.0).max(self.min_size).min(dw.max(0.0));
        let height = finite_or(self.rect.height, 0.0).max(self.min_size).min(dh.max(0.0));
        let x = clamp_or_zero(finite_or(self.rect.x, 0.0), dw - width);
        let y = clamp_or_zero(finite_or(self.rect.y, 0.0), dh - height);
        Self {
            rect: Rect::new(x, y, width, height),
            ..self
        }
    }
}

#[inline]
fn finite_or(v: f64, fallback: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        fallback
    }
}

/// Clamp into `0..=max`, treating a negative `max` as zero.
#[inline]
fn clamp_or_zero(v: f64, max: f64) -> f64 {
    finite_or(v, 0.0).clamp(0.0, max.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> DisplayGeometry {
        DisplayGeometry::new(600.0, 400.0, 1200, 800)
    }

    fn assert_ratio(region: &CropRegion) {
        let r = region.rect();
        assert!((r.width / r.height - 1.5).abs() < 1e-9, "{:?}", r);
    }

    #[test]
    fn test_scale_factors() {
        let g = DisplayGeometry::new(400.0, 300.0, 1600, 600);
        assert_eq!(g.scale_x(), 4.0);
        assert_eq!(g.scale_y(), 2.0);
        assert_eq!(
            g.to_natural(&Rect::new(10.0, 20.0, 100.0, 50.0)),
            PixelRect::new(40, 40, 400, 100)
        );
    }

    #[test]
    fn test_to_natural_rounds() {
        let g = DisplayGeometry::new(3.0, 3.0, 10, 10);
        let r = g.to_natural(&Rect::new(0.0, 0.0, 1.0, 2.0));
        assert_eq!((r.width, r.height), (3, 7));
    }

    #[test]
    fn test_invalid_geometry() {
        assert!(!DisplayGeometry::new(0.0, 10.0, 5, 5).is_valid());
        assert!(!DisplayGeometry::new(f64::NAN, 10.0, 5, 5).is_valid());
        assert!(DisplayGeometry::unscaled(5, 5).is_valid());
    }

    #[test]
    fn test_initial_crop_is_centered_three_by_two() {
        let region = CropRegion::initial(&geometry(), &EngineConfig::default());
        let r = region.rect();
        assert_ratio(&region);
        assert_eq!(r.width, 480.0);
        assert_eq!(r.height, 320.0);
        assert_eq!((r.x, r.y), (60.0, 40.0));
    }

    #[test]
    fn test_initial_crop_on_tall_image() {
        let g = DisplayGeometry::new(300.0, 600.0, 300, 600);
        let region = CropRegion::initial(&g, &EngineConfig::default());
        let r = region.rect();
        assert_ratio(&region);
        assert_eq!(r.width, 240.0);
        assert!(r.is_within(300.0, 600.0));
    }

    #[test]
    fn test_crop_move_is_contained() {
        let g = geometry();
        let region = CropRegion::initial(&g, &EngineConfig::default()).moved_to(1000.0, -50.0, &g);
        let r = region.rect();
        assert_eq!(r.x, 600.0 - r.width);
        assert_eq!(r.y, 0.0);
        assert_eq!(r.width, 480.0);
    }

    #[test]
    fn test_crop_resize_keeps_ratio_and_minimum() {
        let g = geometry();
        let region = CropRegion::initial(&g, &EngineConfig::default());

        let small = region.resized_to(10.0, 10.0, &g);
        assert_ratio(&small);
        assert!(small.rect().height >= 50.0);
        assert!(small.rect().width >= 50.0);

        let big = region.resized_to(5000.0, 10.0, &g);
        assert_ratio(&big);
        assert!(big.rect().is_within(600.0, 400.0), "{:?}", big.rect());
    }

    #[test]
    fn test_blur_minimum_and_containment() {
        let g = geometry();
        let config = EngineConfig::default();
        let region = BlurRegion::new(Rect::new(590.0, 395.0, 5.0, 5.0), &g, &config);
        let r = region.rect();
        assert_eq!((r.width, r.height), (20.0, 20.0));
        assert_eq!((r.x, r.y), (580.0, 380.0));

        let moved = region.moved_to(-10.0, 1000.0, &g).rect();
        assert_eq!((moved.x, moved.y), (0.0, 380.0));

        let resized = region.resized_to(1000.0, 3.0, &g).rect();
        assert_eq!(resized.height, 20.0);
        assert!(resized.is_within(600.0, 400.0));
    }

    #[test]
    fn test_blur_initial_is_inside() {
        let g = geometry();
        let r = BlurRegion::initial(&g, &EngineConfig::default()).rect();
        assert!(r.is_within(600.0, 400.0));
        assert!(r.width >= 20.0 && r.height >= 20.0);
    }
}
