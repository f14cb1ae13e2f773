//! Composed visual-effect description of an [`AdjustmentState`].
//!
//! The descriptor is the single source of truth for both render paths:
//! - **Preview**: rendered to CSS strings and layered `<div>`s by the page
//! - **Bake**: applied destructively to a buffer by [`bake`](super::bake)
//!
//! ## Derived values
//!
//! Exposure, shadows, highlights and sharpen have no CSS filter of their own
//! and are folded into brightness and contrast:
//!
//! ```text
//! brightness% = brightness * exposure/100 + shadows * 0.3 + sharpen * 0.1
//! contrast%   = contrast + highlights * 0.3 + sharpen * 0.3
//! ```

use serde::Serialize;

use super::AdjustmentState;
use crate::raster::{BlendMode, Rgb};

/// Warm cast color (temperature > 0).
pub const WARM_COLOR: Rgb = Rgb::new(255, 160, 64);
/// Cool cast color (temperature < 0).
pub const COOL_COLOR: Rgb = Rgb::new(64, 160, 255);
/// Magenta cast color (tint > 0).
pub const MAGENTA_COLOR: Rgb = Rgb::new(255, 64, 255);
/// Green cast color (tint < 0).
pub const GREEN_COLOR: Rgb = Rgb::new(64, 255, 64);

/// One step of the color filter chain. Amounts are CSS percentages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum ColorFilter {
    Brightness(f32),
    Contrast(f32),
    Saturate(f32),
    /// Standard deviation in pixels
    Blur(f32),
    Grayscale(f32),
    Sepia(f32),
    /// Degrees
    HueRotate(f32),
}

impl ColorFilter {
    /// True if the filter leaves every pixel unchanged.
    pub fn is_identity(&self) -> bool {
        match *self {
            ColorFilter::Brightness(v) | ColorFilter::Contrast(v) | ColorFilter::Saturate(v) => {
                (v - 100.0).abs() < 1e-4
            }
            ColorFilter::Blur(v) | ColorFilter::Grayscale(v) | ColorFilter::Sepia(v) => v <= 1e-4,
            ColorFilter::HueRotate(v) => {
                let r = v.rem_euclid(360.0);
                r < 1e-4 || (360.0 - r) < 1e-4
            }
        }
    }

    /// CSS `filter` function, e.g. `contrast(115%)`.
    pub fn css(&self) -> String {
        match *self {
            ColorFilter::Brightness(v) => format!("brightness({}%)", fmt_num(v)),
            ColorFilter::Contrast(v) => format!("contrast({}%)", fmt_num(v)),
            ColorFilter::Saturate(v) => format!("saturate({}%)", fmt_num(v)),
            ColorFilter::Blur(v) => format!("blur({}px)", fmt_num(v)),
            ColorFilter::Grayscale(v) => format!("grayscale({}%)", fmt_num(v)),
            ColorFilter::Sepia(v) => format!("sepia({}%)", fmt_num(v)),
            ColorFilter::HueRotate(v) => format!("hue-rotate({}deg)", fmt_num(v)),
        }
    }
}

/// An order-independent visual layer drawn over the filtered image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum OverlayLayer {
    /// Radial darkening toward the corners.
    Vignette { opacity: f32 },
    /// Tileable grayscale static.
    Noise { opacity: f32 },
    /// Warm or cool color wash.
    Temperature { color: Rgb, opacity: f32 },
    /// Magenta or green color wash.
    Tint { color: Rgb, opacity: f32 },
    /// Contrast-boosted copy of the image itself.
    Clarity { amount: f32 },
}

impl OverlayLayer {
    pub fn blend_mode(&self) -> BlendMode {
        match self {
            OverlayLayer::Vignette { .. } => BlendMode::Multiply,
            _ => BlendMode::Overlay,
        }
    }

    /// CSS `mix-blend-mode` of the preview layer.
    pub fn css_blend_mode(&self) -> &'static str {
        self.blend_mode().css_name()
    }

    /// Opacity applied to the whole layer.
    pub fn opacity(&self) -> f32 {
        match *self {
            OverlayLayer::Vignette { opacity }
            | OverlayLayer::Noise { opacity }
            | OverlayLayer::Temperature { opacity, .. }
            | OverlayLayer::Tint { opacity, .. } => opacity,
            OverlayLayer::Clarity { amount } => amount * 0.5,
        }
    }

    /// Contrast multiplier used to build the clarity layer.
    pub(crate) fn clarity_contrast(amount: f32) -> f32 {
        1.0 + amount * 0.5
    }

    /// CSS `background` of the preview layer. Noise is drawn from the
    /// repeated [`NoiseTexture`](super::NoiseTexture) tile instead, and
    /// clarity has no background.
    pub fn css_background(&self) -> Option<String> {
        match self {
            OverlayLayer::Vignette { .. } => Some(
                "radial-gradient(ellipse farthest-corner at center, rgba(0,0,0,0) 40%, rgba(0,0,0,1) 100%)"
                    .to_string(),
            ),
            OverlayLayer::Temperature { color, .. } | OverlayLayer::Tint { color, .. } => {
                Some(format!("rgb({},{},{})", color.r, color.g, color.b))
            }
            OverlayLayer::Noise { .. } | OverlayLayer::Clarity { .. } => None,
        }
    }

    /// CSS `backdrop-filter` of the preview layer (clarity only).
    pub fn css_backdrop_filter(&self) -> Option<String> {
        match *self {
            OverlayLayer::Clarity { amount } => Some(format!(
                "contrast({}%)",
                fmt_num(Self::clarity_contrast(amount) * 100.0)
            )),
            _ => None,
        }
    }
}

/// Rotation and mirroring about the image center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    /// Clockwise rotation, 0..360.
    pub rotate: u32,
    pub flip_x: bool,
    pub flip_y: bool,
}

impl Transform {
    pub fn is_identity(&self) -> bool {
        self.rotate == 0 && !self.flip_x && !self.flip_y
    }

    /// CSS `transform`: `rotate(..) scaleX(..) scaleY(..)`.
    pub fn css(&self) -> String {
        format!(
            "rotate({}deg) scaleX({}) scaleY({})",
            self.rotate,
            if self.flip_x { -1 } else { 1 },
            if self.flip_y { -1 } else { 1 }
        )
    }
}

/// Everything needed to render an adjustment state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDescriptor {
    /// Ordered color chain.
    pub color_filters: Vec<ColorFilter>,
    /// Overlays in bake order: vignette, noise, temperature, tint, clarity.
    pub overlays: Vec<OverlayLayer>,
    pub transform: Transform,
}

impl FilterDescriptor {
    /// True if rendering would reproduce the source exactly.
    pub fn is_identity(&self) -> bool {
        self.transform.is_identity()
            && self.overlays.is_empty()
            && self.color_filters.iter().all(ColorFilter::is_identity)
    }

    /// CSS `filter` value for the live preview (`none` when empty).
    pub fn css_filter(&self) -> String {
        let parts: Vec<String> = self
            .color_filters
            .iter()
            .filter(|f| !f.is_identity())
            .map(ColorFilter::css)
            .collect();
        if parts.is_empty() {
            "none".to_string()
        } else {
            parts.join(" ")
        }
    }

    pub fn css_transform(&self) -> String {
        self.transform.css()
    }
}

/// Compute the descriptor for a state. Out-of-range values are clamped.
pub fn compute_filter_descriptor(state: &AdjustmentState) -> FilterDescriptor {
    let s = state.clamped();

    let brightness = s.brightness * s.exposure / 100.0 + s.shadows * 0.3 + s.sharpen * 0.1;
    let contrast = s.contrast + s.highlights * 0.3 + s.sharpen * 0.3;

    let mut color_filters = vec![
        ColorFilter::Brightness(brightness.max(0.0)),
        ColorFilter::Contrast(contrast.max(0.0)),
        ColorFilter::Saturate(s.saturation),
    ];
    if s.blur > 0.0 {
        color_filters.push(ColorFilter::Blur(s.blur));
    }
    color_filters.push(ColorFilter::Grayscale(s.grayscale));
    color_filters.push(ColorFilter::Sepia(s.sepia));
    color_filters.push(ColorFilter::HueRotate(s.hue_rotate));

    let mut overlays = Vec::new();
    if s.vignette > 0.0 {
        overlays.push(OverlayLayer::Vignette {
            opacity: s.vignette / 100.0,
        });
    }
    if s.noise > 0.0 {
        overlays.push(OverlayLayer::Noise {
            opacity: s.noise / 100.0,
        });
    }
    if s.temperature != 0.0 {
        overlays.push(OverlayLayer::Temperature {
            color: if s.temperature > 0.0 { WARM_COLOR } else { COOL_COLOR },
            opacity: s.temperature.abs() / 100.0,
        });
    }
    if s.tint != 0.0 {
        overlays.push(OverlayLayer::Tint {
            color: if s.tint > 0.0 { MAGENTA_COLOR } else { GREEN_COLOR },
            opacity: s.tint.abs() / 100.0,
        });
    }
    if s.clarity > 0.0 {
        overlays.push(OverlayLayer::Clarity {
            amount: s.clarity / 100.0,
        });
    }

    FilterDescriptor {
        color_filters,
        overlays,
        transform: Transform {
            rotate: s.rotation_degrees(),
            flip_x: s.flip_x,
            flip_y: s.flip_y,
        },
    }
}

/// Format with at most two decimals and no trailing zeros.
fn fmt_num(v: f32) -> String {
    let rounded = (v * 100.0).round() / 100.0;
    if rounded == rounded.trunc() {
        format!("{}", rounded as i64)
    } else {
        format!("{}", rounded)
    }
}
