//! Alpha compositing and separable blend modes.
//!
//! Follows the W3C Compositing and Blending model with straight alpha:
//!
//! ```text
//! Cs' = (1 - ab) * Cs + ab * B(Cb, Cs)     // blend
//! ao  = as + ab * (1 - as)                 // source-over
//! Co  = (as * Cs' + ab * Cb * (1 - as)) / ao
//! ```

use serde::{Deserialize, Serialize};

/// Separable blend modes used by the overlay layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlendMode {
    /// Plain source-over.
    #[default]
    Normal,
    /// `Cb * Cs`, darkens.
    Multiply,
    /// Hard-light with layers swapped; keeps backdrop highlights and shadows.
    Overlay,
}

impl BlendMode {
    /// Blend a single normalized channel.
    #[inline]
    pub fn apply(self, backdrop: f32, source: f32) -> f32 {
        match self {
            BlendMode::Normal => source,
            BlendMode::Multiply => backdrop * source,
            BlendMode::Overlay => hard_light(source, backdrop),
        }
    }

    /// CSS `mix-blend-mode` keyword.
    pub fn css_name(self) -> &'static str {
        match self {
            BlendMode::Normal => "normal",
            BlendMode::Multiply => "multiply",
            BlendMode::Overlay => "overlay",
        }
    }
}

#[inline]
fn hard_light(backdrop: f32, source: f32) -> f32 {
    if source <= 0.5 {
        backdrop * 2.0 * source
    } else {
        let s = 2.0 * source - 1.0;
        backdrop + s - backdrop * s
    }
}

/// Composite `top` over `below` (straight RGBA8) with plain source-over.
#[inline]
pub fn source_over(below: [u8; 4], top: [u8; 4]) -> [u8; 4] {
    blend_over(below, top, BlendMode::Normal, 1.0)
}

/// Composite `top` over `below` with a blend mode and an extra layer opacity.
pub fn blend_over(below: [u8; 4], top: [u8; 4], mode: BlendMode, opacity: f32) -> [u8; 4] {
    let a_s = top[3] as f32 / 255.0 * opacity.clamp(0.0, 1.0);
    if a_s <= 0.0 {
        return below;
    }
    let a_b = below[3] as f32 / 255.0;
    let a_o = a_s + a_b * (1.0 - a_s);
    if a_o <= 0.0 {
        return [0, 0, 0, 0];
    }

    let mut out = [0u8; 4];
    for c in 0..3 {
        let cb = below[c] as f32 / 255.0;
        let cs = top[c] as f32 / 255.0;
        let mixed = (1.0 - a_b) * cs + a_b * mode.apply(cb, cs);
        let co = (a_s * mixed + a_b * cb * (1.0 - a_s)) / a_o;
        out[c] = (co.clamp(0.0, 1.0) * 255.0).round() as u8;
    }
    out[3] = (a_o.clamp(0.0, 1.0) * 255.0).round() as u8;
    out
}

/// Composite `top` onto `below` with source-atop: the result keeps the
/// backdrop's alpha, so layers never paint into transparent areas.
pub fn blend_atop(below: [u8; 4], top: [u8; 4], mode: BlendMode, opacity: f32) -> [u8; 4] {
    let a_s = top[3] as f32 / 255.0 * opacity.clamp(0.0, 1.0);
    if a_s <= 0.0 || below[3] == 0 {
        return below;
    }
    let a_b = below[3] as f32 / 255.0;

    let mut out = [0u8; 4];
    for c in 0..3 {
        let cb = below[c] as f32 / 255.0;
        let cs = top[c] as f32 / 255.0;
        let mixed = (1.0 - a_b) * cs + a_b * mode.apply(cb, cs);
        let co = a_s * mixed + (1.0 - a_s) * cb;
        out[c] = (co.clamp(0.0, 1.0) * 255.0).round() as u8;
    }
    out[3] = below[3];
    out
}
