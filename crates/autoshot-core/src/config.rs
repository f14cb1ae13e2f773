//! Engine configuration.
//!
//! Every tunable constant of the pipeline lives here so the page can load a
//! JSON object and override individual fields. Missing fields fall back to
//! the defaults via `#[serde(default)]`.

use serde::{Deserialize, Serialize};

use crate::adjustments::MAX_NOISE_TILE_SIZE;

/// Tunables for segmentation, redaction, crop and export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// JPEG quality used by export (1-100).
    pub jpeg_quality: u8,
    /// Initial segmentation threshold shown to the user.
    pub default_threshold: f32,
    /// Sample every Nth pixel along each border when estimating the background.
    pub border_sample_step: u32,
    /// Blur radii applied in sequence by the blur box, in pixels.
    pub blur_radii: Vec<f32>,
    /// Opacity of the white wash composited over a redacted region.
    pub redaction_overlay_alpha: f32,
    /// Seed for the procedural noise texture.
    pub noise_seed: u64,
    /// Edge length of the tileable noise texture.
    pub noise_tile_size: u32,
    /// Crop aspect ratio as (width, height).
    pub crop_aspect: (u32, u32),
    /// Minimum crop region edge in displayed pixels.
    pub crop_min_size: f64,
    /// Minimum blur region edge in displayed pixels.
    pub blur_min_size: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 95,
            default_threshold: 35.0,
            border_sample_step: 5,
            blur_radii: vec![5.0, 10.0, 15.0],
            redaction_overlay_alpha: 0.3,
            noise_seed: 0x5eed_ca75,
            noise_tile_size: 128,
            crop_aspect: (3, 2),
            crop_min_size: 50.0,
            blur_min_size: 20.0,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a copy with out-of-range values pulled back into range.
    pub fn validated(&self) -> Self {
        let defaults = Self::default();
        let finite_or = |v: f32, d: f32| if v.is_finite() { v } else { d };

        Self {
            jpeg_quality: self.jpeg_quality.clamp(1, 100),
            default_threshold: finite_or(self.default_threshold, defaults.default_threshold)
                .clamp(crate::segment::MIN_THRESHOLD, crate::segment::MAX_THRESHOLD),
            border_sample_step: self.border_sample_step.max(1),
            blur_radii: self
                .blur_radii
                .iter()
                .copied()
                .filter(|r| r.is_finite() && *r > 0.0)
                .collect(),
            redaction_overlay_alpha: finite_or(
                self.redaction_overlay_alpha,
                defaults.redaction_overlay_alpha,
            )
            .clamp(0.0, 1.0),
            noise_seed: self.noise_seed,
            noise_tile_size: self.noise_tile_size.clamp(8, MAX_NOISE_TILE_SIZE),
            crop_aspect: if self.crop_aspect.0 == 0 || self.crop_aspect.1 == 0 {
                defaults.crop_aspect
            } else {
                self.crop_aspect
            },
            crop_min_size: if self.crop_min_size.is_finite() {
                self.crop_min_size.max(1.0)
            } else {
                defaults.crop_min_size
            },
            blur_min_size: if self.blur_min_size.is_finite() {
                self.blur_min_size.max(1.0)
            } else {
                defaults.blur_min_size
            },
        }
    }

    /// Crop aspect ratio as width / height.
    pub fn crop_ratio(&self) -> f64 {
        self.crop_aspect.0 as f64 / self.crop_aspect.1.max(1) as f64
    }
}
