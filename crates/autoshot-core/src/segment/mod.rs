//! Background segmentation.
//!
//! Two heuristics, both producing a copy of the input with background
//! pixels made fully transparent:
//!
//! - **Edge-sampled**: estimate the background from the border ring, then
//!   drop every pixel closer than a threshold in RGB space
//! - **Chroma key**: drop pixels dominated by green or blue; a degraded
//!   mode for solid green or blue backdrops
//!
//! The threshold can be scrubbed through a [`ThresholdPreview`], which keeps
//! its own copy of the original pixels and never touches the working image.

mod chroma;
mod edge;

pub use chroma::{chroma_key, is_chroma_background};
pub use edge::{
    classify, detect_background_color, remove_background, Segmentation, ThresholdPreview,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lowest threshold the slider offers.
pub const MIN_THRESHOLD: f32 = 10.0;
/// Highest threshold the slider offers.
pub const MAX_THRESHOLD: f32 = 100.0;
/// Threshold shown when segmentation starts.
pub const DEFAULT_THRESHOLD: f32 = 35.0;

/// Clamp a user threshold into the slider range. NaN maps to the default.
pub fn clamp_threshold(threshold: f32) -> f32 {
    if threshold.is_nan() {
        return DEFAULT_THRESHOLD;
    }
    threshold.clamp(MIN_THRESHOLD, MAX_THRESHOLD)
}

/// How a segmentation was produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "camelCase")]
pub enum SegmentationMethod {
    EdgeSampled { threshold: f32 },
    ChromaKey,
}

/// Errors that can occur during segmentation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SegmentationError {
    /// The image has no pixels
    #[error("Cannot segment an empty image")]
    EmptyImage,

    /// No border pixels could be sampled
    #[error("No border pixels to sample")]
    NoBorderSamples,
}
