//! Photo adjustments for the enhancer.
//!
//! An [`AdjustmentState`] is a flat record of slider values. It is turned
//! into a [`FilterDescriptor`] that drives both render paths:
//!
//! - **Preview**: [`FilterDescriptor::css_filter`], [`FilterDescriptor::css_transform`]
//!   and one CSS layer per [`OverlayLayer`]
//! - **Bake**: [`bake`] writes the same effect into pixels
//!
//! Preview and bake follow the same ordering, but the browser composites the
//! CSS layers on its own, so the two can drift by a few levels per channel.

mod bake;
mod descriptor;
mod filters;
mod overlay;
mod presets;
mod state;
mod transform;

pub use bake::{bake, bake_descriptor};
pub use descriptor::{
    compute_filter_descriptor, ColorFilter, FilterDescriptor, OverlayLayer, Transform,
    COOL_COLOR, GREEN_COLOR, MAGENTA_COLOR, WARM_COLOR,
};
pub use filters::apply_color_filters;
pub use overlay::{apply_overlay, apply_overlays, NoiseTexture, MAX_NOISE_TILE_SIZE};
pub use presets::{builtin_presets, find_preset, FilterPreset};
pub use state::{Adjustment, AdjustmentState, UnknownAdjustment};
pub use transform::{apply_transform, compute_rotated_bounds, map_rect};

pub(crate) use filters::apply_blur;
