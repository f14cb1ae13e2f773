//! Autoshot Core - Vehicle photo enhancement engine
//!
//! This crate provides the image processing behind the Autoshot photo
//! editor: the adjustment pipeline with its live-preview descriptor and
//! destructive bake, background segmentation, license-plate redaction,
//! crop, background compositing and JPEG export.
//!
//! Everything operates on an explicit [`RgbaBuffer`]. The [`editor`] module
//! ties the tools together into a single session driven by [`reduce`].

pub mod adjustments;
pub mod composite;
pub mod config;
pub mod crop;
pub mod decode;
pub mod editor;
pub mod encode;
pub mod error;
pub mod export;
pub mod raster;
pub mod redact;
pub mod region;
pub mod segment;

pub use adjustments::{
    bake, builtin_presets, compute_filter_descriptor, find_preset, Adjustment, AdjustmentState,
    FilterDescriptor, FilterPreset,
};
pub use composite::apply_background_color;
pub use config::EngineConfig;
pub use crop::{apply_crop, CropError};
pub use editor::{reduce, Action, EditorError, EditorState, Effect, ImageHandle, Transition};
pub use error::{Error, Result};
pub use export::{export, export_file_name, DeliveryMethod, DownloadCapabilities, ExportedImage};
pub use raster::{PixelRect, Rgb, Rgba, RgbaBuffer};
pub use redact::apply_blur;
pub use region::{BlurRegion, CropRegion, DisplayGeometry, Rect};
pub use segment::{chroma_key, remove_background, Segmentation, SegmentationError, ThresholdPreview};
