//! Raster buffer access layer.
//!
//! Everything the browser canvas provided for free lives here as plain
//! functions over an explicit [`RgbaBuffer`] value:
//!
//! - Pixel access, region extraction and replacement
//! - Source-over compositing and blend modes (multiply, overlay)
//! - Color types and hex parsing
//!
//! Buffers use straight (non-premultiplied) alpha, 4 bytes per pixel,
//! row-major. Operations never hold on to a buffer after they return.

mod blend;
mod buffer;
mod color;

pub use blend::{blend_atop, blend_over, source_over, BlendMode};
pub use buffer::{PixelRect, RgbaBuffer};
pub use color::{ParseColorError, Rgb, Rgba};
