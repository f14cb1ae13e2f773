//! Image decoding pipeline for Autoshot.
//!
//! This module provides functionality for:
//! - Sniffing the container format (JPEG, PNG, WebP) from magic bytes
//! - Decoding to an RGBA [`RgbaBuffer`](crate::raster::RgbaBuffer)
//! - Applying EXIF orientation, as the browser does for `<img>` elements
//!
//! # Architecture
//!
//! Decoding is synchronous and single-threaded. A failed decode returns an
//! error and never produces a partial buffer, so the editor's working image
//! is left untouched.
//!
//! # Examples
//!
//! ```ignore
//! use autoshot_core::decode::decode_image;
//!
//! let bytes = std::fs::read("car.jpg").unwrap();
//! let (source, buffer) = decode_image(&bytes).unwrap();
//! println!("Decoded {} {}x{}", source.mime_type(), buffer.width, buffer.height);
//! ```

mod reader;
mod types;

pub use reader::{decode_image, detect_format};
pub use types::{DecodeError, ImageFormat, Orientation, SourceImage};
