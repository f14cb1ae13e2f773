//! Autoshot WASM - WebAssembly bindings for Autoshot
//!
//! This crate exposes the autoshot-core engine to the photo editor page.
//!
//! # Module Structure
//!
//! - `editor` - The editing session (`JsEditor`) and its effects
//! - `adjustments` - Slider state, presets, CSS preview strings, bake
//! - `types` - WASM-compatible wrapper types for image data
//! - `decode` - Upload decoding (JPEG, PNG, WebP)
//! - `encode` - PNG and JPEG encoding
//!
//! Errors cross the boundary as string `JsValue`s.
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsEditor, set_log_level } from '@autoshot/wasm';
//!
//! await init();
//! set_log_level('debug');
//!
//! const editor = new JsEditor(undefined);
//! const effect = editor.load(new Uint8Array(await file.arrayBuffer()), file.name);
//! ```

use wasm_bindgen::prelude::*;

mod adjustments;
mod decode;
mod editor;
mod encode;
mod logger;
mod types;

// Re-export public types
pub use adjustments::{bake_image, preset, preset_names, Adjustments};
pub use decode::{decode_image, detect_mime};
pub use editor::{JsEditor, JsEffect};
pub use encode::{encode_jpeg, encode_png};
pub use types::JsImage;

/// Initialize the WASM module (called automatically on load).
///
/// Installs the panic hook and routes `log` output to the browser console
/// at `info` level.
#[wasm_bindgen(start)]
pub fn init() {
    logger::install(log::Level::Info);
    log::debug!("autoshot-wasm {} initialized", version());
}

/// Change the console log level (`"off"`, `"error"`, `"warn"`, `"info"`,
/// `"debug"`, `"trace"`).
#[wasm_bindgen]
pub fn set_log_level(level: &str) -> Result<(), JsValue> {
    let filter = logger::parse_level(level)
        .ok_or_else(|| JsValue::from_str(&format!("Unknown log level: {}", level)))?;
    logger::set_level(filter);
    Ok(())
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
