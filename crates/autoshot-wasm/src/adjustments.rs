//! Adjustment WASM bindings.
//!
//! This module provides JavaScript bindings for the adjustment state, the
//! preset list and the CSS preview strings, plus a standalone bake.

use std::str::FromStr;

use crate::types::{config_from_js, js_error, JsImage};
use autoshot_core::adjustments::{
    bake, builtin_presets, compute_filter_descriptor, find_preset, Adjustment, AdjustmentState,
    OverlayLayer,
};
use autoshot_core::EngineConfig;
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Adjustment sliders wrapper for JavaScript
#[wasm_bindgen]
pub struct Adjustments {
    inner: AdjustmentState,
}

#[wasm_bindgen]
impl Adjustments {
    /// Create new adjustments with default values
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: AdjustmentState::default(),
        }
    }

    /// Read a slider by name (`"brightness"`, `"hueRotate"`, ...)
    pub fn get(&self, name: &str) -> Result<f32, JsValue> {
        let knob = Adjustment::from_str(name).map_err(js_error)?;
        Ok(self.inner.get(knob))
    }

    /// Set a slider by name. The value is clamped into its range.
    pub fn set(&mut self, name: &str, value: f32) -> Result<(), JsValue> {
        let knob = Adjustment::from_str(name).map_err(js_error)?;
        self.inner.set(knob, value);
        Ok(())
    }

    #[wasm_bindgen(getter)]
    pub fn flip_x(&self) -> bool {
        self.inner.flip_x
    }

    #[wasm_bindgen(setter)]
    pub fn set_flip_x(&mut self, value: bool) {
        self.inner.flip_x = value;
    }

    #[wasm_bindgen(getter)]
    pub fn flip_y(&self) -> bool {
        self.inner.flip_y
    }

    #[wasm_bindgen(setter)]
    pub fn set_flip_y(&mut self, value: bool) {
        self.inner.flip_y = value;
    }

    pub fn rotate_left(&mut self) {
        self.inner.rotate_left();
    }

    pub fn rotate_right(&mut self) {
        self.inner.rotate_right();
    }

    /// Check if all adjustments are at default values
    pub fn is_default(&self) -> bool {
        self.inner.is_default()
    }

    pub fn reset(&mut self) {
        self.inner = self.inner.reset();
    }

    /// CSS `filter` value for the live preview
    pub fn css_filter(&self) -> String {
        compute_filter_descriptor(&self.inner).css_filter()
    }

    /// CSS `transform` value for the live preview
    pub fn css_transform(&self) -> String {
        compute_filter_descriptor(&self.inner).css_transform()
    }

    /// Overlay layers for the live preview, bottom to top.
    ///
    /// Each entry is `{ blendMode, opacity, background?, backdropFilter? }`.
    pub fn overlays(&self) -> Result<JsValue, JsValue> {
        let layers: Vec<OverlayCss> = compute_filter_descriptor(&self.inner)
            .overlays
            .iter()
            .map(OverlayCss::from)
            .collect();
        serde_wasm_bindgen::to_value(&layers).map_err(js_error)
    }

    /// Serialize to a plain object for storage
    pub fn to_json(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner).map_err(js_error)
    }

    /// Deserialize from a plain object; missing fields take their defaults
    pub fn from_json(value: JsValue) -> Result<Adjustments, JsValue> {
        let inner: AdjustmentState = serde_wasm_bindgen::from_value(value).map_err(js_error)?;
        Ok(Self {
            inner: inner.clamped(),
        })
    }
}

impl Default for Adjustments {
    fn default() -> Self {
        Self::new()
    }
}

impl Adjustments {
    pub(crate) fn inner(&self) -> &AdjustmentState {
        &self.inner
    }

    pub(crate) fn from_state(inner: AdjustmentState) -> Self {
        Self { inner }
    }
}

/// CSS description of one overlay layer.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OverlayCss {
    blend_mode: &'static str,
    opacity: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    background: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    backdrop_filter: Option<String>,
}

impl From<&OverlayLayer> for OverlayCss {
    fn from(layer: &OverlayLayer) -> Self {
        Self {
            blend_mode: layer.css_blend_mode(),
            opacity: layer.opacity(),
            background: layer.css_background(),
            backdrop_filter: layer.css_backdrop_filter(),
        }
    }
}

/// Names of the built-in presets, in display order.
#[wasm_bindgen]
pub fn preset_names() -> Vec<String> {
    builtin_presets().into_iter().map(|p| p.name.to_string()).collect()
}

/// Adjustments of a built-in preset (case-insensitive name).
#[wasm_bindgen]
pub fn preset(name: &str) -> Result<Adjustments, JsValue> {
    find_preset(name)
        .map(|p| Adjustments::from_state(p.adjustments))
        .ok_or_else(|| JsValue::from_str(&format!("Unknown preset: {}", name)))
}

/// Bake adjustments into a new image.
///
/// The source image is not modified. Rotations by 90 or 270 degrees swap
/// the output dimensions. `config` is an optional partial `EngineConfig`;
/// pass the editor's config so the noise grain matches its export.
///
/// # Example (TypeScript)
/// ```typescript
/// const adj = new Adjustments();
/// adj.set("brightness", 120);
/// adj.rotate_right();
///
/// const baked = bake_image(sourceImage, adj, { noise_seed: 42 });
/// ```
#[wasm_bindgen]
pub fn bake_image(image: &JsImage, adjustments: &Adjustments, config: JsValue) -> Result<JsImage, JsValue> {
    let config = config_from_js(config)?.validated();
    Ok(bake_with(image, adjustments, &config))
}

pub(crate) fn bake_with(image: &JsImage, adjustments: &Adjustments, config: &EngineConfig) -> JsImage {
    JsImage::from_buffer(bake(&image.to_buffer(), adjustments.inner(), config))
}
