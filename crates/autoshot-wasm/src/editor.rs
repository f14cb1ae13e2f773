//! Editor session WASM bindings.
//!
//! [`JsEditor`] owns an `EditorState` and feeds it actions through the core
//! reducer. Every call that changes what the page shows returns a
//! [`JsEffect`] describing what to display or download.
//!
//! # Example
//!
//! ```typescript
//! const editor = new JsEditor(undefined);
//! let effect = editor.load(new Uint8Array(await file.arrayBuffer()), file.name);
//! img.src = URL.createObjectURL(new Blob([effect.bytes], { type: effect.mime }));
//!
//! editor.remove_background();          // preview at the default threshold
//! editor.preview_threshold(48);        // scrub
//! effect = editor.commit_threshold(48); // replace the working image
//! URL.revokeObjectURL(urls.get(effect.previous));
//! ```

use autoshot_core::editor::{reduce, Action, ActiveTool, EditorState, Effect};
use autoshot_core::export::{DeliveryMethod, DownloadCapabilities};
use autoshot_core::raster::Rgb;
use autoshot_core::region::{DisplayGeometry, Rect};
use autoshot_core::adjustments::NoiseTexture;
use autoshot_core::encode::encode_png;
use autoshot_core::{Adjustment, EngineConfig};
use std::str::FromStr;
use wasm_bindgen::prelude::*;

use crate::adjustments::{bake_with, Adjustments};
use crate::logger;
use crate::types::{config_from_js, js_error, JsImage};

/// What the page should do after an editor call.
///
/// `kind` is one of `"imageReplaced"`, `"previewRendered"` or `"exported"`.
/// Fields that do not apply to the kind are `undefined`.
#[wasm_bindgen]
#[derive(Debug)]
pub struct JsEffect {
    kind: &'static str,
    bytes: Vec<u8>,
    mime: &'static str,
    previous: Option<f64>,
    current: Option<f64>,
    background: Option<String>,
    threshold: Option<f32>,
    transparent_pixels: Option<u32>,
    file_name: Option<String>,
    delivery: Option<&'static str>,
}

#[wasm_bindgen]
impl JsEffect {
    #[wasm_bindgen(getter)]
    pub fn kind(&self) -> String {
        self.kind.to_string()
    }

    /// Encoded file bytes (copy).
    #[wasm_bindgen(getter)]
    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn mime(&self) -> String {
        self.mime.to_string()
    }

    /// Handle of the superseded working image; revoke its object URL.
    #[wasm_bindgen(getter)]
    pub fn previous(&self) -> Option<f64> {
        self.previous
    }

    #[wasm_bindgen(getter)]
    pub fn current(&self) -> Option<f64> {
        self.current
    }

    /// Detected background color as `#rrggbb`.
    #[wasm_bindgen(getter)]
    pub fn background(&self) -> Option<String> {
        self.background.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn threshold(&self) -> Option<f32> {
        self.threshold
    }

    #[wasm_bindgen(getter)]
    pub fn transparent_pixels(&self) -> Option<u32> {
        self.transparent_pixels
    }

    #[wasm_bindgen(getter)]
    pub fn file_name(&self) -> Option<String> {
        self.file_name.clone()
    }

    /// `"anchor"` or `"openInNewTab"`.
    #[wasm_bindgen(getter)]
    pub fn delivery(&self) -> Option<String> {
        self.delivery.map(str::to_string)
    }
}

impl JsEffect {
    fn empty(kind: &'static str, bytes: Vec<u8>, mime: &'static str) -> Self {
        Self {
            kind,
            bytes,
            mime,
            previous: None,
            current: None,
            background: None,
            threshold: None,
            transparent_pixels: None,
            file_name: None,
            delivery: None,
        }
    }
}

impl From<Effect> for JsEffect {
    fn from(effect: Effect) -> Self {
        match effect {
            Effect::ImageReplaced {
                previous,
                current,
                encoded,
                mime,
            } => Self {
                previous: previous.map(|h| h.0 as f64),
                current: Some(current.0 as f64),
                ..Self::empty("imageReplaced", encoded, mime)
            },
            Effect::PreviewRendered {
                encoded,
                background,
                threshold,
                transparent_pixels,
            } => Self {
                background: Some(background.to_hex()),
                threshold: Some(threshold),
                transparent_pixels: Some(transparent_pixels.min(u32::MAX as usize) as u32),
                ..Self::empty("previewRendered", encoded, "image/png")
            },
            Effect::Exported { image, delivery } => Self {
                file_name: Some(image.file_name),
                delivery: Some(match delivery {
                    DeliveryMethod::Anchor => "anchor",
                    DeliveryMethod::OpenInNewTab => "openInNewTab",
                }),
                ..Self::empty("exported", image.bytes, image.mime)
            },
        }
    }
}

/// One editing session.
#[wasm_bindgen]
pub struct JsEditor {
    state: EditorState,
}

#[wasm_bindgen]
impl JsEditor {
    /// Create an editor. `config` is an optional partial `EngineConfig`
    /// object; missing fields take their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<JsEditor, JsValue> {
        Ok(Self::with_config(config_from_js(config)?))
    }

    /// Decode an upload and make it the working image.
    pub fn load(&mut self, bytes: Vec<u8>, file_name: Option<String>) -> Result<JsEffect, JsValue> {
        self.effect(Action::Load { bytes, file_name })
    }

    /// Set a slider by name; the value is clamped.
    pub fn set_adjustment(&mut self, name: &str, value: f32) -> Result<(), JsValue> {
        let knob = Adjustment::from_str(name).map_err(js_error)?;
        self.quiet(Action::SetAdjustment(knob, value))
    }

    pub fn set_flip_x(&mut self, flip: bool) -> Result<(), JsValue> {
        self.quiet(Action::SetFlipX(flip))
    }

    pub fn set_flip_y(&mut self, flip: bool) -> Result<(), JsValue> {
        self.quiet(Action::SetFlipY(flip))
    }

    pub fn rotate_left(&mut self) -> Result<(), JsValue> {
        self.quiet(Action::RotateLeft)
    }

    pub fn rotate_right(&mut self) -> Result<(), JsValue> {
        self.quiet(Action::RotateRight)
    }

    /// Replace every slider with a built-in preset.
    pub fn apply_preset(&mut self, name: &str) -> Result<(), JsValue> {
        self.quiet(Action::ApplyPreset(name.to_string()))
    }

    pub fn reset(&mut self) -> Result<(), JsValue> {
        self.quiet(Action::ResetAdjustments)
    }

    /// Copy of the current sliders.
    pub fn adjustments(&self) -> Adjustments {
        Adjustments::from_state(self.state.adjustments.clone())
    }

    pub fn css_filter(&self) -> String {
        self.state.descriptor().css_filter()
    }

    pub fn css_transform(&self) -> String {
        self.state.descriptor().css_transform()
    }

    /// Detect the background and render a preview at the default threshold.
    pub fn remove_background(&mut self) -> Result<JsEffect, JsValue> {
        self.effect(Action::BeginSegmentation)
    }

    pub fn preview_threshold(&mut self, threshold: f32) -> Result<JsEffect, JsValue> {
        self.effect(Action::PreviewThreshold(threshold))
    }

    pub fn commit_threshold(&mut self, threshold: f32) -> Result<JsEffect, JsValue> {
        self.effect(Action::CommitSegmentation(threshold))
    }

    pub fn cancel_segmentation(&mut self) -> Result<(), JsValue> {
        self.quiet(Action::CancelSegmentation)
    }

    /// Remove a solid green or blue backdrop.
    pub fn chroma_key(&mut self) -> Result<JsEffect, JsValue> {
        self.effect(Action::ChromaKeyFallback)
    }

    /// Composite the working image over a `#rrggbb` or `#rgb` color.
    pub fn apply_background_color(&mut self, hex: &str) -> Result<JsEffect, JsValue> {
        let color = Rgb::from_hex(hex).map_err(js_error)?;
        self.effect(Action::ApplyBackgroundColor(color))
    }

    /// Open the crop box for an image shown at the given size. Returns the
    /// box as `{ x, y, width, height }` in displayed pixels.
    pub fn start_crop(&mut self, displayed_width: f64, displayed_height: f64) -> Result<JsValue, JsValue> {
        let geometry = self.geometry(displayed_width, displayed_height)?;
        self.quiet(Action::StartCrop(geometry))?;
        self.tool_rect()
    }

    pub fn move_crop(&mut self, x: f64, y: f64) -> Result<JsValue, JsValue> {
        self.quiet(Action::MoveCrop { x, y })?;
        self.tool_rect()
    }

    pub fn resize_crop(&mut self, width: f64, height: f64) -> Result<JsValue, JsValue> {
        self.quiet(Action::ResizeCrop { width, height })?;
        self.tool_rect()
    }

    pub fn apply_crop(&mut self) -> Result<JsEffect, JsValue> {
        self.effect(Action::ApplyCrop)
    }

    pub fn cancel_crop(&mut self) -> Result<(), JsValue> {
        self.quiet(Action::CancelCrop)
    }

    /// Open the blur box. Returns the box like [`JsEditor::start_crop`].
    pub fn start_blur(&mut self, displayed_width: f64, displayed_height: f64) -> Result<JsValue, JsValue> {
        let geometry = self.geometry(displayed_width, displayed_height)?;
        self.quiet(Action::StartBlur(geometry))?;
        self.tool_rect()
    }

    pub fn move_blur(&mut self, x: f64, y: f64) -> Result<JsValue, JsValue> {
        self.quiet(Action::MoveBlur { x, y })?;
        self.tool_rect()
    }

    pub fn resize_blur(&mut self, width: f64, height: f64) -> Result<JsValue, JsValue> {
        self.quiet(Action::ResizeBlur { width, height })?;
        self.tool_rect()
    }

    pub fn apply_blur(&mut self) -> Result<JsEffect, JsValue> {
        self.effect(Action::ApplyBlur)
    }

    pub fn cancel_blur(&mut self) -> Result<(), JsValue> {
        self.quiet(Action::CancelBlur)
    }

    /// Bake and encode the final JPEG.
    ///
    /// Pass what the browser supports; the delivery path is chosen from
    /// these, never from the user agent.
    pub fn export(
        &mut self,
        supports_download_attribute: bool,
        can_open_blob_urls: bool,
    ) -> Result<JsEffect, JsValue> {
        self.effect(Action::Export(DownloadCapabilities {
            supports_download_attribute,
            can_open_blob_urls,
        }))
    }

    /// The noise overlay tile as PNG bytes, drawn repeated under the
    /// preview's noise layer. Uses the editor's seed, so the preview grain
    /// matches the exported grain.
    pub fn noise_texture(&self) -> Result<Vec<u8>, JsValue> {
        let config = self.state.config();
        let tile = NoiseTexture::generate(config.noise_seed, config.noise_tile_size);
        encode_png(&tile.to_buffer()).map_err(js_error)
    }

    /// Bake `adjustments` into a copy of `image` with this editor's settings.
    pub fn bake_image(&self, image: &JsImage, adjustments: &Adjustments) -> JsImage {
        bake_with(image, adjustments, self.state.config())
    }

    /// Copy of the working image pixels, if one is loaded.
    pub fn working_image(&self) -> Option<JsImage> {
        self.state
            .working
            .as_ref()
            .map(|w| JsImage::from_buffer(w.buffer.clone()))
    }

    #[wasm_bindgen(getter)]
    pub fn has_transparency(&self) -> bool {
        self.state.working.as_ref().is_some_and(|w| w.has_transparency)
    }

    #[wasm_bindgen(getter)]
    pub fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    /// Name of the open tool: `"none"`, `"segmentation"`, `"crop"` or `"blur"`.
    #[wasm_bindgen(getter)]
    pub fn active_tool(&self) -> String {
        self.state.tool.name().to_string()
    }
}

impl JsEditor {
    pub(crate) fn with_config(config: EngineConfig) -> Self {
        Self {
            state: EditorState::new(config),
        }
    }

    fn dispatch(&mut self, action: Action) -> Result<Option<Effect>, JsValue> {
        let started = logger::now_ms();
        let destructive = action.is_destructive();
        let transition = reduce(&self.state, action).map_err(js_error)?;
        if destructive {
            log::debug!("Destructive step took {:.1} ms", logger::now_ms() - started);
        }
        self.state = transition.state;
        Ok(transition.effect)
    }

    fn effect(&mut self, action: Action) -> Result<JsEffect, JsValue> {
        match self.dispatch(action)? {
            Some(effect) => Ok(effect.into()),
            None => Err(JsValue::from_str("Action produced no effect")),
        }
    }

    fn quiet(&mut self, action: Action) -> Result<(), JsValue> {
        self.dispatch(action).map(|_| ())
    }

    fn geometry(&self, displayed_width: f64, displayed_height: f64) -> Result<DisplayGeometry, JsValue> {
        let working = self.state.working().map_err(js_error)?;
        Ok(DisplayGeometry::new(
            displayed_width,
            displayed_height,
            working.width(),
            working.height(),
        ))
    }

    fn tool_rect(&self) -> Result<JsValue, JsValue> {
        let rect: Rect = match &self.state.tool {
            ActiveTool::Crop { region, .. } => region.rect(),
            ActiveTool::Blur { region, .. } => region.rect(),
            other => return Err(JsValue::from_str(&format!("No box for {}", other.name()))),
        };
        serde_wasm_bindgen::to_value(&rect).map_err(js_error)
    }
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_errors_cross_as_strings() {
        let mut editor = JsEditor::new(JsValue::UNDEFINED).unwrap();
        let err = editor.chroma_key().unwrap_err();
        assert_eq!(err.as_string().as_deref(), Some("No image loaded"));
        assert!(editor.set_adjustment("sparkle", 1.0).is_err());
        assert!(editor.apply_background_color("blue").is_err());
    }

    #[wasm_bindgen_test]
    fn test_config_object() {
        let config = serde_wasm_bindgen::to_value(&EngineConfig {
            jpeg_quality: 80,
            ..EngineConfig::default()
        })
        .unwrap();
        assert!(JsEditor::new(config).is_ok());
    }
}
