//! The editor's transition function.

use super::{Action, ActiveTool, EditorError, EditorState, Effect, Transition};
use crate::adjustments::find_preset;
use crate::composite::apply_background_color;
use crate::crop::{apply_crop, fit_rounding};
use crate::decode::{decode_image, ImageFormat};
use crate::encode::{encode_as, encode_png};
use crate::export::{export, DeliveryMethod, DownloadCapabilities};
use crate::raster::{PixelRect, RgbaBuffer};
use crate::redact::apply_blur;
use crate::region::{BlurRegion, CropRegion, DisplayGeometry};
use crate::segment::{chroma_key, clamp_threshold, ThresholdPreview};

/// Apply `action` to a copy of `state`.
///
/// On error the caller keeps `state`; nothing is partially applied.
pub fn reduce(state: &EditorState, action: Action) -> Result<Transition, EditorError> {
    let mut next = state.clone();

    let token = if action.is_destructive() {
        Some(next.begin_operation()?)
    } else {
        None
    };
    let effect = apply(&mut next, action)?;
    if let Some(token) = token {
        next.finish_operation(token);
    }

    Ok(Transition { state: next, effect })
}

fn apply(state: &mut EditorState, action: Action) -> Result<Option<Effect>, EditorError> {
    match action {
        Action::Load { bytes, file_name } => return load(state, bytes, file_name).map(Some),

        Action::SetAdjustment(knob, value) => state.adjustments.set(knob, value),
        Action::SetFlipX(flip) => state.adjustments.flip_x = flip,
        Action::SetFlipY(flip) => state.adjustments.flip_y = flip,
        Action::RotateLeft => state.adjustments.rotate_left(),
        Action::RotateRight => state.adjustments.rotate_right(),
        Action::ApplyPreset(name) => {
            let preset = find_preset(&name).ok_or(EditorError::UnknownPreset(name))?;
            state.adjustments = preset.adjustments;
        }
        Action::ResetAdjustments => state.adjustments = state.adjustments.reset(),

        Action::BeginSegmentation => return begin_segmentation(state).map(Some),
        Action::PreviewThreshold(threshold) => return preview_threshold(state, threshold).map(Some),
        Action::CommitSegmentation(threshold) => return commit_segmentation(state, threshold).map(Some),
        Action::CancelSegmentation => cancel(state, "segmentation"),
        Action::ChromaKeyFallback => {
            let keyed = chroma_key(&state.working()?.buffer);
            return replace_segmented(state, keyed).map(Some);
        }
        Action::ApplyBackgroundColor(color) => {
            let composited = apply_background_color(&state.working()?.buffer, color);
            return replace(state, composited, ImageFormat::Png).map(Some);
        }

        Action::StartCrop(geometry) => {
            check_geometry(state, &geometry)?;
            let region = CropRegion::initial(&geometry, state.config());
            state.tool = ActiveTool::Crop { region, geometry };
        }
        Action::MoveCrop { x, y } => match &mut state.tool {
            ActiveTool::Crop { region, geometry } => *region = region.moved_to(x, y, geometry),
            _ => return Err(EditorError::NoActiveTool("crop")),
        },
        Action::ResizeCrop { width, height } => match &mut state.tool {
            ActiveTool::Crop { region, geometry } => *region = region.resized_to(width, height, geometry),
            _ => return Err(EditorError::NoActiveTool("crop")),
        },
        Action::ApplyCrop => return commit_crop(state).map(Some),
        Action::CancelCrop => cancel(state, "crop"),

        Action::StartBlur(geometry) => {
            check_geometry(state, &geometry)?;
            let region = BlurRegion::initial(&geometry, state.config());
            state.tool = ActiveTool::Blur { region, geometry };
        }
        Action::MoveBlur { x, y } => match &mut state.tool {
            ActiveTool::Blur { region, geometry } => *region = region.moved_to(x, y, geometry),
            _ => return Err(EditorError::NoActiveTool("blur")),
        },
        Action::ResizeBlur { width, height } => match &mut state.tool {
            ActiveTool::Blur { region, geometry } => *region = region.resized_to(width, height, geometry),
            _ => return Err(EditorError::NoActiveTool("blur")),
        },
        Action::ApplyBlur => return commit_blur(state).map(Some),
        Action::CancelBlur => cancel(state, "blur"),

        Action::Export(capabilities) => return export_working(state, capabilities).map(Some),
    }
    Ok(None)
}

fn load(state: &mut EditorState, bytes: Vec<u8>, file_name: Option<String>) -> Result<Effect, EditorError> {
    let (source, buffer) = decode_image(&bytes)?;
    let format = source.format;

    state.source = Some(source);
    state.file_name = file_name;
    state.adjustments = state.adjustments.reset();
    state.committed_blurs.clear();

    // The page already holds the uploaded bytes; no need to re-encode them.
    Ok(state.replace_working(buffer, format, bytes))
}

/// Encode `buffer` and make it the working image.
fn replace(state: &mut EditorState, buffer: RgbaBuffer, format: ImageFormat) -> Result<Effect, EditorError> {
    let encoded = encode_as(&buffer, format, state.config().jpeg_quality)?;
    Ok(state.replace_working(buffer, format, encoded))
}

/// Replace the working image with a segmentation result. The result counts
/// as transparent even when no pixel matched.
fn replace_segmented(state: &mut EditorState, buffer: RgbaBuffer) -> Result<Effect, EditorError> {
    let effect = replace(state, buffer, ImageFormat::Png)?;
    if let Some(working) = state.working.as_mut() {
        working.has_transparency = true;
    }
    Ok(effect)
}

fn begin_segmentation(state: &mut EditorState) -> Result<Effect, EditorError> {
    let preview = ThresholdPreview::new(&state.working()?.buffer, state.config().border_sample_step)?;
    let threshold = clamp_threshold(state.config().default_threshold);
    log::debug!("Detected background {}", preview.background().to_hex());

    let effect = render_preview(&preview, threshold)?;
    state.tool = ActiveTool::Segmentation { preview, threshold };
    Ok(effect)
}

fn preview_threshold(state: &mut EditorState, value: f32) -> Result<Effect, EditorError> {
    match &mut state.tool {
        ActiveTool::Segmentation { preview, threshold } => {
            *threshold = clamp_threshold(value);
            render_preview(preview, *threshold)
        }
        _ => Err(EditorError::NoActiveTool("segmentation")),
    }
}

fn render_preview(preview: &ThresholdPreview, threshold: f32) -> Result<Effect, EditorError> {
    let segmentation = preview.preview(threshold);
    Ok(Effect::PreviewRendered {
        encoded: encode_png(&segmentation.image)?,
        background: segmentation.background,
        threshold,
        transparent_pixels: segmentation.transparent_pixels,
    })
}

fn commit_segmentation(state: &mut EditorState, threshold: f32) -> Result<Effect, EditorError> {
    match std::mem::take(&mut state.tool) {
        ActiveTool::Segmentation { preview, .. } => {
            let segmentation = preview.commit(threshold);
            replace_segmented(state, segmentation.image)
        }
        _ => Err(EditorError::NoActiveTool("segmentation")),
    }
}

fn commit_crop(state: &mut EditorState) -> Result<Effect, EditorError> {
    let (region, geometry) = match std::mem::take(&mut state.tool) {
        ActiveTool::Crop { region, geometry } => (region, geometry),
        _ => return Err(EditorError::NoActiveTool("crop")),
    };
    let working = state.working()?;
    let (width, height, format) = (working.width(), working.height(), working.format);
    let cropped = apply_crop(&working.buffer, &region.rect(), &geometry)?;

    let natural = geometry.to_natural(&region.rect());
    let bounds = fit_rounding(natural, width, height).unwrap_or(natural);
    state.committed_blurs = state
        .committed_blurs
        .iter()
        .filter_map(|&blur| translate_into(blur, bounds))
        .collect();

    replace(state, cropped, format)
}

fn commit_blur(state: &mut EditorState) -> Result<Effect, EditorError> {
    let (region, geometry) = match std::mem::take(&mut state.tool) {
        ActiveTool::Blur { region, geometry } => (region, geometry),
        _ => return Err(EditorError::NoActiveTool("blur")),
    };
    let working = state.working()?;
    let redacted = apply_blur(&working.buffer, &region.rect(), &geometry, state.config());

    let natural = geometry
        .to_natural(&region.rect())
        .clamp_to(working.width(), working.height());
    if !natural.is_empty() {
        state.committed_blurs.push(natural);
    }

    replace(state, redacted, ImageFormat::Png)
}

fn export_working(state: &EditorState, capabilities: DownloadCapabilities) -> Result<Effect, EditorError> {
    let working = state.working()?;
    let image = export(
        &working.buffer,
        &state.adjustments,
        &state.committed_blurs,
        state.config(),
    )?
    .named(state.file_name.as_deref());

    Ok(Effect::Exported {
        image,
        delivery: DeliveryMethod::select(capabilities),
    })
}

fn cancel(state: &mut EditorState, tool: &'static str) {
    if state.tool.name() == tool {
        state.tool = ActiveTool::None;
    }
}

fn check_geometry(state: &EditorState, geometry: &DisplayGeometry) -> Result<(), EditorError> {
    let working = state.working()?;
    if geometry.is_valid()
        && geometry.natural_width == working.width()
        && geometry.natural_height == working.height()
    {
        return Ok(());
    }
    Err(EditorError::GeometryMismatch {
        displayed_width: geometry.displayed_width,
        displayed_height: geometry.displayed_height,
        natural_width: geometry.natural_width,
        natural_height: geometry.natural_height,
        width: working.width(),
        height: working.height(),
    })
}

/// Intersect `rect` with `bounds` and express it relative to `bounds`.
fn translate_into(rect: PixelRect, bounds: PixelRect) -> Option<PixelRect> {
    let x0 = rect.x.max(bounds.x);
    let y0 = rect.y.max(bounds.y);
    let x1 = (rect.x + rect.width).min(bounds.x + bounds.width);
    let y1 = (rect.y + rect.height).min(bounds.y + bounds.height);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(PixelRect::new(x0 - bounds.x, y0 - bounds.y, x1 - x0, y1 - y0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjustments::Adjustment;
    use crate::raster::{Rgb, Rgba};

    /// White 100x100 PNG with a dark 40x40 square in the middle.
    fn upload() -> Vec<u8> {
        let mut img = RgbaBuffer::filled(100, 100, Rgba::new(255, 255, 255, 255));
        img.fill_rect_over(PixelRect::new(30, 30, 40, 40), Rgba::new(20, 30, 40, 255));
        encode_png(&img).unwrap()
    }

    fn step(state: &EditorState, action: Action) -> (EditorState, Option<Effect>) {
        let t = reduce(state, action).unwrap();
        (t.state, t.effect)
    }

    fn loaded() -> EditorState {
        let action = Action::Load {
            bytes: upload(),
            file_name: Some("sedan.png".to_string()),
        };
        step(&EditorState::default(), action).0
    }

    fn geometry() -> DisplayGeometry {
        DisplayGeometry::unscaled(100, 100)
    }

    #[test]
    fn test_load_replaces_working_image() {
        let bytes = upload();
        let (state, effect) = step(
            &EditorState::default(),
            Action::Load {
                bytes: bytes.clone(),
                file_name: None,
            },
        );
        let working = state.working().unwrap();
        assert_eq!((working.width(), working.height()), (100, 100));
        assert_eq!(working.format, ImageFormat::Png);
        assert!(!working.has_transparency);
        assert_eq!(
            effect,
            Some(Effect::ImageReplaced {
                previous: None,
                current: working.handle,
                encoded: bytes,
                mime: "image/png",
            })
        );
    }

    #[test]
    fn test_reload_reports_previous_handle() {
        let first = loaded();
        let first_handle = first.working().unwrap().handle;
        let (second, effect) = step(
            &first,
            Action::Load {
                bytes: upload(),
                file_name: None,
            },
        );
        match effect {
            Some(Effect::ImageReplaced { previous, current, .. }) => {
                assert_eq!(previous, Some(first_handle));
                assert_eq!(current, second.working().unwrap().handle);
                assert!(current > first_handle);
            }
            other => panic!("unexpected effect: {:?}", other),
        }
    }

    #[test]
    fn test_load_rejects_garbage() {
        let err = reduce(
            &EditorState::default(),
            Action::Load {
                bytes: vec![1, 2, 3, 4],
                file_name: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, EditorError::Decode(_)));
    }

    #[test]
    fn test_adjustments_without_image() {
        let (state, effect) = step(&EditorState::default(), Action::SetAdjustment(Adjustment::Contrast, 500.0));
        assert!(effect.is_none());
        assert_eq!(state.adjustments.contrast, 200.0);

        let (state, _) = step(&state, Action::SetFlipX(true));
        let (state, _) = step(&state, Action::RotateRight);
        assert!(state.adjustments.flip_x);
        assert_eq!(state.adjustments.rotation_degrees(), 90);

        let (state, _) = step(&state, Action::ResetAdjustments);
        assert!(state.adjustments.is_default());
    }

    #[test]
    fn test_apply_preset() {
        let (state, _) = step(&EditorState::default(), Action::ApplyPreset("noir".to_string()));
        assert_eq!(state.adjustments, find_preset("Noir").unwrap().adjustments);

        let err = reduce(&state, Action::ApplyPreset("Sparkle".to_string())).unwrap_err();
        assert!(matches!(err, EditorError::UnknownPreset(name) if name == "Sparkle"));
    }

    #[test]
    fn test_destructive_action_needs_image() {
        let err = reduce(&EditorState::default(), Action::ChromaKeyFallback).unwrap_err();
        assert!(matches!(err, EditorError::NoImage));
    }

    #[test]
    fn test_segmentation_flow() {
        let state = loaded();
        let (state, effect) = step(&state, Action::BeginSegmentation);
        match effect {
            Some(Effect::PreviewRendered { background, threshold, .. }) => {
                assert_eq!(background, Rgb::WHITE);
                assert_eq!(threshold, 35.0);
            }
            other => panic!("unexpected effect: {:?}", other),
        }

        let (state, effect) = step(&state, Action::PreviewThreshold(500.0));
        match effect {
            Some(Effect::PreviewRendered { threshold, transparent_pixels, .. }) => {
                assert_eq!(threshold, 100.0);
                assert_eq!(transparent_pixels, 100 * 100 - 40 * 40);
            }
            other => panic!("unexpected effect: {:?}", other),
        }
        // Previewing leaves the working image alone
        assert!(!state.working().unwrap().has_transparency);

        let (state, effect) = step(&state, Action::CommitSegmentation(35.0));
        assert!(matches!(effect, Some(Effect::ImageReplaced { mime: "image/png", .. })));
        let working = state.working().unwrap();
        assert!(working.has_transparency);
        assert_eq!(working.format, ImageFormat::Png);
        assert_eq!(working.buffer.transparent_count(), 100 * 100 - 40 * 40);
        assert_eq!(state.tool, ActiveTool::None);
    }

    #[test]
    fn test_commit_without_preview_fails() {
        let err = reduce(&loaded(), Action::CommitSegmentation(35.0)).unwrap_err();
        assert!(matches!(err, EditorError::NoActiveTool("segmentation")));
    }

    #[test]
    fn test_cancel_segmentation() {
        let (state, _) = step(&loaded(), Action::BeginSegmentation);
        let (state, effect) = step(&state, Action::CancelSegmentation);
        assert!(effect.is_none());
        assert_eq!(state.tool, ActiveTool::None);
    }

    #[test]
    fn test_background_color_removes_transparency() {
        let (state, _) = step(&loaded(), Action::BeginSegmentation);
        let (state, _) = step(&state, Action::CommitSegmentation(35.0));
        assert!(state.working().unwrap().has_transparency);

        let (state, effect) = step(&state, Action::ApplyBackgroundColor(Rgb::new(0, 90, 200)));
        assert!(matches!(effect, Some(Effect::ImageReplaced { mime: "image/png", .. })));
        let working = state.working().unwrap();
        assert!(!working.has_transparency);
        assert_eq!(working.buffer.pixel(0, 0), Some(Rgba::new(0, 90, 200, 255)));
    }

    #[test]
    fn test_commit_without_matches_still_marks_transparency() {
        // Half black, half white: the mean border color is mid gray and no
        // pixel is within the threshold of it
        let mut img = RgbaBuffer::filled(40, 40, Rgba::new(255, 255, 255, 255));
        img.fill_rect_over(PixelRect::new(0, 0, 20, 40), Rgba::new(0, 0, 0, 255));
        let action = Action::Load {
            bytes: encode_png(&img).unwrap(),
            file_name: None,
        };
        let (state, _) = step(&EditorState::default(), action);
        assert!(!state.working().unwrap().has_transparency);

        let (state, _) = step(&state, Action::BeginSegmentation);
        let (state, _) = step(&state, Action::CommitSegmentation(35.0));
        let working = state.working().unwrap();
        assert_eq!(working.buffer.transparent_count(), 0);
        assert!(working.has_transparency);
        assert_eq!(working.format, ImageFormat::Png);
    }

    #[test]
    fn test_chroma_key_fallback() {
        let (state, effect) = step(&loaded(), Action::ChromaKeyFallback);
        assert!(matches!(effect, Some(Effect::ImageReplaced { mime: "image/png", .. })));
        // The square is blue-dominant, the white border is not
        let working = state.working().unwrap();
        assert_eq!(working.buffer.transparent_count(), 40 * 40);
        assert_eq!(working.buffer.pixel(0, 0), Some(Rgba::new(255, 255, 255, 255)));
    }

    #[test]
    fn test_busy_rejects_destructive_only() {
        let mut state = loaded();
        let token = state.begin_operation().unwrap();

        let err = reduce(&state, Action::ApplyBackgroundColor(Rgb::BLACK)).unwrap_err();
        assert!(matches!(err, EditorError::Busy));
        assert!(reduce(&state, Action::SetAdjustment(Adjustment::Sepia, 40.0)).is_ok());
        assert!(reduce(&state, Action::BeginSegmentation).is_ok());

        assert!(state.finish_operation(token));
        assert!(reduce(&state, Action::ApplyBackgroundColor(Rgb::BLACK)).is_ok());
    }

    #[test]
    fn test_failed_action_leaves_state() {
        let state = loaded();
        let before = state.working().unwrap().clone();
        assert!(reduce(&state, Action::ApplyCrop).is_err());
        assert_eq!(state.working().unwrap(), &before);
        assert!(!state.is_busy());
    }

    #[test]
    fn test_crop_flow() {
        let (state, _) = step(&loaded(), Action::StartCrop(geometry()));
        let rect = match &state.tool {
            ActiveTool::Crop { region, .. } => region.rect(),
            other => panic!("unexpected tool: {:?}", other),
        };
        assert!((rect.width / rect.height - 1.5).abs() < 1e-9);

        let (state, _) = step(&state, Action::MoveCrop { x: 0.0, y: 0.0 });
        let (state, effect) = step(&state, Action::ApplyCrop);
        assert!(matches!(effect, Some(Effect::ImageReplaced { mime: "image/png", .. })));
        let working = state.working().unwrap();
        assert_eq!((working.width(), working.height()), (80, 53));
        assert_eq!(state.tool, ActiveTool::None);
    }

    #[test]
    fn test_crop_requires_matching_geometry() {
        let err = reduce(&loaded(), Action::StartCrop(DisplayGeometry::new(50.0, 50.0, 200, 100))).unwrap_err();
        assert!(matches!(err, EditorError::GeometryMismatch { .. }));

        let err = reduce(&loaded(), Action::MoveCrop { x: 1.0, y: 1.0 }).unwrap_err();
        assert!(matches!(err, EditorError::NoActiveTool("crop")));
    }

    #[test]
    fn test_blur_flow_records_region() {
        let (state, _) = step(&loaded(), Action::StartBlur(geometry()));
        let (state, effect) = step(&state, Action::ApplyBlur);
        assert!(matches!(effect, Some(Effect::ImageReplaced { mime: "image/png", .. })));
        // The 30x10 plate box grows to the 20 px minimum height
        assert_eq!(state.committed_blurs, vec![PixelRect::new(35, 45, 30, 20)]);
    }

    #[test]
    fn test_crop_moves_committed_blurs() {
        let (state, _) = step(&loaded(), Action::StartBlur(geometry()));
        let (state, _) = step(&state, Action::ApplyBlur);
        let (state, _) = step(&state, Action::StartCrop(geometry()));
        let (state, _) = step(&state, Action::ApplyCrop);

        // Crop origin is (10, 23)
        assert_eq!(state.committed_blurs, vec![PixelRect::new(25, 22, 30, 20)]);
    }

    #[test]
    fn test_translate_into_drops_outside() {
        let bounds = PixelRect::new(10, 10, 20, 20);
        assert_eq!(translate_into(PixelRect::new(0, 0, 5, 5), bounds), None);
        assert_eq!(
            translate_into(PixelRect::new(5, 25, 10, 10), bounds),
            Some(PixelRect::new(0, 15, 5, 5))
        );
    }

    #[test]
    fn test_export_effect() {
        let (state, _) = step(&loaded(), Action::RotateRight);
        let caps = DownloadCapabilities {
            supports_download_attribute: false,
            can_open_blob_urls: true,
        };
        let (_, effect) = step(&state, Action::Export(caps));
        match effect {
            Some(Effect::Exported { image, delivery }) => {
                assert_eq!(image.mime, "image/jpeg");
                assert_eq!(image.file_name, "sedan-enhanced.jpg");
                assert_eq!(delivery, DeliveryMethod::OpenInNewTab);
            }
            other => panic!("unexpected effect: {:?}", other),
        }
    }
}
