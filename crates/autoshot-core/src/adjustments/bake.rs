//! Destructive rendering of an adjustment state into pixels.
//!
//! Order is fixed: transform, color chain, then overlays in descriptor order
//! (vignette, noise, temperature, tint, clarity).

use super::descriptor::{compute_filter_descriptor, FilterDescriptor};
use super::filters::apply_color_filters;
use super::overlay::{apply_overlays, NoiseTexture};
use super::transform::apply_transform;
use super::AdjustmentState;
use crate::config::EngineConfig;
use crate::raster::RgbaBuffer;

/// Render `state` onto a copy of `source`.
///
/// A default state returns a byte-identical copy.
pub fn bake(source: &RgbaBuffer, state: &AdjustmentState, config: &EngineConfig) -> RgbaBuffer {
    let descriptor = compute_filter_descriptor(state);
    bake_descriptor(source, &descriptor, config)
}

/// Render an already computed descriptor.
pub fn bake_descriptor(
    source: &RgbaBuffer,
    descriptor: &FilterDescriptor,
    config: &EngineConfig,
) -> RgbaBuffer {
    if descriptor.is_identity() {
        return source.clone();
    }

    let mut image = apply_transform(source, &descriptor.transform);
    apply_color_filters(&mut image, &descriptor.color_filters);

    if !descriptor.overlays.is_empty() {
        let noise = NoiseTexture::generate(config.noise_seed, config.noise_tile_size);
        apply_overlays(&mut image, &descriptor.overlays, &noise);
    }

    log::debug!(
        "Baked {}x{} -> {}x{} ({} filters, {} overlays)",
        source.width,
        source.height,
        image.width,
        image.height,
        descriptor.color_filters.len(),
        descriptor.overlays.len()
    );

    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjustments::find_preset;
    use crate::raster::Rgba;

    pub(super) fn sample(w: u32, h: u32) -> RgbaBuffer {
        let mut buf = RgbaBuffer::new(w, h);
        for (i, px) in buf.pixels.chunks_exact_mut(4).enumerate() {
            let v = (i * 29 % 256) as u8;
            px.copy_from_slice(&[v, 255 - v, v / 2, 255]);
        }
        buf
    }

    #[test]
    fn test_default_state_is_exact_copy() {
        let src = sample(7, 5);
        let out = bake(&src, &AdjustmentState::default(), &EngineConfig::default());
        assert_eq!(out, src);
    }

    #[test]
    fn test_rotation_swaps_dimensions() {
        let mut state = AdjustmentState::default();
        state.rotate_right();
        let out = bake(&sample(8, 6), &state, &EngineConfig::default());
        assert_eq!((out.width, out.height), (6, 8));
    }

    #[test]
    fn test_transform_runs_before_color() {
        let mut src = RgbaBuffer::filled(8, 6, Rgba::new(40, 40, 40, 255));
        src.put_pixel(0, 0, Rgba::new(255, 0, 0, 255));

        let mut state = AdjustmentState::default();
        state.rotate = 90;
        state.flip_x = true;
        state.grayscale = 100.0;
        let out = bake(&src, &state, &EngineConfig::default());

        let moved = out.pixel(5, 7).unwrap();
        assert_eq!(moved.r, moved.g);
        assert!(moved.r > 40);
    }

    #[test]
    fn test_presets_render() {
        let src = sample(16, 12);
        for name in ["Showroom", "Vintage", "Neon Night"] {
            let preset = find_preset(name).unwrap();
            let out = bake(&src, &preset.adjustments, &EngineConfig::default());
            assert_eq!((out.width, out.height), (16, 12));
            assert_ne!(out, src, "{} left the image unchanged", name);
        }
    }

    #[test]
    fn test_bake_is_deterministic() {
        let src = sample(10, 10);
        let preset = find_preset("Vintage").unwrap();
        let config = EngineConfig::default();
        assert_eq!(
            bake(&src, &preset.adjustments, &config),
            bake(&src, &preset.adjustments, &config)
        );
    }
}

#[cfg(test)]
mod proptests {
    use super::tests::sample;
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_quarter_turns_keep_pixel_count(turns in 0i32..8, w in 1u32..12, h in 1u32..12) {
            let mut state = AdjustmentState::default();
            state.rotate = turns * 90;
            let out = bake(&sample(w, h), &state, &EngineConfig::default());
            prop_assert_eq!(out.pixel_count(), (w * h) as usize);
        }

        #[test]
        fn prop_bake_never_changes_alpha_without_blur(
            vignette in 0.0f32..100.0,
            temperature in -50.0f32..50.0,
            contrast in 0.0f32..200.0,
        ) {
            let mut src = sample(6, 6);
            src.put_pixel(2, 2, crate::raster::Rgba::TRANSPARENT);
            let mut state = AdjustmentState::default();
            state.vignette = vignette;
            state.temperature = temperature;
            state.contrast = contrast;
            let out = bake(&src, &state, &EngineConfig::default());
            for (a, b) in src.pixels.chunks_exact(4).zip(out.pixels.chunks_exact(4)) {
                prop_assert_eq!(a[3], b[3]);
            }
        }
    }
}
