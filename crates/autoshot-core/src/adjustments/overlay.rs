//! Overlay layers baked on top of the filtered image.
//!
//! Every layer is composited source-atop, so transparent pixels left by
//! background removal stay transparent.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::descriptor::{ColorFilter, OverlayLayer};
use super::filters::apply_color_filters;
use crate::raster::{blend_atop, BlendMode, Rgb, RgbaBuffer};

/// Fraction of the center-to-corner distance where the vignette starts.
const VIGNETTE_INNER: f32 = 0.4;

/// Smootherstep interpolation: zero first and second derivative at both ends.
#[inline]
pub(crate) fn smootherstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// Largest noise tile edge, in pixels.
pub const MAX_NOISE_TILE_SIZE: u32 = 1024;

/// Tileable grayscale static, deterministic for a given seed.
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseTexture {
    size: u32,
    values: Vec<u8>,
}

impl NoiseTexture {
    /// Generate a `size` x `size` tile. The edge is clamped to
    /// `1..=MAX_NOISE_TILE_SIZE`.
    pub fn generate(seed: u64, size: u32) -> Self {
        let size = size.clamp(1, MAX_NOISE_TILE_SIZE);
        let mut rng = StdRng::seed_from_u64(seed);
        let values = (0..size * size).map(|_| rng.gen::<u8>()).collect();
        Self { size, values }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Gray value at `(x, y)`, wrapping.
    #[inline]
    pub fn sample(&self, x: u32, y: u32) -> u8 {
        let idx = (y % self.size) * self.size + (x % self.size);
        self.values[idx as usize]
    }

    /// The tile as an opaque RGBA buffer, for use as a preview texture.
    pub fn to_buffer(&self) -> RgbaBuffer {
        let mut pixels = Vec::with_capacity(self.values.len() * 4);
        for &v in &self.values {
            pixels.extend_from_slice(&[v, v, v, 255]);
        }
        RgbaBuffer {
            width: self.size,
            height: self.size,
            pixels,
        }
    }
}

/// Composite all layers in order.
pub fn apply_overlays(image: &mut RgbaBuffer, overlays: &[OverlayLayer], noise: &NoiseTexture) {
    for layer in overlays {
        apply_overlay(image, layer, noise);
    }
}

/// Composite one layer.
pub fn apply_overlay(image: &mut RgbaBuffer, layer: &OverlayLayer, noise: &NoiseTexture) {
    if image.is_empty() || layer.opacity() <= 0.0 {
        return;
    }
    match *layer {
        OverlayLayer::Vignette { opacity } => apply_vignette(image, opacity),
        OverlayLayer::Noise { opacity } => apply_noise(image, noise, opacity),
        OverlayLayer::Temperature { color, opacity } | OverlayLayer::Tint { color, opacity } => {
            apply_solid(image, color, layer.blend_mode(), opacity)
        }
        OverlayLayer::Clarity { amount } => apply_clarity(image, amount),
    }
}

fn apply_vignette(image: &mut RgbaBuffer, opacity: f32) {
    let (w, h) = (image.width as f32, image.height as f32);
    let (cx, cy) = (w / 2.0, h / 2.0);
    let width = image.width as usize;

    for (i, chunk) in image.pixels.chunks_exact_mut(4).enumerate() {
        let x = (i % width) as f32 + 0.5;
        let y = (i / width) as f32 + 0.5;

        // Elliptical distance, 1.0 at the corners.
        let nx = (x - cx) / cx;
        let ny = (y - cy) / cy;
        let d = ((nx * nx + ny * ny) / 2.0).sqrt();

        let t = (d - VIGNETTE_INNER) / (1.0 - VIGNETTE_INNER);
        let alpha = smootherstep(t);
        if alpha <= 0.0 {
            continue;
        }
        let top = [0, 0, 0, (alpha * 255.0).round() as u8];
        let out = blend_atop([chunk[0], chunk[1], chunk[2], chunk[3]], top, BlendMode::Multiply, opacity);
        chunk.copy_from_slice(&out);
    }
}

fn apply_noise(image: &mut RgbaBuffer, noise: &NoiseTexture, opacity: f32) {
    let width = image.width as usize;
    for (i, chunk) in image.pixels.chunks_exact_mut(4).enumerate() {
        let v = noise.sample((i % width) as u32, (i / width) as u32);
        let out = blend_atop(
            [chunk[0], chunk[1], chunk[2], chunk[3]],
            [v, v, v, 255],
            BlendMode::Overlay,
            opacity,
        );
        chunk.copy_from_slice(&out);
    }
}

fn apply_solid(image: &mut RgbaBuffer, color: Rgb, mode: BlendMode, opacity: f32) {
    let top = [color.r, color.g, color.b, 255];
    for chunk in image.pixels.chunks_exact_mut(4) {
        let out = blend_atop([chunk[0], chunk[1], chunk[2], chunk[3]], top, mode, opacity);
        chunk.copy_from_slice(&out);
    }
}

/// Overlay a contrast-boosted copy of the image onto itself.
fn apply_clarity(image: &mut RgbaBuffer, amount: f32) {
    let mut boosted = image.clone();
    apply_color_filters(
        &mut boosted,
        &[ColorFilter::Contrast(OverlayLayer::clarity_contrast(amount) * 100.0)],
    );
    let opacity = OverlayLayer::Clarity { amount }.opacity();

    for (chunk, top) in image
        .pixels
        .chunks_exact_mut(4)
        .zip(boosted.pixels.chunks_exact(4))
    {
        let out = blend_atop(
            [chunk[0], chunk[1], chunk[2], chunk[3]],
            [top[0], top[1], top[2], 255],
            BlendMode::Overlay,
            opacity,
        );
        chunk.copy_from_slice(&out);
    }
}
