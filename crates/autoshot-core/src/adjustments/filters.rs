//! Pixel math for the color filter chain.
//!
//! Each filter is the Filter Effects Level 1 shorthand evaluated on straight
//! (non-premultiplied) sRGB values in `0..=1`, clamped after every step.
//! Alpha is never touched except by blur.
//!
//! Consecutive per-pixel filters run in a single pass; blur splits the chain
//! because it needs neighboring pixels.

use image::{imageops, Rgba32FImage};

use super::descriptor::ColorFilter;
use crate::raster::RgbaBuffer;

/// Apply the chain in order. Identity filters are skipped, so an all-default
/// chain leaves the buffer byte-identical.
pub fn apply_color_filters(image: &mut RgbaBuffer, filters: &[ColorFilter]) {
    let active: Vec<ColorFilter> = filters.iter().copied().filter(|f| !f.is_identity()).collect();
    if active.is_empty() || image.is_empty() {
        return;
    }

    let mut run: Vec<ColorFilter> = Vec::new();
    for filter in active {
        match filter {
            ColorFilter::Blur(sigma) => {
                apply_pixel_run(&mut image.pixels, &run);
                run.clear();
                apply_blur(image, sigma);
            }
            other => run.push(other),
        }
    }
    apply_pixel_run(&mut image.pixels, &run);
}

fn apply_pixel_run(pixels: &mut [u8], run: &[ColorFilter]) {
    if run.is_empty() {
        return;
    }

    for chunk in pixels.chunks_exact_mut(4) {
        let mut r = chunk[0] as f32 / 255.0;
        let mut g = chunk[1] as f32 / 255.0;
        let mut b = chunk[2] as f32 / 255.0;

        for filter in run {
            (r, g, b) = match *filter {
                ColorFilter::Brightness(v) => apply_brightness(r, g, b, v / 100.0),
                ColorFilter::Contrast(v) => apply_contrast(r, g, b, v / 100.0),
                ColorFilter::Saturate(v) => apply_matrix(r, g, b, &saturate_matrix(v / 100.0)),
                ColorFilter::Grayscale(v) => apply_matrix(r, g, b, &grayscale_matrix(v / 100.0)),
                ColorFilter::Sepia(v) => apply_matrix(r, g, b, &sepia_matrix(v / 100.0)),
                ColorFilter::HueRotate(deg) => apply_matrix(r, g, b, &hue_rotate_matrix(deg)),
                ColorFilter::Blur(_) => (r, g, b),
            };
        }

        chunk[0] = to_u8(r);
        chunk[1] = to_u8(g);
        chunk[2] = to_u8(b);
    }
}

#[inline]
fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

type Matrix = [[f32; 3]; 3];

#[inline]
fn apply_brightness(r: f32, g: f32, b: f32, amount: f32) -> (f32, f32, f32) {
    (
        (r * amount).clamp(0.0, 1.0),
        (g * amount).clamp(0.0, 1.0),
        (b * amount).clamp(0.0, 1.0),
    )
}

/// Scale around mid-gray.
#[inline]
fn apply_contrast(r: f32, g: f32, b: f32, amount: f32) -> (f32, f32, f32) {
    let f = |v: f32| ((v - 0.5) * amount + 0.5).clamp(0.0, 1.0);
    (f(r), f(g), f(b))
}

#[inline]
fn apply_matrix(r: f32, g: f32, b: f32, m: &Matrix) -> (f32, f32, f32) {
    (
        (m[0][0] * r + m[0][1] * g + m[0][2] * b).clamp(0.0, 1.0),
        (m[1][0] * r + m[1][1] * g + m[1][2] * b).clamp(0.0, 1.0),
        (m[2][0] * r + m[2][1] * g + m[2][2] * b).clamp(0.0, 1.0),
    )
}

fn saturate_matrix(s: f32) -> Matrix {
    [
        [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
    ]
}

fn grayscale_matrix(amount: f32) -> Matrix {
    let s = 1.0 - amount.clamp(0.0, 1.0);
    [
        [0.2126 + 0.7874 * s, 0.7152 - 0.7152 * s, 0.0722 - 0.0722 * s],
        [0.2126 - 0.2126 * s, 0.7152 + 0.2848 * s, 0.0722 - 0.0722 * s],
        [0.2126 - 0.2126 * s, 0.7152 - 0.7152 * s, 0.0722 + 0.9278 * s],
    ]
}

fn sepia_matrix(amount: f32) -> Matrix {
    let s = 1.0 - amount.clamp(0.0, 1.0);
    [
        [0.393 + 0.607 * s, 0.769 - 0.769 * s, 0.189 - 0.189 * s],
        [0.349 - 0.349 * s, 0.686 + 0.314 * s, 0.168 - 0.168 * s],
        [0.272 - 0.272 * s, 0.534 - 0.534 * s, 0.131 + 0.869 * s],
    ]
}

fn hue_rotate_matrix(degrees: f32) -> Matrix {
    let rad = degrees.to_radians();
    let (sin, cos) = rad.sin_cos();
    [
        [
            0.213 + cos * 0.787 - sin * 0.213,
            0.715 - cos * 0.715 - sin * 0.715,
            0.072 - cos * 0.072 + sin * 0.928,
        ],
        [
            0.213 - cos * 0.213 + sin * 0.143,
            0.715 + cos * 0.285 + sin * 0.140,
            0.072 - cos * 0.072 - sin * 0.283,
        ],
        [
            0.213 - cos * 0.213 - sin * 0.787,
            0.715 - cos * 0.715 + sin * 0.715,
            0.072 + cos * 0.928 + sin * 0.072,
        ],
    ]
}

/// Gaussian blur with standard deviation `sigma` pixels, all four channels.
///
/// Runs on premultiplied values so the color hidden under transparent
/// pixels does not bleed into opaque neighbors.
pub(crate) fn apply_blur(image: &mut RgbaBuffer, sigma: f32) {
    if sigma <= 0.0 || image.is_empty() {
        return;
    }
    let premultiplied: Vec<f32> = image
        .pixels
        .chunks_exact(4)
        .flat_map(|p| {
            let a = p[3] as f32 / 255.0;
            [p[0] as f32 * a, p[1] as f32 * a, p[2] as f32 * a, p[3] as f32]
        })
        .collect();
    let Some(source) = Rgba32FImage::from_raw(image.width, image.height, premultiplied) else {
        log::warn!("Blur skipped: buffer does not match {}x{}", image.width, image.height);
        return;
    };
    let blurred = imageops::blur(&source, sigma);

    for (dst, src) in image.pixels.chunks_exact_mut(4).zip(blurred.pixels()) {
        let [r, g, b, a] = src.0;
        let alpha = a.round().clamp(0.0, 255.0) as u8;
        if alpha == 0 {
            dst.copy_from_slice(&[0, 0, 0, 0]);
            continue;
        }
        let unpremultiply = 255.0 / a;
        dst[0] = (r * unpremultiply).round().clamp(0.0, 255.0) as u8;
        dst[1] = (g * unpremultiply).round().clamp(0.0, 255.0) as u8;
        dst[2] = (b * unpremultiply).round().clamp(0.0, 255.0) as u8;
        dst[3] = alpha;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Rgba;

    fn single(r: u8, g: u8, b: u8) -> RgbaBuffer {
        RgbaBuffer::filled(1, 1, Rgba::new(r, g, b, 255))
    }

    fn run(mut buf: RgbaBuffer, filters: &[ColorFilter]) -> [u8; 4] {
        apply_color_filters(&mut buf, filters);
        buf.pixel(0, 0).unwrap().to_array()
    }

    #[test]
    fn test_identity_chain_is_exact() {
        let mut buf = RgbaBuffer::new(3, 2);
        for (i, b) in buf.pixels.iter_mut().enumerate() {
            *b = (i * 37 % 256) as u8;
        }
        let before = buf.clone();
        apply_color_filters(
            &mut buf,
            &[
                ColorFilter::Brightness(100.0),
                ColorFilter::Contrast(100.0),
                ColorFilter::Saturate(100.0),
                ColorFilter::Grayscale(0.0),
                ColorFilter::Sepia(0.0),
                ColorFilter::HueRotate(0.0),
            ],
        );
        assert_eq!(buf, before);
    }

    #[test]
    fn test_brightness() {
        assert_eq!(run(single(100, 50, 200), &[ColorFilter::Brightness(150.0)]), [150, 75, 255, 255]);
        assert_eq!(run(single(100, 50, 200), &[ColorFilter::Brightness(0.0)]), [0, 0, 0, 255]);
    }

    #[test]
    fn test_contrast_pivots_on_mid_gray() {
        let out = run(single(200, 50, 128), &[ColorFilter::Contrast(200.0)]);
        assert!(out[0] > 200);
        assert!(out[1] < 50);
        assert!((out[2] as i32 - 128).abs() <= 1);
    }

    #[test]
    fn test_zero_contrast_is_flat_gray() {
        let out = run(single(10, 240, 99), &[ColorFilter::Contrast(0.0)]);
        assert_eq!(&out[..3], &[128, 128, 128]);
    }

    #[test]
    fn test_full_grayscale_equalizes_channels() {
        let out = run(single(200, 40, 90), &[ColorFilter::Grayscale(100.0)]);
        assert_eq!(out[0], out[1]);
        assert_eq!(out[1], out[2]);
    }

    #[test]
    fn test_zero_saturation_matches_grayscale_order() {
        let out = run(single(220, 30, 30), &[ColorFilter::Saturate(0.0)]);
        assert!((out[0] as i32 - out[1] as i32).abs() <= 1);
        assert!((out[1] as i32 - out[2] as i32).abs() <= 1);
    }

    #[test]
    fn test_sepia_warms_gray() {
        let out = run(single(128, 128, 128), &[ColorFilter::Sepia(100.0)]);
        assert!(out[0] > out[1] && out[1] > out[2], "{:?}", out);
    }

    #[test]
    fn test_hue_rotate_changes_red() {
        let out = run(single(255, 0, 0), &[ColorFilter::HueRotate(120.0)]);
        assert!(out[1] > out[0], "{:?}", out);
    }

    #[test]
    fn test_alpha_preserved() {
        let buf = RgbaBuffer::filled(1, 1, Rgba::new(100, 100, 100, 77));
        let out = run(buf, &[ColorFilter::Brightness(150.0), ColorFilter::Sepia(50.0)]);
        assert_eq!(out[3], 77);
    }

    #[test]
    fn test_blur_spreads_a_dot() {
        let mut buf = RgbaBuffer::filled(9, 9, Rgba::new(0, 0, 0, 255));
        buf.put_pixel(4, 4, Rgba::new(255, 255, 255, 255));
        apply_color_filters(&mut buf, &[ColorFilter::Blur(1.5)]);
        let center = buf.pixel(4, 4).unwrap();
        let near = buf.pixel(5, 4).unwrap();
        assert!(center.r < 255);
        assert!(near.r > 0);
        assert_eq!((buf.width, buf.height), (9, 9));
    }

    #[test]
    fn test_blur_keeps_hue_at_transparent_edge() {
        let mut buf = RgbaBuffer::new(20, 1);
        for x in 0..20 {
            let color = if x < 10 {
                Rgba::new(200, 0, 0, 255)
            } else {
                Rgba::new(255, 255, 255, 0)
            };
            buf.put_pixel(x, 0, color);
        }
        apply_color_filters(&mut buf, &[ColorFilter::Blur(2.0)]);

        let edge = buf.pixel(10, 0).unwrap();
        assert!(edge.a > 0 && edge.a < 255);
        assert!(edge.r >= 195, "edge lost its red: {:?}", edge);
        assert!(edge.g <= 5 && edge.b <= 5, "white bled into edge: {:?}", edge);
    }

    #[test]
    fn test_blur_clears_fully_transparent_color() {
        let mut buf = RgbaBuffer::filled(5, 5, Rgba::new(255, 255, 255, 0));
        apply_color_filters(&mut buf, &[ColorFilter::Blur(1.0)]);
        assert!(buf.pixels.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_order_matters() {
        let a = run(single(200, 100, 50), &[ColorFilter::Brightness(50.0), ColorFilter::Contrast(200.0)]);
        let b = run(single(200, 100, 50), &[ColorFilter::Contrast(200.0), ColorFilter::Brightness(50.0)]);
        assert_ne!(a, b);
    }
}
