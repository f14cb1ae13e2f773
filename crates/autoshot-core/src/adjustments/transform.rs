//! Rotation and mirroring of an RGBA buffer about its center.
//!
//! The forward mapping is `p' = R(θ) · S(flip) · p` with θ clockwise in
//! y-down image coordinates, matching `rotate(θ) scaleX(..) scaleY(..)`
//! in CSS. Rendering uses inverse mapping: for each output pixel center we
//! un-rotate, then un-flip, and sample the source.
//!
//! ```text
//! sx =  dx * cos θ + dy * sin θ
//! sy = -dx * sin θ + dy * cos θ
//! ```
//!
//! Quarter turns use exact integer trigonometry and nearest sampling so
//! they are lossless. Other angles expand the canvas to the rotated bounding
//! box and sample bilinearly; uncovered pixels stay transparent.

use super::descriptor::Transform;
use crate::raster::{PixelRect, RgbaBuffer};

/// Dimensions of the bounding box of a `width` x `height` image rotated by
/// `angle_degrees` (either direction).
///
/// ```
/// use autoshot_core::adjustments::compute_rotated_bounds;
///
/// assert_eq!(compute_rotated_bounds(100, 50, 90.0), (50, 100));
/// assert_eq!(compute_rotated_bounds(100, 50, 180.0), (100, 50));
/// ```
pub fn compute_rotated_bounds(width: u32, height: u32, angle_degrees: f64) -> (u32, u32) {
    let angle = angle_degrees.rem_euclid(360.0);

    if angle < 0.001 || (360.0 - angle) < 0.001 || (angle - 180.0).abs() < 0.001 {
        return (width, height);
    }
    if (angle - 90.0).abs() < 0.001 || (angle - 270.0).abs() < 0.001 {
        return (height, width);
    }

    let rad = angle.to_radians();
    let cos = rad.cos().abs();
    let sin = rad.sin().abs();
    let (w, h) = (width as f64, height as f64);

    let new_w = (w * cos + h * sin).round() as u32;
    let new_h = (w * sin + h * cos).round() as u32;

    (new_w.max(1), new_h.max(1))
}

/// Apply a rotation and flips. The identity transform returns a copy.
pub fn apply_transform(image: &RgbaBuffer, transform: &Transform) -> RgbaBuffer {
    if transform.is_identity() || image.is_empty() {
        return image.clone();
    }

    let angle = transform.rotate % 360;
    let (cos, sin, exact) = match angle {
        0 => (1.0, 0.0, true),
        90 => (0.0, 1.0, true),
        180 => (-1.0, 0.0, true),
        270 => (0.0, -1.0, true),
        _ => {
            let rad = (angle as f64).to_radians();
            (rad.cos(), rad.sin(), false)
        }
    };

    let (dst_w, dst_h) = compute_rotated_bounds(image.width, image.height, angle as f64);
    let (src_w, src_h) = (image.width as f64, image.height as f64);
    let flip_x = if transform.flip_x { -1.0 } else { 1.0 };
    let flip_y = if transform.flip_y { -1.0 } else { 1.0 };

    let mut output = RgbaBuffer::new(dst_w, dst_h);

    for dst_y in 0..dst_h {
        for dst_x in 0..dst_w {
            let dx = dst_x as f64 + 0.5 - dst_w as f64 / 2.0;
            let dy = dst_y as f64 + 0.5 - dst_h as f64 / 2.0;

            let rx = dx * cos + dy * sin;
            let ry = -dx * sin + dy * cos;

            let src_x = rx * flip_x + src_w / 2.0 - 0.5;
            let src_y = ry * flip_y + src_h / 2.0 - 0.5;

            let pixel = if exact {
                sample_nearest(image, src_x, src_y)
            } else {
                sample_bilinear(image, src_x, src_y)
            };

            let idx = ((dst_y * dst_w + dst_x) * 4) as usize;
            output.pixels[idx..idx + 4].copy_from_slice(&pixel);
        }
    }

    output
}

/// Where a source rectangle lands after `transform`: the integer bounding
/// box of its four mapped corners in the output canvas.
pub fn map_rect(rect: PixelRect, width: u32, height: u32, transform: &Transform) -> PixelRect {
    if transform.is_identity() {
        return rect;
    }

    let angle = transform.rotate % 360;
    let (cos, sin) = match angle {
        0 => (1.0, 0.0),
        90 => (0.0, 1.0),
        180 => (-1.0, 0.0),
        270 => (0.0, -1.0),
        _ => {
            let rad = (angle as f64).to_radians();
            (rad.cos(), rad.sin())
        }
    };
    let (dst_w, dst_h) = compute_rotated_bounds(width, height, angle as f64);
    let flip_x = if transform.flip_x { -1.0 } else { 1.0 };
    let flip_y = if transform.flip_y { -1.0 } else { 1.0 };

    let corners = [
        (rect.x as f64, rect.y as f64),
        ((rect.x + rect.width) as f64, rect.y as f64),
        (rect.x as f64, (rect.y + rect.height) as f64),
        ((rect.x + rect.width) as f64, (rect.y + rect.height) as f64),
    ];

    let (mut min_x, mut min_y) = (f64::MAX, f64::MAX);
    let (mut max_x, mut max_y) = (f64::MIN, f64::MIN);
    for (x, y) in corners {
        let dx = (x - width as f64 / 2.0) * flip_x;
        let dy = (y - height as f64 / 2.0) * flip_y;
        let ox = dx * cos - dy * sin + dst_w as f64 / 2.0;
        let oy = dx * sin + dy * cos + dst_h as f64 / 2.0;
        min_x = min_x.min(ox);
        min_y = min_y.min(oy);
        max_x = max_x.max(ox);
        max_y = max_y.max(oy);
    }

    let x0 = min_x.floor().max(0.0) as u32;
    let y0 = min_y.floor().max(0.0) as u32;
    let x1 = (max_x.ceil().max(0.0) as u32).min(dst_w);
    let y1 = (max_y.ceil().max(0.0) as u32).min(dst_h);
    PixelRect::new(x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0))
}

#[inline]
fn get_pixel_f64(image: &RgbaBuffer, px: usize, py: usize) -> [f64; 4] {
    let idx = (py * image.width as usize + px) * 4;
    [
        image.pixels[idx] as f64,
        image.pixels[idx + 1] as f64,
        image.pixels[idx + 2] as f64,
        image.pixels[idx + 3] as f64,
    ]
}

fn sample_nearest(image: &RgbaBuffer, x: f64, y: f64) -> [u8; 4] {
    let px = x.round();
    let py = y.round();
    if px < 0.0 || py < 0.0 || px >= image.width as f64 || py >= image.height as f64 {
        return [0, 0, 0, 0];
    }
    let idx = ((py as usize) * image.width as usize + px as usize) * 4;
    [
        image.pixels[idx],
        image.pixels[idx + 1],
        image.pixels[idx + 2],
        image.pixels[idx + 3],
    ]
}

/// Bilinear sample with alpha weighting. Neighbors outside the image count
/// as transparent, so edges fade out over one pixel.
fn sample_bilinear(image: &RgbaBuffer, x: f64, y: f64) -> [u8; 4] {
    let (w, h) = (image.width as i64, image.height as i64);

    if x <= -1.0 || y <= -1.0 || x >= w as f64 || y >= h as f64 {
        return [0, 0, 0, 0];
    }

    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let mut color = [0.0f64; 3];
    let mut alpha = 0.0f64;

    for (px, py, weight) in [
        (x0, y0, (1.0 - fx) * (1.0 - fy)),
        (x0 + 1, y0, fx * (1.0 - fy)),
        (x0, y0 + 1, (1.0 - fx) * fy),
        (x0 + 1, y0 + 1, fx * fy),
    ] {
        if px < 0 || py < 0 || px >= w || py >= h || weight <= 0.0 {
            continue;
        }
        let p = get_pixel_f64(image, px as usize, py as usize);
        let wa = weight * p[3];
        for i in 0..3 {
            color[i] += p[i] * wa;
        }
        alpha += wa;
    }

    if alpha <= 0.0 {
        return [0, 0, 0, 0];
    }

    let mut result = [0u8; 4];
    for i in 0..3 {
        result[i] = (color[i] / alpha).clamp(0.0, 255.0).round() as u8;
    }
    result[3] = alpha.clamp(0.0, 255.0).round() as u8;
    result
}
