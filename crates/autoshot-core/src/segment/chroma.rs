//! Channel-dominance keying for green and blue backdrops.

use crate::raster::RgbaBuffer;

/// How much a channel must exceed the others to count as dominant.
const DOMINANCE: f32 = 1.2;

/// True if the pixel looks like a green or blue screen.
#[inline]
pub fn is_chroma_background(r: u8, g: u8, b: u8) -> bool {
    let (r, g, b) = (r as f32, g as f32, b as f32);
    let green = g > r * DOMINANCE && g > b * DOMINANCE;
    let blue = b > r * DOMINANCE && b > g * DOMINANCE;
    green || blue
}

/// Copy of `image` with green- or blue-dominant pixels made transparent.
pub fn chroma_key(image: &RgbaBuffer) -> RgbaBuffer {
    let mut out = image.clone();
    let mut removed = 0usize;
    for chunk in out.pixels.chunks_exact_mut(4) {
        if is_chroma_background(chunk[0], chunk[1], chunk[2]) {
            chunk[3] = 0;
            removed += 1;
        }
    }
    log::debug!("Chroma key removed {} of {} pixels", removed, out.pixel_count());
    out
}
