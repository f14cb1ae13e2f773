//! Re-compositing a cut-out over a solid background color.

use crate::raster::{Rgb, RgbaBuffer};

/// Fill a same-size buffer with `color`, then draw `image` over it.
///
/// The result is fully opaque wherever `color` is. Callers encode it as PNG
/// regardless of the input format.
pub fn apply_background_color(image: &RgbaBuffer, color: Rgb) -> RgbaBuffer {
    let mut out = RgbaBuffer::filled(image.width, image.height, color.into());
    out.draw_over(image, 0, 0);
    log::debug!(
        "Composited {}x{} over {}",
        image.width,
        image.height,
        color.to_hex()
    );
    out
}
