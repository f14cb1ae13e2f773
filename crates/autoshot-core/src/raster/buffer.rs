//! The RGBA pixel buffer every engine operation reads and produces.

use super::blend::source_over;
use super::color::Rgba;

/// An integer rectangle in natural (pixel) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Intersect with a `width` x `height` image. May return an empty rect.
    pub fn clamp_to(&self, width: u32, height: u32) -> PixelRect {
        let x = self.x.min(width);
        let y = self.y.min(height);
        let right = self.x.saturating_add(self.width).min(width);
        let bottom = self.y.saturating_add(self.height).min(height);
        PixelRect::new(x, y, right - x, bottom - y)
    }

    /// True if the rect lies entirely inside a `width` x `height` image.
    pub fn fits_in(&self, width: u32, height: u32) -> bool {
        self.x.saturating_add(self.width) <= width && self.y.saturating_add(self.height) <= height
    }
}

/// A decoded raster: RGBA pixel data with straight alpha.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaBuffer {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// RGBA pixel data in row-major order (4 bytes per pixel).
    /// Length should be width * height * 4.
    pub pixels: Vec<u8>,
}

impl RgbaBuffer {
    /// Create a fully transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    /// Create a buffer with every pixel set to `color`.
    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        let px = color.to_array();
        let pixels = px
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Wrap existing pixel data. Returns `None` if the length does not match.
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        if pixels.len() != width as usize * height as usize * 4 {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Create a buffer from an `image::RgbaImage`.
    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }

    /// Convert to an `image::RgbaImage` (clones the pixel data).
    pub fn to_rgba_image(&self) -> image::RgbaImage {
        // Length is an invariant of every constructor above.
        image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
            .unwrap_or_else(|| image::RgbaImage::new(self.width, self.height))
    }

    /// Consume into an `image::RgbaImage` without copying.
    pub fn into_rgba_image(self) -> image::RgbaImage {
        let (w, h) = (self.width, self.height);
        image::RgbaImage::from_raw(w, h, self.pixels).unwrap_or_else(|| image::RgbaImage::new(w, h))
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Read a pixel. Returns `None` outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.index(x, y);
        self.pixels.get(i..i + 4).map(|p| Rgba::new(p[0], p[1], p[2], p[3]))
    }

    /// Overwrite a pixel. Out-of-bounds writes are ignored.
    pub fn put_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = self.index(x, y);
        if let Some(p) = self.pixels.get_mut(i..i + 4) {
            p.copy_from_slice(&color.to_array());
        }
    }

    /// True if any pixel has alpha below 255.
    pub fn has_transparency(&self) -> bool {
        self.pixels.chunks_exact(4).any(|p| p[3] < 255)
    }

    /// Number of fully transparent pixels.
    pub fn transparent_count(&self) -> usize {
        self.pixels.chunks_exact(4).filter(|p| p[3] == 0).count()
    }

    /// Copy a sub-rectangle into a new buffer. The rect is clamped to the image.
    pub fn extract(&self, rect: PixelRect) -> RgbaBuffer {
        let rect = rect.clamp_to(self.width, self.height);
        let mut out = RgbaBuffer::new(rect.width, rect.height);
        let row_bytes = rect.width as usize * 4;

        for y in 0..rect.height {
            let src = self.index(rect.x, rect.y + y);
            let dst = y as usize * row_bytes;
            out.pixels[dst..dst + row_bytes].copy_from_slice(&self.pixels[src..src + row_bytes]);
        }
        out
    }

    /// Replace pixels at (`x`, `y`) with `src`, clipping at the buffer edge.
    pub fn paste(&mut self, src: &RgbaBuffer, x: u32, y: u32) {
        let clip = PixelRect::new(x, y, src.width, src.height).clamp_to(self.width, self.height);
        let row_bytes = clip.width as usize * 4;

        for row in 0..clip.height {
            let s = row as usize * src.width as usize * 4;
            let d = self.index(clip.x, clip.y + row);
            self.pixels[d..d + row_bytes].copy_from_slice(&src.pixels[s..s + row_bytes]);
        }
    }

    /// Composite `src` over this buffer at (`x`, `y`) using source-over.
    pub fn draw_over(&mut self, src: &RgbaBuffer, x: u32, y: u32) {
        let clip = PixelRect::new(x, y, src.width, src.height).clamp_to(self.width, self.height);

        for row in 0..clip.height {
            for col in 0..clip.width {
                let s = (row as usize * src.width as usize + col as usize) * 4;
                let d = self.index(clip.x + col, clip.y + row);
                let top = [src.pixels[s], src.pixels[s + 1], src.pixels[s + 2], src.pixels[s + 3]];
                let out = source_over(
                    [
                        self.pixels[d],
                        self.pixels[d + 1],
                        self.pixels[d + 2],
                        self.pixels[d + 3],
                    ],
                    top,
                );
                self.pixels[d..d + 4].copy_from_slice(&out);
            }
        }
    }

    /// Composite a solid color over a rectangle (canvas `fillRect` semantics).
    pub fn fill_rect_over(&mut self, rect: PixelRect, color: Rgba) {
        let rect = rect.clamp_to(self.width, self.height);
        let top = color.to_array();

        for y in rect.y..rect.y + rect.height {
            for x in rect.x..rect.x + rect.width {
                let i = self.index(x, y);
                let below = [
                    self.pixels[i],
                    self.pixels[i + 1],
                    self.pixels[i + 2],
                    self.pixels[i + 3],
                ];
                self.pixels[i..i + 4].copy_from_slice(&source_over(below, top));
            }
        }
    }

    /// Drop the alpha channel, compositing onto an opaque `background`.
    ///
    /// Returns RGB data (3 bytes per pixel) for encoders without alpha.
    pub fn flatten_rgb(&self, background: [u8; 3]) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixel_count() * 3);
        for p in self.pixels.chunks_exact(4) {
            let a = p[3] as u32;
            for c in 0..3 {
                let v = (p[c] as u32 * a + background[c] as u32 * (255 - a) + 127) / 255;
                out.push(v as u8);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A buffer where each pixel encodes its position.
    fn gradient(width: u32, height: u32) -> RgbaBuffer {
        let mut buf = RgbaBuffer::new(width, height);
        for y in 0..height {
            for x in 0..width {
                buf.put_pixel(x, y, Rgba::new(x as u8, y as u8, 7, 255));
            }
        }
        buf
    }

    #[test]
    fn test_new_is_transparent() {
        let buf = RgbaBuffer::new(4, 3);
        assert_eq!(buf.pixels.len(), 48);
        assert!(buf.has_transparency());
        assert_eq!(buf.transparent_count(), 12);
    }

    #[test]
    fn test_filled() {
        let buf = RgbaBuffer::filled(3, 2, Rgba::new(1, 2, 3, 255));
        assert_eq!(buf.pixels.len(), 24);
        assert!(!buf.has_transparency());
        assert_eq!(buf.pixel(2, 1), Some(Rgba::new(1, 2, 3, 255)));
    }

    #[test]
    fn test_from_raw_rejects_bad_length() {
        assert!(RgbaBuffer::from_raw(2, 2, vec![0; 15]).is_none());
        assert!(RgbaBuffer::from_raw(2, 2, vec![0; 16]).is_some());
    }

    #[test]
    fn test_pixel_out_of_bounds() {
        let mut buf = gradient(4, 4);
        assert!(buf.pixel(4, 0).is_none());
        buf.put_pixel(10, 10, Rgba::TRANSPARENT);
        assert!(!buf.has_transparency());
    }

    #[test]
    fn test_extract_region() {
        let buf = gradient(10, 10);
        let sub = buf.extract(PixelRect::new(2, 3, 4, 5));
        assert_eq!((sub.width, sub.height), (4, 5));
        assert_eq!(sub.pixel(0, 0), Some(Rgba::new(2, 3, 7, 255)));
        assert_eq!(sub.pixel(3, 4), Some(Rgba::new(5, 7, 7, 255)));
    }

    #[test]
    fn test_extract_clamps() {
        let buf = gradient(10, 10);
        let sub = buf.extract(PixelRect::new(8, 8, 10, 10));
        assert_eq!((sub.width, sub.height), (2, 2));
    }

    #[test]
    fn test_paste_replaces_pixels() {
        let mut buf = gradient(6, 6);
        let patch = RgbaBuffer::filled(2, 2, Rgba::new(200, 0, 0, 0));
        buf.paste(&patch, 1, 1);
        assert_eq!(buf.pixel(1, 1), Some(Rgba::new(200, 0, 0, 0)));
        assert_eq!(buf.pixel(2, 2), Some(Rgba::new(200, 0, 0, 0)));
        assert_eq!(buf.pixel(3, 3), Some(Rgba::new(3, 3, 7, 255)));
    }

    #[test]
    fn test_paste_clips_at_edge() {
        let mut buf = gradient(4, 4);
        let patch = RgbaBuffer::filled(3, 3, Rgba::new(9, 9, 9, 255));
        buf.paste(&patch, 2, 2);
        assert_eq!(buf.pixel(3, 3), Some(Rgba::new(9, 9, 9, 255)));
    }

    #[test]
    fn test_draw_over_opaque_replaces() {
        let mut buf = gradient(4, 4);
        let top = RgbaBuffer::filled(2, 2, Rgba::new(50, 60, 70, 255));
        buf.draw_over(&top, 0, 0);
        assert_eq!(buf.pixel(1, 1), Some(Rgba::new(50, 60, 70, 255)));
    }

    #[test]
    fn test_draw_over_transparent_keeps_base() {
        let mut buf = gradient(4, 4);
        let before = buf.clone();
        buf.draw_over(&RgbaBuffer::new(4, 4), 0, 0);
        assert_eq!(buf, before);
    }

    #[test]
    fn test_fill_rect_over_half_alpha() {
        let mut buf = RgbaBuffer::filled(2, 2, Rgba::new(0, 0, 0, 255));
        buf.fill_rect_over(PixelRect::new(0, 0, 1, 1), Rgba::new(255, 255, 255, 128));
        let p = buf.pixel(0, 0).unwrap();
        assert!((p.r as i32 - 128).abs() <= 1);
        assert_eq!(p.a, 255);
        assert_eq!(buf.pixel(1, 1), Some(Rgba::new(0, 0, 0, 255)));
    }

    #[test]
    fn test_flatten_rgb() {
        let mut buf = RgbaBuffer::filled(1, 2, Rgba::new(255, 0, 0, 255));
        buf.put_pixel(0, 1, Rgba::new(255, 255, 255, 0));
        let rgb = buf.flatten_rgb([0, 0, 0]);
        assert_eq!(rgb, vec![255, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_rect_clamp_and_fit() {
        let r = PixelRect::new(5, 5, 10, 10);
        assert!(!r.fits_in(10, 10));
        assert_eq!(r.clamp_to(10, 10), PixelRect::new(5, 5, 5, 5));
        assert!(PixelRect::new(20, 0, 5, 5).clamp_to(10, 10).is_empty());
    }

    #[test]
    fn test_image_round_trip() {
        let buf = gradient(3, 2);
        let img = buf.to_rgba_image();
        assert_eq!(RgbaBuffer::from_rgba_image(img), buf);
    }
}
