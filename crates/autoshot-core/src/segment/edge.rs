//! Edge-sampled color-distance segmentation.

use serde::Serialize;

use super::{clamp_threshold, SegmentationError, SegmentationMethod};
use crate::raster::{Rgb, RgbaBuffer};

/// Result of a segmentation pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Segmentation {
    #[serde(skip)]
    pub image: RgbaBuffer,
    /// Estimated background color
    pub background: Rgb,
    /// Number of pixels made transparent by this pass
    pub transparent_pixels: usize,
    pub method: SegmentationMethod,
}

/// Estimate the background from the border ring.
///
/// Samples every `step`th pixel along the top and bottom rows (scanning x)
/// and the left and right columns (scanning y), then takes the rounded mean
/// of each channel. Corners can be sampled twice; alpha is ignored.
pub fn detect_background_color(image: &RgbaBuffer, step: u32) -> Result<Rgb, SegmentationError> {
    if image.is_empty() {
        return Err(SegmentationError::EmptyImage);
    }
    let step = step.max(1) as usize;
    let (w, h) = (image.width, image.height);

    let mut sum = [0u64; 3];
    let mut count = 0u64;
    let mut add = |x: u32, y: u32| {
        if let Some(px) = image.pixel(x, y) {
            sum[0] += px.r as u64;
            sum[1] += px.g as u64;
            sum[2] += px.b as u64;
            count += 1;
        }
    };

    for x in (0..w).step_by(step) {
        add(x, 0);
        add(x, h - 1);
    }
    for y in (0..h).step_by(step) {
        add(0, y);
        add(w - 1, y);
    }

    if count == 0 {
        return Err(SegmentationError::NoBorderSamples);
    }

    let mean = |s: u64| ((s as f64 / count as f64).round() as u8);
    let color = Rgb::new(mean(sum[0]), mean(sum[1]), mean(sum[2]));
    log::debug!(
        "Detected background {} from {} border samples",
        color.to_hex(),
        count
    );
    Ok(color)
}

/// Copy of `image` with every pixel strictly closer than `threshold` to
/// `background` made transparent. Returns the copy and the number of pixels
/// removed. The threshold is used as given.
pub fn classify(image: &RgbaBuffer, background: Rgb, threshold: f32) -> (RgbaBuffer, usize) {
    let mut out = image.clone();
    let mut removed = 0usize;
    for chunk in out.pixels.chunks_exact_mut(4) {
        if background.distance(chunk[0], chunk[1], chunk[2]) < threshold {
            chunk[3] = 0;
            removed += 1;
        }
    }
    (out, removed)
}

/// Detect the background and remove it in one pass.
pub fn remove_background(
    image: &RgbaBuffer,
    threshold: f32,
    sample_step: u32,
) -> Result<Segmentation, SegmentationError> {
    let background = detect_background_color(image, sample_step)?;
    let threshold = clamp_threshold(threshold);
    let (out, removed) = classify(image, background, threshold);
    Ok(Segmentation {
        image: out,
        background,
        transparent_pixels: removed,
        method: SegmentationMethod::EdgeSampled { threshold },
    })
}

/// Cached pre-segmentation pixels for scrubbing the threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdPreview {
    original: RgbaBuffer,
    background: Rgb,
}

impl ThresholdPreview {
    /// Snapshot `image` and detect its background once.
    pub fn new(image: &RgbaBuffer, sample_step: u32) -> Result<Self, SegmentationError> {
        let background = detect_background_color(image, sample_step)?;
        Ok(Self {
            original: image.clone(),
            background,
        })
    }

    pub fn background(&self) -> Rgb {
        self.background
    }

    pub fn original(&self) -> &RgbaBuffer {
        &self.original
    }

    /// Classify the cached pixels at `threshold` into a fresh buffer.
    pub fn preview(&self, threshold: f32) -> Segmentation {
        let threshold = clamp_threshold(threshold);
        let (image, removed) = classify(&self.original, self.background, threshold);
        Segmentation {
            image,
            background: self.background,
            transparent_pixels: removed,
            method: SegmentationMethod::EdgeSampled { threshold },
        }
    }

    /// Final classification at `threshold`, consuming the cache.
    pub fn commit(self, threshold: f32) -> Segmentation {
        let threshold = clamp_threshold(threshold);
        let (image, removed) = classify(&self.original, self.background, threshold);
        log::info!(
            "Committed segmentation at threshold {}: {} pixels removed",
            threshold,
            removed
        );
        Segmentation {
            image,
            background: self.background,
            transparent_pixels: removed,
            method: SegmentationMethod::EdgeSampled { threshold },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Rgba;

    const WHITE: Rgba = Rgba::new(255, 255, 255, 255);
    const BLACK: Rgba = Rgba::new(0, 0, 0, 255);

    /// White frame with a black block in the middle.
    pub(super) fn framed(w: u32, h: u32, border: u32) -> RgbaBuffer {
        let mut img = RgbaBuffer::filled(w, h, WHITE);
        for y in border..h - border {
            for x in border..w - border {
                img.put_pixel(x, y, BLACK);
            }
        }
        img
    }

    #[test]
    fn test_white_border_black_subject() {
        let img = framed(40, 30, 5);
        let seg = remove_background(&img, 35.0, 5).unwrap();
        assert_eq!(seg.background, Rgb::WHITE);

        for y in 0..30 {
            for x in 0..40 {
                let px = seg.image.pixel(x, y).unwrap();
                let subject = (5..35).contains(&x) && (5..25).contains(&y);
                assert_eq!(px.a, if subject { 255 } else { 0 }, "at ({}, {})", x, y);
            }
        }
        assert_eq!(seg.transparent_pixels, 40 * 30 - 30 * 20);
    }

    #[test]
    fn test_sampling_every_fifth_border_pixel() {
        // Only x = 0, 5, 10 on the top row are red
        let mut img = RgbaBuffer::filled(11, 11, Rgba::new(0, 0, 0, 255));
        for x in [0, 5, 10] {
            img.put_pixel(x, 0, Rgba::new(255, 0, 0, 255));
        }
        let color = detect_background_color(&img, 5).unwrap();
        // 12 samples: 3 top red, 3 bottom, 3 left (one red corner), 3 right (one red corner)
        assert_eq!(color, Rgb::new((5.0f64 * 255.0 / 12.0).round() as u8, 0, 0));
    }

    #[test]
    fn test_mean_is_rounded() {
        let mut img = RgbaBuffer::filled(1, 2, Rgba::new(10, 0, 0, 255));
        img.put_pixel(0, 1, Rgba::new(11, 0, 0, 255));
        // samples: top (10), bottom (11), left y=0 (10), right y=0 (10)
        let color = detect_background_color(&img, 5).unwrap();
        assert_eq!(color.r, 10);
    }

    #[test]
    fn test_distance_equal_to_threshold_is_kept() {
        let img = RgbaBuffer::filled(1, 1, Rgba::new(30, 40, 0, 255));
        // distance from black = 50
        let (out, removed) = classify(&img, Rgb::BLACK, 50.0);
        assert_eq!(removed, 0);
        assert_eq!(out.pixel(0, 0).unwrap().a, 255);

        let (out, removed) = classify(&img, Rgb::BLACK, 50.01);
        assert_eq!(removed, 1);
        assert_eq!(out.pixel(0, 0).unwrap().a, 0);
    }

    #[test]
    fn test_threshold_extremes() {
        let img = framed(10, 10, 2);
        let (_, none) = classify(&img, Rgb::WHITE, 0.0);
        assert_eq!(none, 0);
        let (all, count) = classify(&img, Rgb::WHITE, 442.0);
        assert_eq!(count, 100);
        assert_eq!(all.transparent_count(), 100);
    }

    #[test]
    fn test_empty_image_errors() {
        let img = RgbaBuffer::new(0, 0);
        assert_eq!(detect_background_color(&img, 5), Err(SegmentationError::EmptyImage));
        assert!(remove_background(&img, 35.0, 5).is_err());
    }

    #[test]
    fn test_preview_does_not_touch_source() {
        let img = framed(20, 20, 4);
        let snapshot = img.clone();
        let preview = ThresholdPreview::new(&img, 5).unwrap();
        let low = preview.preview(10.0);
        let high = preview.preview(100.0);
        assert_eq!(img, snapshot);
        assert_eq!(preview.original(), &snapshot);
        assert!(high.transparent_pixels >= low.transparent_pixels);
    }

    #[test]
    fn test_preview_clamps_threshold() {
        let img = framed(20, 20, 4);
        let preview = ThresholdPreview::new(&img, 5).unwrap();
        let seg = preview.preview(1000.0);
        assert_eq!(seg.method, SegmentationMethod::EdgeSampled { threshold: 100.0 });
        assert_eq!(seg.transparent_pixels, 20 * 20 - 12 * 12);
    }

    #[test]
    fn test_commit_matches_preview() {
        let img = framed(20, 20, 4);
        let preview = ThresholdPreview::new(&img, 5).unwrap();
        let shown = preview.preview(42.0);
        let committed = preview.commit(42.0);
        assert_eq!(shown, committed);
    }

    #[test]
    fn test_segmentation_always_transparent_on_uniform_border() {
        let img = framed(30, 30, 3);
        let seg = remove_background(&img, 10.0, 5).unwrap();
        assert!(seg.image.has_transparency());
    }
}
