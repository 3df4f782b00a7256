//! Motion segmentation via triple-frame differencing.
//!
//! Three consecutive grayscale frames give two consecutive difference
//! images; genuine motion shows a consistent signal in both differencing
//! steps, so AND-combining them suppresses flicker and sensor noise that
//! appears in only one. The combined image is thresholded and closed into
//! solid foreground blobs: the moving players and the ball.

use image::{GrayImage, Luma, RgbImage};
use imageproc::contrast::{ThresholdType, otsu_level, threshold};
use imageproc::distance_transform::Norm;
use imageproc::filter::gaussian_blur_f32;
use imageproc::map::map_colors2;
use imageproc::morphology::{dilate, erode};
use tracing::debug;

use crate::vision::history::SlidingWindow;

/// Tuning knobs for the foreground extractor.
///
/// Defaults match the values tuned for 60fps squash footage.
#[derive(Debug, Clone)]
pub struct ForegroundConfig {
    /// Gaussian blur sigma applied to each grayscale frame.
    pub blur_sigma: f32,
    /// Dilation radius of the morphological closing step.
    pub close_iterations: u8,
    /// Otsu levels at or below this are treated as degenerate.
    pub otsu_floor: u8,
    /// Fixed threshold used when Otsu collapses.
    pub fallback_threshold: u8,
    /// Pixel changes below this are treated as flicker and damped.
    pub deflicker_cutoff: u8,
}

impl Default for ForegroundConfig {
    fn default() -> Self {
        Self {
            blur_sigma: 1.1,
            close_iterations: 13,
            otsu_floor: 8,
            fallback_threshold: 24,
            deflicker_cutoff: 16,
        }
    }
}

/// Extracts the moving foreground from the static background.
pub struct ForegroundExtractor {
    config: ForegroundConfig,
    /// Smoothed grayscale frames, oldest first.
    frames: SlidingWindow<GrayImage>,
    /// Consecutive frame differences, oldest first.
    differences: SlidingWindow<GrayImage>,
    prev_deflicker: Option<GrayImage>,
}

impl ForegroundExtractor {
    pub fn new(config: ForegroundConfig) -> Self {
        Self {
            config,
            frames: SlidingWindow::new(3),
            differences: SlidingWindow::new(2),
            prev_deflicker: None,
        }
    }

    /// Whether the frame window is full and [`process`](Self::process) may
    /// be called.
    pub fn ready(&self) -> bool {
        self.frames.is_full()
    }

    /// Buffer a warm-up frame. Produces no output.
    pub fn initialize_with(&mut self, frame: &RgbImage) {
        self.buffer_frame(frame);
    }

    /// Segment the moving foreground of `frame` into a binary mask.
    ///
    /// # Panics
    /// Panics unless [`ready`](Self::ready) is true; the caller owns the
    /// warm-up via [`initialize_with`](Self::initialize_with).
    pub fn process(&mut self, frame: &RgbImage) -> GrayImage {
        assert!(self.ready(), "foreground extractor called before warm-up");

        self.buffer_frame(frame);

        // Difference of the two newest frames; the buffered older
        // difference covers the preceding pair.
        let difference = absdiff(
            self.frames.get(1).expect("frame window is full"),
            self.frames.get(2).expect("frame window is full"),
        );
        self.differences.push(difference);

        let combined = bitand(
            self.differences.front().expect("difference window seeded"),
            self.differences.back().expect("difference window seeded"),
        );

        let level = otsu_level(&combined);
        let thresholded = if level <= self.config.otsu_floor {
            // Too little foreground signal for the histogram split to be
            // meaningful; fall back to a fixed threshold.
            debug!(level, "otsu collapse, using fixed threshold");
            threshold(&combined, self.config.fallback_threshold, ThresholdType::Binary)
        } else {
            threshold(&combined, level, ThresholdType::Binary)
        };

        self.close(&thresholded)
    }

    /// Grayscale, deflicker and blur `frame`, then append it to the frame
    /// window, priming the difference window once two frames exist.
    fn buffer_frame(&mut self, frame: &RgbImage) {
        let gray = image::imageops::grayscale(frame);
        let gray = self.deflicker(gray);
        let smoothed = gaussian_blur_f32(&gray, self.config.blur_sigma);
        self.frames.push(smoothed);

        // Frame differencing needs two frames; prime the first difference
        // as soon as they exist so process() always has a pair to combine.
        if self.frames.len() == 2 {
            let primed = absdiff(
                self.frames.get(0).expect("two frames buffered"),
                self.frames.get(1).expect("two frames buffered"),
            );
            self.differences.push(primed);
        }
    }

    /// Damp sub-threshold intensity changes between consecutive frames.
    ///
    /// Pixels that moved less than the cutoff since the previous frame are
    /// pulled to within one intensity step of their previous value, removing
    /// lighting flicker that frame differencing would otherwise pick up.
    fn deflicker(&mut self, mut frame: GrayImage) -> GrayImage {
        match &self.prev_deflicker {
            None => {
                self.prev_deflicker = Some(frame.clone());
                frame
            }
            Some(prev) => {
                for (current, previous) in frame.pixels_mut().zip(prev.pixels()) {
                    let cur = current.0[0];
                    let prv = previous.0[0];
                    if cur.abs_diff(prv) < self.config.deflicker_cutoff {
                        current.0[0] = if cur > prv {
                            prv.saturating_add(1)
                        } else {
                            prv.saturating_sub(1)
                        };
                    }
                }
                self.prev_deflicker = Some(frame.clone());
                frame
            }
        }
    }

    /// Morphological closing: heavy dilation to consolidate fragmented
    /// blobs, then a single erosion pass.
    fn close(&self, image: &GrayImage) -> GrayImage {
        let dilated = dilate(image, Norm::LInf, self.config.close_iterations);
        erode(&dilated, Norm::LInf, 1)
    }
}

/// Per-pixel absolute difference of two grayscale images.
fn absdiff(a: &GrayImage, b: &GrayImage) -> GrayImage {
    map_colors2(a, b, |p, q| Luma([p.0[0].abs_diff(q.0[0])]))
}

/// Per-pixel bitwise AND of two grayscale images.
fn bitand(a: &GrayImage, b: &GrayImage) -> GrayImage {
    map_colors2(a, b, |p, q| Luma([p.0[0] & q.0[0]]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn flat_frame(w: u32, h: u32, value: u8) -> RgbImage {
        RgbImage::from_pixel(w, h, Rgb([value, value, value]))
    }

    /// Frame with a bright square at (x, y).
    fn frame_with_square(w: u32, h: u32, x: u32, y: u32, size: u32) -> RgbImage {
        let mut frame = flat_frame(w, h, 10);
        for dy in 0..size {
            for dx in 0..size {
                if x + dx < w && y + dy < h {
                    frame.put_pixel(x + dx, y + dy, Rgb([250, 250, 250]));
                }
            }
        }
        frame
    }

    #[test]
    fn test_not_ready_until_three_frames() {
        let mut extractor = ForegroundExtractor::new(ForegroundConfig::default());
        assert!(!extractor.ready());
        extractor.initialize_with(&flat_frame(64, 64, 10));
        assert!(!extractor.ready());
        extractor.initialize_with(&flat_frame(64, 64, 10));
        assert!(!extractor.ready());
        extractor.initialize_with(&flat_frame(64, 64, 10));
        assert!(extractor.ready());
    }

    #[test]
    #[should_panic]
    fn test_process_before_ready_panics() {
        let mut extractor = ForegroundExtractor::new(ForegroundConfig::default());
        extractor.process(&flat_frame(64, 64, 10));
    }

    #[test]
    fn test_identical_frames_give_empty_mask() {
        let mut extractor = ForegroundExtractor::new(ForegroundConfig::default());
        let frame = flat_frame(64, 64, 120);
        for _ in 0..3 {
            extractor.initialize_with(&frame);
        }
        let mask = extractor.process(&frame);
        assert!(mask.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn test_moving_square_produces_foreground() {
        let config = ForegroundConfig {
            close_iterations: 3,
            ..ForegroundConfig::default()
        };
        let mut extractor = ForegroundExtractor::new(config);
        for i in 0..3u32 {
            extractor.initialize_with(&frame_with_square(128, 128, 20 + i * 8, 40, 10));
        }
        let mask = extractor.process(&frame_with_square(128, 128, 44, 40, 10));
        let foreground = mask.pixels().filter(|p| p.0[0] > 0).count();
        assert!(foreground > 0, "moving square should leave a motion trace");

        // Motion is confined to the square's path, not the whole frame.
        assert!(foreground < (128 * 128) / 4);
    }
}
