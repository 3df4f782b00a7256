//! Floor-bounce detection from the projected ball path.
//!
//! The ball's image position is projected onto the top-down court plane
//! through a homography established once from manual calibration clicks.
//! A bounce shows up as the projected y-coordinate rising to a peak and
//! falling again; a refractory cooldown keeps secondary contacts (side
//! wall then floor, double bounces) within the same exchange from being
//! counted twice.

use nalgebra::Point2;
use thiserror::Error;
use tracing::debug;

use crate::vision::court::CourtModel;
use crate::vision::history::SlidingWindow;
use crate::vision::homography::{Homography, HomographyError, RansacConfig, line_intersection};
use crate::vision::rect::Rect;

/// Slots of projected-path history used for peak detection.
const PATH_WINDOW: usize = 5;

/// Raw calibration clicks in frame-pixel space: the four visible corners
/// of the service boxes' inner columns plus two points on the back-court
/// boundary line. Click order does not matter.
#[derive(Debug, Clone)]
pub struct CourtCalibration {
    pub service_box: [Point2<f64>; 4],
    pub back_boundary: [Point2<f64>; 2],
}

#[derive(Debug, Error)]
pub enum CalibrationError {
    #[error("failed to compute court homography: {0}")]
    Homography(#[from] HomographyError),
    #[error("a service-box line is parallel to the back-court boundary")]
    ParallelBoundary,
}

#[derive(Debug, Clone)]
pub struct BounceConfig {
    /// Frames that must pass after a bounce before another can register.
    /// Tuned for 60fps footage: two genuine floor bounces cannot follow
    /// one another within about 1.3 seconds.
    pub cooldown_frames: i32,
    /// Homography estimation parameters.
    pub ransac: RansacConfig,
}

impl Default for BounceConfig {
    fn default() -> Self {
        Self {
            cooldown_frames: 80,
            ransac: RansacConfig::default(),
        }
    }
}

/// Detects floor bounces and locates them on the court plane.
pub struct BounceDetector {
    config: BounceConfig,
    homography: Homography,
    /// Projected ball path, oldest first.
    path: SlidingWindow<(f64, f64)>,
    cooldown_counter: i32,
    /// Projected y-values beyond the court drawing are rejected.
    valid_y_max: f64,
}

impl BounceDetector {
    /// Build the detector from raw calibration clicks.
    ///
    /// The physically meaningful lower reference points are where the
    /// service-box lines meet the back boundary, which is hard to click
    /// precisely but easy to derive: each side's box line is intersected
    /// with the boundary line, and the corresponding court-plane
    /// destinations are remapped to the back-boundary height. The
    /// resulting homography maps any point in the back portion of the
    /// court directly onto the court drawing.
    pub fn new(
        calibration: &CourtCalibration,
        court: &CourtModel,
        config: BounceConfig,
    ) -> Result<Self, CalibrationError> {
        let [left_lower, left_upper, right_upper, right_lower] =
            reorder_box_clicks(&calibration.service_box);
        let (boundary_left, boundary_right) = {
            let [a, b] = calibration.back_boundary;
            if a.x <= b.x { (a, b) } else { (b, a) }
        };

        let src = [
            line_intersection(left_lower, left_upper, boundary_left, boundary_right)
                .ok_or(CalibrationError::ParallelBoundary)?,
            left_upper,
            right_upper,
            line_intersection(right_upper, right_lower, boundary_left, boundary_right)
                .ok_or(CalibrationError::ParallelBoundary)?,
        ];

        // Destination corners remapped: lower pair onto the back boundary,
        // upper pair onto the short line.
        let mut dst = court.calibration_points();
        dst[0].y = court.side_wall_len() as f64;
        dst[1].y = court.short_line_y() as f64;
        dst[2].y = court.short_line_y() as f64;
        dst[3].y = court.side_wall_len() as f64;

        let homography = Homography::estimate(&src, &dst, &config.ransac)?;

        let mut path = SlidingWindow::new(PATH_WINDOW);
        for _ in 0..PATH_WINDOW {
            path.push((0.0, 0.0));
        }

        Ok(Self {
            config,
            homography,
            path,
            cooldown_counter: 0,
            valid_y_max: court.side_wall_len() as f64,
        })
    }

    /// Project a frame-space point onto the court plane.
    pub fn project(&self, x: f64, y: f64) -> (f64, f64) {
        let p = self.homography.project(Point2::new(x, y));
        (p.x, p.y)
    }

    /// Feed the ball rectangle selected for this frame.
    ///
    /// Projects its ground-contact point into court space, appends it to
    /// the path history and advances the cooldown.
    pub fn update_contour_data(&mut self, contour: &Rect) {
        let (cx, cy) = contour.center();
        let projected = self.project(cx as f64, cy as f64);
        self.cooldown_counter -= 1;
        self.path.push(projected);
    }

    /// Whether a bounce just occurred.
    ///
    /// Armed only once the cooldown has expired. A bounce requires every
    /// buffered projected y to lie inside the court drawing and the
    /// sequence to rise to a single peak at the middle slot and fall
    /// again, the signature of the vertical trajectory at the bounce
    /// instant. A positive detection rearms the cooldown.
    pub fn bounced(&mut self) -> bool {
        if self.cooldown_counter >= 0 {
            return false;
        }

        if self.path.iter().any(|&(_, y)| y < 0.0 || y > self.valid_y_max) {
            // Off-screen or extreme perspective distortion.
            return false;
        }

        let ys: Vec<f64> = self.path.iter().map(|&(_, y)| y).collect();
        let peaked =
            ys[0] <= ys[1] && ys[1] < ys[2] && ys[2] > ys[3] && ys[3] >= ys[4];
        if peaked {
            debug!(location = ?self.last_bounce_location(), "floor bounce detected");
            self.cooldown_counter = self.config.cooldown_frames;
            return true;
        }
        false
    }

    /// Court-plane location of the bounce just detected.
    ///
    /// Valid only immediately after [`bounced`](Self::bounced) returned
    /// true. The middle buffered position is returned rather than the
    /// newest: by the time the rise-then-fall pattern is confirmed, the
    /// true bounce instant is the peak, a few frames behind.
    pub fn last_bounce_location(&self) -> (f32, f32) {
        let &(x, y) = self
            .path
            .get(PATH_WINDOW / 2)
            .expect("path history is seeded at construction");
        (x as f32, y as f32)
    }
}

/// Order raw service-box clicks as left-lower, left-upper, right-upper,
/// right-lower. Image y grows downward, so "lower" is the larger y.
fn reorder_box_clicks(clicks: &[Point2<f64>; 4]) -> [Point2<f64>; 4] {
    let mut by_x = *clicks;
    by_x.sort_by(|a, b| a.x.total_cmp(&b.x));

    let (left_lower, left_upper) = if by_x[0].y >= by_x[1].y {
        (by_x[0], by_x[1])
    } else {
        (by_x[1], by_x[0])
    };
    let (right_lower, right_upper) = if by_x[2].y >= by_x[3].y {
        (by_x[2], by_x[3])
    } else {
        (by_x[3], by_x[2])
    };
    [left_lower, left_upper, right_upper, right_lower]
}
