//! Squash court geometry, scaled to the analysis frame.
//!
//! Real-world dimensions follow the WSF specification: side wall 9.75 m,
//! front wall 6.40 m, short line 5.44 m from the front wall, service boxes
//! 1.6 m squares. The model maps them into the frame's pixel space so that
//! court-plane bounce coordinates line up 1-to-1 with a court drawing at
//! the video resolution.

use nalgebra::Point2;

use crate::vision::rect::Rect;

/// WSF dimensions in centimeters.
const SIDE_WALL_CM: f32 = 975.0;
const FRONT_WALL_CM: f32 = 640.0;
const SHORT_LINE_CM: f32 = 544.0;
const SERVICE_BOX_CM: f32 = 160.0;
const BACK_COURT_CM: f32 = 261.0;

/// Court geometry in frame-pixel space.
#[derive(Debug, Clone)]
pub struct CourtModel {
    frame_width: u32,
    frame_height: u32,
    /// Vertical centimeters-to-pixels factor (side wall onto frame height).
    h_conv: f32,
    /// Horizontal centimeters-to-pixels factor (front wall onto frame width).
    w_conv: f32,
}

impl Default for CourtModel {
    fn default() -> Self {
        Self::new(360, 640)
    }
}

impl CourtModel {
    pub fn new(frame_width: u32, frame_height: u32) -> Self {
        Self {
            frame_width,
            frame_height,
            h_conv: frame_height as f32 / SIDE_WALL_CM,
            w_conv: frame_width as f32 / FRONT_WALL_CM,
        }
    }

    pub fn frame_width(&self) -> u32 {
        self.frame_width
    }

    pub fn frame_height(&self) -> u32 {
        self.frame_height
    }

    /// y-coordinate of the back of the court (the side wall length).
    pub fn side_wall_len(&self) -> f32 {
        self.frame_height as f32
    }

    /// y-coordinate of the short line.
    pub fn short_line_y(&self) -> f32 {
        (SHORT_LINE_CM * self.h_conv).trunc()
    }

    /// Pixel side lengths of a service box.
    pub fn service_box_size(&self) -> (f32, f32) {
        (
            (SERVICE_BOX_CM * self.w_conv).trunc(),
            (SERVICE_BOX_CM * self.h_conv).trunc(),
        )
    }

    /// x-coordinate of the left service box's inner edge.
    pub fn left_box_inner_x(&self) -> f32 {
        self.service_box_size().0
    }

    /// x-coordinate of the right service box's inner edge.
    pub fn right_box_inner_x(&self) -> f32 {
        self.frame_width as f32 - self.service_box_size().0
    }

    /// Top of the half-court line, on the short line.
    pub fn half_court_line_top(&self) -> Point2<f64> {
        let (box_w, _) = self.service_box_size();
        Point2::new((2.0 * box_w).trunc() as f64, self.short_line_y() as f64)
    }

    /// Bottom of the half-court line, on the back wall.
    pub fn half_court_line_bottom(&self) -> Point2<f64> {
        Point2::new(self.half_court_line_top().x, self.side_wall_len() as f64)
    }

    /// Homography destination points for the service-box calibration
    /// columns, ordered left-lower, left-upper, right-upper, right-lower.
    ///
    /// These are the inner service-box corner columns; the bounce detector
    /// remaps the lower pair onto the back boundary.
    pub fn calibration_points(&self) -> [Point2<f64>; 4] {
        let (_, box_h) = self.service_box_size();
        let left = self.left_box_inner_x() as f64;
        let right = self.right_box_inner_x() as f64;
        let upper = self.short_line_y() as f64;
        let lower = (self.short_line_y() + box_h) as f64;
        [
            Point2::new(left, lower),
            Point2::new(left, upper),
            Point2::new(right, upper),
            Point2::new(right, lower),
        ]
    }

    /// Shot-placement target zones on the backhand side of the court.
    ///
    /// A 3×3 grid behind the short line: three depth bands (service-box
    /// depth, then two halves of the back court) crossed with three width
    /// columns of decreasing size toward the side wall.
    pub fn target_zones(&self) -> Vec<Rect> {
        let (box_w, box_h) = self.service_box_size();
        let half_back = ((BACK_COURT_CM / 2.0) * self.h_conv).trunc();

        let zone1 = Rect::new(
            self.half_court_line_top().x as f32,
            self.short_line_y(),
            box_w as u32,
            box_h as u32,
        );
        let zone2 = Rect::new(
            zone1.x,
            zone1.y + zone1.height as f32,
            zone1.width,
            half_back as u32,
        );
        let zone3 = Rect::new(
            zone1.x,
            zone2.y + zone2.height as f32,
            zone2.width,
            half_back as u32 + 8,
        );

        let mut zones = vec![zone1, zone2, zone3];
        let column_widths = [
            ((SERVICE_BOX_CM - 30.0) * self.w_conv).trunc() as u32,
            (40.0 * self.w_conv).trunc() as u32,
        ];
        for width in column_widths {
            let parent = *zones.last().expect("zones seeded with depth bands");
            for depth in 0..3 {
                zones.push(Rect::new(
                    parent.x + parent.width as f32,
                    zones[depth].y,
                    width,
                    zones[depth].height,
                ));
            }
        }
        zones
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_frame_scaling() {
        let court = CourtModel::default();
        assert_eq!(court.short_line_y(), 357.0);
        assert_eq!(court.side_wall_len(), 640.0);
        assert_eq!(court.service_box_size(), (90.0, 105.0));
        assert_eq!(court.left_box_inner_x(), 90.0);
        assert_eq!(court.right_box_inner_x(), 270.0);
    }

    #[test]
    fn test_calibration_point_ordering() {
        let court = CourtModel::default();
        let [ll, lu, ru, rl] = court.calibration_points();
        assert!(ll.x < ru.x);
        assert!(lu.y < ll.y, "upper points sit closer to the front wall");
        assert_eq!(ll.x, lu.x);
        assert_eq!(ru.x, rl.x);
        assert_eq!(lu.y, ru.y);
    }

    #[test]
    fn test_target_zone_grid() {
        let court = CourtModel::default();
        let zones = court.target_zones();
        assert_eq!(zones.len(), 9);

        // All zones lie behind the short line, on the backhand side of the
        // half-court line, and end at the back wall.
        for zone in &zones {
            assert!(zone.y >= court.short_line_y());
            assert!(zone.x >= court.half_court_line_top().x as f32);
            assert!(zone.y + zone.height as f32 <= court.side_wall_len());
        }

        // First depth band matches the service box footprint.
        assert_eq!(zones[0], Rect::new(180.0, 357.0, 90, 105));
    }
}
