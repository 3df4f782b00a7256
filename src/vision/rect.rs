/// Axis-aligned rectangle in (x, y, width, height) form.
///
/// Used uniformly for detected contours, trajectory predictions and the
/// selected ball position. Rectangles are plain values: created per
/// detection, consumed the same frame, never mutated after construction.
/// Dimensions are always non-negative; point queries use half-open bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    /// Top-left x coordinate
    pub x: f32,
    /// Top-left y coordinate
    pub y: f32,
    /// Width of the rectangle
    pub width: u32,
    /// Height of the rectangle
    pub height: u32,
}

impl Rect {
    /// Zero-sized rectangle at the origin, used as a dummy seed value.
    pub const ZERO: Rect = Rect {
        x: 0.0,
        y: 0.0,
        width: 0,
        height: 0,
    };

    #[inline]
    pub fn new(x: f32, y: f32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Area of the rectangle.
    #[inline]
    pub fn area(&self) -> u32 {
        self.width * self.height
    }

    /// Ground-contact reference point: horizontal center at the bottom edge.
    ///
    /// The bottom edge rather than the geometric middle is what gets
    /// projected onto the court plane, since the bounce happens where the
    /// ball meets the floor.
    #[inline]
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width as f32 / 2.0, self.y + self.height as f32)
    }

    /// Homogeneous variant of [`Rect::center`], for projective mapping.
    #[inline]
    pub fn center3d(&self) -> (f32, f32, f32) {
        let (cx, cy) = self.center();
        (cx, cy, 1.0)
    }

    /// Whether the point lies within the rectangle.
    ///
    /// Half-open on both axes: the left/top edges are inside, the
    /// right/bottom edges are not.
    #[inline]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x
            && x < self.x + self.width as f32
            && y >= self.y
            && y < self.y + self.height as f32
    }

    /// Euclidean distance between the two rectangles' reference centers.
    #[inline]
    pub fn center_distance(&self, other: &Rect) -> f32 {
        let (ax, ay) = self.center();
        let (bx, by) = other.center();
        ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
    }

    /// Smallest rectangle enclosing both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        let x1 = self.x.min(other.x);
        let y1 = self.y.min(other.y);
        let x2 = (self.x + self.width as f32).max(other.x + other.width as f32);
        let y2 = (self.y + self.height as f32).max(other.y + other.height as f32);
        Rect {
            x: x1,
            y: y1,
            width: (x2 - x1) as u32,
            height: (y2 - y1) as u32,
        }
    }
}

use ndarray::Array2;

/// Pairwise center distances between two sets of rectangles.
///
/// Returns a matrix of shape (M, N) where M is the length of `rects_a`
/// and N is the length of `rects_b`.
pub fn center_distance_matrix(rects_a: &[Rect], rects_b: &[Rect]) -> Array2<f32> {
    let mut dists = Array2::zeros((rects_a.len(), rects_b.len()));
    for (i, a) in rects_a.iter().enumerate() {
        for (j, b) in rects_b.iter().enumerate() {
            dists[[i, j]] = a.center_distance(b);
        }
    }
    dists
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_and_center() {
        let rect = Rect::new(10.0, 20.0, 30, 40);
        assert_eq!(rect.area(), 1200);

        // Center sits at the horizontal middle of the bottom edge.
        let (cx, cy) = rect.center();
        assert_eq!(cx, 25.0);
        assert_eq!(cy, 60.0);
        assert!(cx >= rect.x && cx < rect.x + rect.width as f32);
        assert!(cy >= rect.y && cy <= rect.y + rect.height as f32);
    }

    #[test]
    fn test_center3d() {
        let rect = Rect::new(0.0, 0.0, 10, 10);
        assert_eq!(rect.center3d(), (5.0, 10.0, 1.0));
    }

    #[test]
    fn test_contains_half_open() {
        let rect = Rect::new(10.0, 10.0, 10, 10);
        assert!(rect.contains(10.0, 10.0));
        assert!(rect.contains(19.9, 19.9));
        assert!(!rect.contains(20.0, 15.0));
        assert!(!rect.contains(15.0, 20.0));
        assert!(!rect.contains(9.9, 15.0));
    }

    #[test]
    fn test_center_distance() {
        let a = Rect::new(0.0, 0.0, 10, 0);
        let b = Rect::new(3.0, 4.0, 10, 0);
        assert!((a.center_distance(&b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_union() {
        let a = Rect::new(0.0, 0.0, 10, 10);
        let b = Rect::new(15.0, 5.0, 10, 10);
        let u = a.union(&b);
        assert_eq!(u, Rect::new(0.0, 0.0, 25, 15));
    }

    #[test]
    fn test_distance_matrix_shape() {
        let a = vec![Rect::ZERO, Rect::new(10.0, 0.0, 0, 0)];
        let b = vec![Rect::new(0.0, 10.0, 0, 0)];
        let d = center_distance_matrix(&a, &b);
        assert_eq!(d.dim(), (2, 1));
        assert!((d[[0, 0]] - 10.0).abs() < 1e-6);
    }
}
