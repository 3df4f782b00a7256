//! Planar homography estimation for the image-to-court mapping.
//!
//! Estimation is normalized DLT over 4-point subsets with an inlier
//! tolerance on reprojection error, tolerating the click imprecision of
//! manual calibration. Correspondence counts here are tiny, so subsets are
//! enumerated deterministically instead of randomly sampled.

use nalgebra::{DMatrix, Matrix3, Point2, Vector3};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HomographyError {
    #[error("homography estimation needs at least 4 correspondences, got {0}")]
    NotEnoughPoints(usize),
    #[error("source and destination point counts differ ({src} vs {dst})")]
    MismatchedPoints { src: usize, dst: usize },
    #[error("degenerate point configuration, no stable homography exists")]
    Degenerate,
}

/// Robust estimation parameters.
#[derive(Debug, Clone)]
pub struct RansacConfig {
    /// Maximum reprojection error in pixels for a correspondence to count
    /// as an inlier.
    pub tolerance: f64,
    /// Minimum number of inliers for the estimate to be accepted.
    pub min_inliers: usize,
}

impl Default for RansacConfig {
    fn default() -> Self {
        Self {
            tolerance: 5.0,
            min_inliers: 4,
        }
    }
}

/// 3×3 projective transform between two planar views.
#[derive(Debug, Clone)]
pub struct Homography {
    matrix: Matrix3<f64>,
}

impl Homography {
    /// Estimate the homography mapping `src` points onto `dst` points.
    pub fn estimate(
        src: &[Point2<f64>],
        dst: &[Point2<f64>],
        config: &RansacConfig,
    ) -> Result<Self, HomographyError> {
        if src.len() != dst.len() {
            return Err(HomographyError::MismatchedPoints {
                src: src.len(),
                dst: dst.len(),
            });
        }
        if src.len() < 4 {
            return Err(HomographyError::NotEnoughPoints(src.len()));
        }

        let mut best: Option<(Vec<usize>, f64)> = None;
        for subset in four_subsets(src.len()) {
            let sub_src: Vec<_> = subset.iter().map(|&i| src[i]).collect();
            let sub_dst: Vec<_> = subset.iter().map(|&i| dst[i]).collect();
            let Some(candidate) = dlt(&sub_src, &sub_dst) else {
                continue;
            };
            let candidate = Homography { matrix: candidate };

            let mut inliers = Vec::new();
            let mut total_error = 0.0;
            for i in 0..src.len() {
                let error = (candidate.project(src[i]) - dst[i]).norm();
                if error <= config.tolerance {
                    inliers.push(i);
                    total_error += error;
                }
            }

            let better = match &best {
                None => true,
                Some((best_inliers, best_error)) => {
                    inliers.len() > best_inliers.len()
                        || (inliers.len() == best_inliers.len() && total_error < *best_error)
                }
            };
            if better && !inliers.is_empty() {
                best = Some((inliers, total_error));
            }
        }

        let (inliers, _) = best.ok_or(HomographyError::Degenerate)?;
        if inliers.len() < config.min_inliers.max(4) {
            return Err(HomographyError::Degenerate);
        }

        // Refit on the full inlier set.
        let in_src: Vec<_> = inliers.iter().map(|&i| src[i]).collect();
        let in_dst: Vec<_> = inliers.iter().map(|&i| dst[i]).collect();
        let matrix = dlt(&in_src, &in_dst).ok_or(HomographyError::Degenerate)?;
        Ok(Self { matrix })
    }

    /// Project a point through the transform.
    pub fn project(&self, point: Point2<f64>) -> Point2<f64> {
        let v = self.matrix * Vector3::new(point.x, point.y, 1.0);
        Point2::new(v.x / v.z, v.y / v.z)
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }
}

/// Intersection of the line through `p1`,`p2` with the line through
/// `q1`,`q2`, via homogeneous cross products. `None` for parallel lines.
pub fn line_intersection(
    p1: Point2<f64>,
    p2: Point2<f64>,
    q1: Point2<f64>,
    q2: Point2<f64>,
) -> Option<Point2<f64>> {
    let to_h = |p: Point2<f64>| Vector3::new(p.x, p.y, 1.0);
    let line_a = to_h(p1).cross(&to_h(p2));
    let line_b = to_h(q1).cross(&to_h(q2));
    let meet = line_a.cross(&line_b);
    if meet.z.abs() < 1e-12 {
        return None;
    }
    Some(Point2::new(meet.x / meet.z, meet.y / meet.z))
}

/// Normalized direct linear transform. `None` on degenerate input.
fn dlt(src: &[Point2<f64>], dst: &[Point2<f64>]) -> Option<Matrix3<f64>> {
    let (t_src, norm_src) = normalize(src)?;
    let (t_dst, norm_dst) = normalize(dst)?;

    let mut a = DMatrix::<f64>::zeros(2 * norm_src.len(), 9);
    for (i, (s, d)) in norm_src.iter().zip(norm_dst.iter()).enumerate() {
        let (x, y) = (s.x, s.y);
        let (u, v) = (d.x, d.y);
        let rows = [
            [-x, -y, -1.0, 0.0, 0.0, 0.0, u * x, u * y, u],
            [0.0, 0.0, 0.0, -x, -y, -1.0, v * x, v * y, v],
        ];
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                a[(2 * i + r, c)] = *value;
            }
        }
    }

    // The solution is the right-singular vector of A for the smallest
    // singular value, equivalently the eigenvector of AᵀA for the smallest
    // eigenvalue. The eigendecomposition keeps the full 9-dimensional basis
    // even when A has fewer than 9 rows.
    let ata = a.transpose() * &a;
    let eigen = nalgebra::SymmetricEigen::new(ata);
    let (min_index, _) = eigen
        .eigenvalues
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(b.1))?;
    let h = eigen.eigenvectors.column(min_index);
    let normalized = Matrix3::new(h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], h[8]);

    let t_dst_inv = t_dst.try_inverse()?;
    let mut matrix = t_dst_inv * normalized * t_src;

    let frobenius = matrix.norm();
    if frobenius < 1e-12 {
        return None;
    }
    matrix /= frobenius;

    // Collinear configurations yield a rank-deficient transform.
    if matrix.determinant().abs() < 1e-9 {
        return None;
    }
    if matrix[(2, 2)].abs() > 1e-12 {
        matrix /= matrix[(2, 2)];
    }
    Some(matrix)
}

/// Hartley normalization: centroid to the origin, mean distance √2.
fn normalize(points: &[Point2<f64>]) -> Option<(Matrix3<f64>, Vec<Point2<f64>>)> {
    let n = points.len() as f64;
    let cx = points.iter().map(|p| p.x).sum::<f64>() / n;
    let cy = points.iter().map(|p| p.y).sum::<f64>() / n;

    let mean_dist = points
        .iter()
        .map(|p| ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt())
        .sum::<f64>()
        / n;
    if mean_dist < 1e-9 {
        // All points coincide.
        return None;
    }

    let scale = std::f64::consts::SQRT_2 / mean_dist;
    let transform = Matrix3::new(
        scale,
        0.0,
        -scale * cx,
        0.0,
        scale,
        -scale * cy,
        0.0,
        0.0,
        1.0,
    );
    let transformed = points
        .iter()
        .map(|p| Point2::new(scale * (p.x - cx), scale * (p.y - cy)))
        .collect();
    Some((transform, transformed))
}

/// All 4-element index subsets of `0..n`, in lexicographic order.
fn four_subsets(n: usize) -> Vec<[usize; 4]> {
    let mut subsets = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            for k in (j + 1)..n {
                for l in (k + 1)..n {
                    subsets.push([i, j, k, l]);
                }
            }
        }
    }
    subsets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Vec<Point2<f64>> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(100.0, 0.0),
            Point2::new(100.0, 100.0),
            Point2::new(0.0, 100.0),
        ]
    }

    #[test]
    fn test_identity_mapping() {
        let points = unit_square();
        let h = Homography::estimate(&points, &points, &RansacConfig::default()).unwrap();
        for p in &points {
            assert!((h.project(*p) - *p).norm() < 1e-6);
        }
        let mid = Point2::new(50.0, 50.0);
        assert!((h.project(mid) - mid).norm() < 1e-6);
    }

    #[test]
    fn test_translation_round_trip() {
        let src = unit_square();
        let dst: Vec<_> = src.iter().map(|p| Point2::new(p.x + 30.0, p.y - 12.0)).collect();
        let config = RansacConfig::default();
        let h = Homography::estimate(&src, &dst, &config).unwrap();
        for (s, d) in src.iter().zip(dst.iter()) {
            assert!((h.project(*s) - *d).norm() < config.tolerance);
        }
    }

    #[test]
    fn test_perspective_warp() {
        let src = unit_square();
        let dst = vec![
            Point2::new(10.0, 5.0),
            Point2::new(90.0, 12.0),
            Point2::new(80.0, 95.0),
            Point2::new(5.0, 88.0),
        ];
        let h = Homography::estimate(&src, &dst, &RansacConfig::default()).unwrap();
        for (s, d) in src.iter().zip(dst.iter()) {
            assert!((h.project(*s) - *d).norm() < 1e-6);
        }
    }

    #[test]
    fn test_too_few_points() {
        let points = vec![Point2::new(0.0, 0.0); 3];
        let err = Homography::estimate(&points, &points, &RansacConfig::default()).unwrap_err();
        assert!(matches!(err, HomographyError::NotEnoughPoints(3)));
    }

    #[test]
    fn test_collinear_points_degenerate() {
        let src: Vec<_> = (0..4).map(|i| Point2::new(i as f64 * 10.0, 0.0)).collect();
        let dst = unit_square();
        let err = Homography::estimate(&src, &dst, &RansacConfig::default()).unwrap_err();
        assert!(matches!(err, HomographyError::Degenerate));
    }

    #[test]
    fn test_line_intersection() {
        let p = line_intersection(
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
            Point2::new(10.0, 0.0),
        )
        .unwrap();
        assert!((p - Point2::new(5.0, 5.0)).norm() < 1e-9);
    }

    #[test]
    fn test_parallel_lines_do_not_intersect() {
        let meet = line_intersection(
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(0.0, 5.0),
            Point2::new(10.0, 5.0),
        );
        assert!(meet.is_none());
    }
}
