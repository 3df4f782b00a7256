mod bounce;
mod candidate;
mod court;
mod estimator;
mod foreground;
mod history;
mod homography;
mod rect;
mod stats;

pub use bounce::{BounceConfig, BounceDetector, CalibrationError, CourtCalibration};
pub use candidate::{CandidateConfig, CandidateTracker};
pub use court::CourtModel;
pub use estimator::{DoubleExponentialEstimator, EstimatorConfig};
pub use foreground::{ForegroundConfig, ForegroundExtractor};
pub use history::SlidingWindow;
pub use homography::{Homography, HomographyError, RansacConfig, line_intersection};
pub use rect::{Rect, center_distance_matrix};
pub use stats::AccuracyStatistics;
