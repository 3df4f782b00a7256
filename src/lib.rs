//! Squash ball tracking and bounce projection.
//!
//! The crate implements the per-frame analysis pipeline for squash-match
//! video: motion segmentation of the fast-moving ball, multi-candidate
//! tracking via shortest-path selection over noisy contours, double
//! exponential trajectory forecasting, and homography-based floor-bounce
//! detection projected onto a top-down court plane for shot-placement
//! statistics.
//!
//! Video decoding, calibration UI and rendering are external collaborators;
//! see [`pipeline::FrameSource`] for the frame contract.

pub mod pipeline;
pub mod vision;

pub use pipeline::{BallPipeline, FrameAnalysis, FrameSource, PipelineBuilder, PipelineError};
pub use vision::{
    BounceDetector, CandidateTracker, CourtCalibration, CourtModel, DoubleExponentialEstimator,
    ForegroundExtractor, Rect,
};
