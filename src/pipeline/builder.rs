//! Builder assembling configured pipeline components.

use crate::vision::{
    AccuracyStatistics, BounceConfig, BounceDetector, CandidateConfig, CandidateTracker,
    CourtCalibration, CourtModel, DoubleExponentialEstimator, EstimatorConfig, ForegroundConfig,
    ForegroundExtractor,
};

use super::analysis::{BallPipeline, PipelineError};
use super::source::FrameSource;

/// Builder for [`BallPipeline`].
///
/// Component configurations default to the values tuned for 60fps squash
/// footage at 360×640; only the court calibration is required.
pub struct PipelineBuilder {
    foreground: ForegroundConfig,
    candidate: CandidateConfig,
    estimator: EstimatorConfig,
    bounce: BounceConfig,
    court: CourtModel,
    calibration: CourtCalibration,
}

impl PipelineBuilder {
    pub fn new(calibration: CourtCalibration) -> Self {
        Self {
            foreground: ForegroundConfig::default(),
            candidate: CandidateConfig::default(),
            estimator: EstimatorConfig::default(),
            bounce: BounceConfig::default(),
            court: CourtModel::default(),
            calibration,
        }
    }

    pub fn foreground_config(mut self, config: ForegroundConfig) -> Self {
        self.foreground = config;
        self
    }

    pub fn candidate_config(mut self, config: CandidateConfig) -> Self {
        self.candidate = config;
        self
    }

    pub fn estimator_config(mut self, config: EstimatorConfig) -> Self {
        self.estimator = config;
        self
    }

    pub fn bounce_config(mut self, config: BounceConfig) -> Self {
        self.bounce = config;
        self
    }

    pub fn court_model(mut self, court: CourtModel) -> Self {
        self.court = court;
        self
    }

    /// Construct the pipeline and run the warm-up.
    ///
    /// Fails on a degenerate calibration or when the source ends before
    /// the foreground extractor is ready.
    pub fn build<S: FrameSource>(
        self,
        source: S,
    ) -> Result<BallPipeline<S>, PipelineError<S::Error>> {
        let bounce_detector = BounceDetector::new(&self.calibration, &self.court, self.bounce)?;
        let stats = AccuracyStatistics::new(self.court.target_zones());

        let mut pipeline = BallPipeline::new(
            source,
            ForegroundExtractor::new(self.foreground),
            CandidateTracker::new(self.candidate),
            DoubleExponentialEstimator::seeded(self.estimator),
            bounce_detector,
            stats,
        );
        pipeline.warm_up()?;
        Ok(pipeline)
    }
}
