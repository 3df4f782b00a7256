//! Pull-based per-frame analysis driver.

use thiserror::Error;

use crate::vision::{
    AccuracyStatistics, BounceDetector, CalibrationError, CandidateTracker,
    DoubleExponentialEstimator, ForegroundExtractor, Rect,
};

use super::FrameSource;

/// Result of analyzing one frame, handed to the rendering and statistics
/// collaborators.
#[derive(Debug, Clone, Copy)]
pub struct FrameAnalysis {
    /// Rectangle selected as the ball this frame.
    pub ball: Rect,
    /// One-step trajectory forecast made before selection.
    pub prediction: Rect,
    /// Court-plane bounce location, when a bounce fired this frame.
    pub bounce: Option<(f32, f32)>,
}

#[derive(Debug, Error)]
pub enum PipelineError<E> {
    #[error("frame source failed")]
    Source(E),
    #[error("frame stream ended during warm-up")]
    ExhaustedDuringWarmUp,
    #[error(transparent)]
    Calibration(#[from] CalibrationError),
}

/// The per-frame analysis chain: foreground extraction, candidate
/// selection, trajectory estimation and bounce detection, driven by
/// pulling frames from a [`FrameSource`].
///
/// Strictly single-threaded and synchronous: each stage of frame N
/// depends on the previous one, and every component owns its own history
/// privately. The caller owns pause/resume by simply not calling
/// [`process_next`](Self::process_next).
pub struct BallPipeline<S: FrameSource> {
    source: S,
    extractor: ForegroundExtractor,
    tracker: CandidateTracker,
    estimator: DoubleExponentialEstimator,
    bounce_detector: BounceDetector,
    stats: AccuracyStatistics,
}

impl<S: FrameSource> BallPipeline<S> {
    pub(crate) fn new(
        source: S,
        extractor: ForegroundExtractor,
        tracker: CandidateTracker,
        estimator: DoubleExponentialEstimator,
        bounce_detector: BounceDetector,
        stats: AccuracyStatistics,
    ) -> Self {
        Self {
            source,
            extractor,
            tracker,
            estimator,
            bounce_detector,
            stats,
        }
    }

    /// Pull frames into the foreground extractor until it is ready.
    pub fn warm_up(&mut self) -> Result<(), PipelineError<S::Error>> {
        while !self.extractor.ready() {
            match self.source.next_frame().map_err(PipelineError::Source)? {
                Some(frame) => self.extractor.initialize_with(&frame),
                None => return Err(PipelineError::ExhaustedDuringWarmUp),
            }
        }
        Ok(())
    }

    /// Process the next frame; `Ok(None)` once the stream ends.
    ///
    /// Every call yields a usable (possibly degraded) result: candidate
    /// drop-outs and tracking glitches are recovered internally by falling
    /// back to the trajectory forecast, never surfaced as errors.
    pub fn process_next(&mut self) -> Result<Option<FrameAnalysis>, PipelineError<S::Error>> {
        let Some(frame) = self.source.next_frame().map_err(PipelineError::Source)? else {
            return Ok(None);
        };

        let mask = self.extractor.process(&frame);

        let mut prediction = self.estimator.predict(1.0);
        if prediction.x < 0.0 || prediction.y < 0.0 {
            // Forecast left the frame; park the fallback rectangle just
            // outside the top-left corner instead of at a bogus position.
            prediction = Rect::new(
                -(prediction.width as f32),
                -(prediction.height as f32),
                prediction.width,
                prediction.height,
            );
        }

        let ball = self.tracker.select_most_probable_candidate(&mask, prediction);
        self.estimator.correct(ball);

        self.bounce_detector.update_contour_data(&ball);
        let bounce = if self.bounce_detector.bounced() {
            let (x, y) = self.bounce_detector.last_bounce_location();
            self.stats.record_bounce(x, y);
            Some((x, y))
        } else {
            None
        };

        Ok(Some(FrameAnalysis {
            ball,
            prediction,
            bounce,
        }))
    }

    /// Accumulated shot-placement statistics.
    pub fn statistics(&self) -> &AccuracyStatistics {
        &self.stats
    }

    /// The bounce detector, e.g. for court-plane visualization.
    pub fn bounce_detector(&self) -> &BounceDetector {
        &self.bounce_detector
    }

    /// The underlying frame source.
    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::PipelineBuilder;
    use crate::vision::CourtCalibration;
    use image::RgbImage;
    use nalgebra::Point2;

    struct MockSource {
        frames: Vec<RgbImage>,
        cursor: usize,
    }

    impl MockSource {
        fn new(count: usize) -> Self {
            Self {
                frames: (0..count).map(|_| RgbImage::new(360, 640)).collect(),
                cursor: 0,
            }
        }
    }

    impl FrameSource for MockSource {
        type Error = std::convert::Infallible;

        fn next_frame(&mut self) -> Result<Option<RgbImage>, Self::Error> {
            let frame = self.frames.get(self.cursor).cloned();
            self.cursor += 1;
            Ok(frame)
        }
    }

    fn calibration() -> CourtCalibration {
        CourtCalibration {
            service_box: [
                Point2::new(90.0, 357.0),
                Point2::new(90.0, 462.0),
                Point2::new(270.0, 462.0),
                Point2::new(270.0, 357.0),
            ],
            back_boundary: [Point2::new(0.0, 640.0), Point2::new(360.0, 640.0)],
        }
    }

    #[test]
    fn test_pipeline_consumes_stream_to_end() {
        // 3 warm-up frames + 4 processable frames.
        let mut pipeline = PipelineBuilder::new(calibration())
            .build(MockSource::new(7))
            .unwrap();

        let mut processed = 0;
        while let Some(analysis) = pipeline.process_next().unwrap() {
            assert!(analysis.bounce.is_none(), "static video cannot bounce");
            processed += 1;
        }
        assert_eq!(processed, 4);
    }

    #[test]
    fn test_short_stream_fails_warm_up() {
        let result = PipelineBuilder::new(calibration()).build(MockSource::new(2));
        assert!(matches!(
            result,
            Err(PipelineError::ExhaustedDuringWarmUp)
        ));
    }
}
