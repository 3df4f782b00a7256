//! Double exponential (Holt linear trend) trajectory forecasting.
//!
//! Tracks a smoothed level and a trend estimate per coordinate axis:
//!
//! ```text
//! smoothed = alpha * obs + (1 - alpha) * (prev_smoothed + prev_trend)
//! trend    = beta * (smoothed - prev_smoothed) + (1 - beta) * prev_trend
//! forecast = smoothed + t * trend
//! ```
//!
//! References:
//! - <https://en.wikipedia.org/wiki/Exponential_smoothing#Double_exponential_smoothing>
//! - <https://www.itl.nist.gov/div898/handbook/pmc/section4/pmc433.htm>

use crate::vision::history::SlidingWindow;
use crate::vision::rect::Rect;

/// Smoothing factors, both in `[0, 1]`.
///
/// A higher data factor trusts new observations more; the defaults are
/// tuned empirically for 60fps-class footage.
#[derive(Debug, Clone)]
pub struct EstimatorConfig {
    pub data_smoothing_factor: f32,
    pub trend_smoothing_factor: f32,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            data_smoothing_factor: 0.9,
            trend_smoothing_factor: 0.25,
        }
    }
}

/// Predictor/corrector for the ball position.
///
/// The entire cross-frame memory of the estimator is the previous smoothed
/// position and the previous trend vector.
pub struct DoubleExponentialEstimator {
    config: EstimatorConfig,
    positions: SlidingWindow<Rect>,
    previous_smoothed: (f32, f32),
    previous_trend: (f32, f32),
}

impl DoubleExponentialEstimator {
    /// Create an estimator seeded with two initial observations.
    ///
    /// The level starts at `initial`'s position and the trend at the
    /// offset from `initial` to `next`.
    pub fn new(config: EstimatorConfig, initial: Rect, next: Rect) -> Self {
        let mut positions = SlidingWindow::new(2);
        positions.push(initial);
        positions.push(next);
        Self {
            config,
            positions,
            previous_smoothed: (initial.x, initial.y),
            previous_trend: (next.x - initial.x, next.y - initial.y),
        }
    }

    /// Estimator seeded with a pair of zero rectangles, for pipeline
    /// start-up before any real observation exists.
    pub fn seeded(config: EstimatorConfig) -> Self {
        Self::new(config, Rect::ZERO, Rect::ZERO)
    }

    /// Record an observed ball position.
    pub fn correct(&mut self, position: Rect) {
        self.positions.push(position);
    }

    /// Forecast the ball position `t` time-steps ahead.
    ///
    /// Fractional time-steps are supported; `t = 1.0` forecasts the next
    /// frame. Each call advances the smoothed/trend state, so repeated
    /// predictions without corrections coast along the current trend.
    /// Width and height are carried through from the latest observation.
    pub fn predict(&mut self, t: f32) -> Rect {
        let observed = *self.positions.back().expect("estimator is always seeded");

        let (prev_smoothed_x, prev_smoothed_y) = self.previous_smoothed;
        let (prev_trend_x, prev_trend_y) = self.previous_trend;

        let smoothed_x = self.smoothed_value(observed.x, prev_smoothed_x, prev_trend_x);
        let smoothed_y = self.smoothed_value(observed.y, prev_smoothed_y, prev_trend_y);

        let trend_x = self.trend_estimate(smoothed_x, prev_smoothed_x, prev_trend_x);
        let trend_y = self.trend_estimate(smoothed_y, prev_smoothed_y, prev_trend_y);

        self.previous_smoothed = (smoothed_x, smoothed_y);
        self.previous_trend = (trend_x, trend_y);

        Rect::new(
            smoothed_x + t * trend_x,
            smoothed_y + t * trend_y,
            observed.width,
            observed.height,
        )
    }

    fn smoothed_value(&self, observed: f32, prev_smoothed: f32, prev_trend: f32) -> f32 {
        let alpha = self.config.data_smoothing_factor;
        alpha * observed + (1.0 - alpha) * (prev_smoothed + prev_trend)
    }

    fn trend_estimate(&self, smoothed: f32, prev_smoothed: f32, prev_trend: f32) -> f32 {
        let beta = self.config.trend_smoothing_factor;
        beta * (smoothed - prev_smoothed) + (1.0 - beta) * prev_trend
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_velocity_convergence() {
        // x advances by 5 per frame; after a few cycles the one-step
        // forecast must land close to the true next position.
        let mut estimator = DoubleExponentialEstimator::new(
            EstimatorConfig::default(),
            Rect::new(0.0, 0.0, 10, 10),
            Rect::new(5.0, 0.0, 10, 10),
        );

        let mut prediction = Rect::ZERO;
        for i in 2..20 {
            prediction = estimator.predict(1.0);
            estimator.correct(Rect::new(i as f32 * 5.0, 0.0, 10, 10));
        }
        // Last prediction made before observing frame 19 forecasts x = 95.
        assert!((prediction.x - 95.0).abs() < 2.0, "x = {}", prediction.x);
    }

    #[test]
    fn test_dimensions_carried_from_latest_observation() {
        let mut estimator = DoubleExponentialEstimator::seeded(EstimatorConfig::default());
        estimator.correct(Rect::new(10.0, 10.0, 7, 9));
        let prediction = estimator.predict(1.0);
        assert_eq!(prediction.width, 7);
        assert_eq!(prediction.height, 9);
    }

    #[test]
    fn test_stationary_object_prediction_stays_put() {
        let mut estimator = DoubleExponentialEstimator::new(
            EstimatorConfig::default(),
            Rect::new(50.0, 60.0, 10, 10),
            Rect::new(50.0, 60.0, 10, 10),
        );
        for _ in 0..10 {
            estimator.predict(1.0);
            estimator.correct(Rect::new(50.0, 60.0, 10, 10));
        }
        let prediction = estimator.predict(1.0);
        assert!((prediction.x - 50.0).abs() < 1e-3);
        assert!((prediction.y - 60.0).abs() < 1e-3);
    }

    #[test]
    fn test_fractional_time_step() {
        let mut estimator = DoubleExponentialEstimator::new(
            EstimatorConfig {
                data_smoothing_factor: 1.0,
                trend_smoothing_factor: 1.0,
            },
            Rect::new(0.0, 0.0, 1, 1),
            Rect::new(10.0, 0.0, 1, 1),
        );
        // With alpha = beta = 1 the forecast collapses to
        // obs + t * (obs - prev_smoothed), here 20 + 0.5 * (20 - 0).
        estimator.correct(Rect::new(20.0, 0.0, 1, 1));
        let prediction = estimator.predict(0.5);
        assert!((prediction.x - 30.0).abs() < 1e-3, "x = {}", prediction.x);
    }
}
