//! Absorption curve strategies.
//!
//! An [`AbsorptionModel`] maps (total grams, elapsed time, absorption
//! duration) to absorbed or unabsorbed grams. The estimator never inspects
//! the curve shape beyond this contract:
//!
//! - `absorbed + unabsorbed == total` within floating tolerance
//! - `absorbed == 0` for elapsed time ≤ 0
//! - `absorbed == total` for elapsed time ≥ the absorption duration
//! - `absorbed` is monotone non-decreasing in elapsed time
//!
//! Which strategy to use is chosen by the caller and injected into
//! [`AbsorptionEstimator::new`](crate::AbsorptionEstimator::new); nothing in
//! this crate selects a curve on its own.

use chrono::Duration;

/// A parametric carbohydrate absorption curve.
pub trait AbsorptionModel {
    /// Grams absorbed `at_time` after absorption begins, out of `total`
    /// grams absorbing over `absorption_time`.
    fn absorbed_carbs(&self, total: f64, at_time: Duration, absorption_time: Duration) -> f64;

    /// Grams not yet absorbed `at_time` after absorption begins.
    fn unabsorbed_carbs(&self, total: f64, at_time: Duration, absorption_time: Duration) -> f64 {
        total - self.absorbed_carbs(total, at_time, absorption_time)
    }
}

/// Fraction of the absorption duration elapsed, clamped to `[0, 1]`.
///
/// A non-positive duration is degenerate but valid input; everything counts
/// as absorbed once any time has elapsed.
fn percent_time(at_time: Duration, absorption_time: Duration) -> f64 {
    if at_time <= Duration::zero() {
        return 0.0;
    }
    if at_time >= absorption_time {
        return 1.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let fraction =
        at_time.num_milliseconds() as f64 / absorption_time.num_milliseconds() as f64;
    fraction.clamp(0.0, 1.0)
}

/// Constant-rate absorption: a fixed fraction of the total per unit time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinearAbsorption;

impl AbsorptionModel for LinearAbsorption {
    fn absorbed_carbs(&self, total: f64, at_time: Duration, absorption_time: Duration) -> f64 {
        total * percent_time(at_time, absorption_time)
    }
}

/// Piecewise-linear absorption rate: ramps up over the first 15 % of the
/// duration, holds steady until 50 %, then decays to zero at 100 %.
///
/// This is the default curve of the original clinical system; the ramp
/// avoids the step discontinuity in absorption rate that a purely linear
/// curve has at the start and end of a meal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PiecewiseLinearAbsorption;

impl PiecewiseLinearAbsorption {
    const PERCENT_END_OF_RISE: f64 = 0.15;
    const PERCENT_START_OF_FALL: f64 = 0.5;

    /// Peak absorption rate, scaled so the area under the rate curve is 1.
    const fn peak_rate() -> f64 {
        let rise = Self::PERCENT_END_OF_RISE;
        let fall = Self::PERCENT_START_OF_FALL;
        // Trapezoid area: rise/2 + (fall - rise) + (1 - fall)/2
        1.0 / (rise / 2.0 + (fall - rise) + (1.0 - fall) / 2.0)
    }

    /// Absorbed fraction at `percent_time` in `[0, 1]`.
    fn percent_absorption(percent_time: f64) -> f64 {
        let rise = Self::PERCENT_END_OF_RISE;
        let fall = Self::PERCENT_START_OF_FALL;
        let peak = Self::peak_rate();

        if percent_time <= 0.0 {
            0.0
        } else if percent_time < rise {
            // Integral of the rising ramp
            peak * percent_time * percent_time / (2.0 * rise)
        } else if percent_time < fall {
            peak * (rise / 2.0 + (percent_time - rise))
        } else if percent_time < 1.0 {
            // Remaining area under the falling ramp
            let remaining = 1.0 - percent_time;
            1.0 - peak * remaining * remaining / (2.0 * (1.0 - fall))
        } else {
            1.0
        }
    }
}

impl AbsorptionModel for PiecewiseLinearAbsorption {
    fn absorbed_carbs(&self, total: f64, at_time: Duration, absorption_time: Duration) -> f64 {
        total * Self::percent_absorption(percent_time(at_time, absorption_time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn minutes(m: i64) -> Duration {
        Duration::minutes(m)
    }

    #[test]
    fn linear_endpoints() {
        let model = LinearAbsorption;
        assert!((model.absorbed_carbs(30.0, minutes(-10), minutes(180))).abs() < EPSILON);
        assert!((model.absorbed_carbs(30.0, minutes(0), minutes(180))).abs() < EPSILON);
        assert!((model.absorbed_carbs(30.0, minutes(180), minutes(180)) - 30.0).abs() < EPSILON);
        assert!((model.absorbed_carbs(30.0, minutes(300), minutes(180)) - 30.0).abs() < EPSILON);
    }

    #[test]
    fn linear_midpoint() {
        let model = LinearAbsorption;
        assert!((model.absorbed_carbs(30.0, minutes(90), minutes(180)) - 15.0).abs() < EPSILON);
        assert!((model.unabsorbed_carbs(30.0, minutes(90), minutes(180)) - 15.0).abs() < EPSILON);
    }

    #[test]
    fn linear_zero_duration_is_fully_absorbed_after_start() {
        let model = LinearAbsorption;
        assert!((model.absorbed_carbs(30.0, minutes(1), minutes(0)) - 30.0).abs() < EPSILON);
        assert!((model.absorbed_carbs(30.0, minutes(0), minutes(0))).abs() < EPSILON);
    }

    #[test]
    fn piecewise_endpoints() {
        let model = PiecewiseLinearAbsorption;
        assert!((model.absorbed_carbs(30.0, minutes(0), minutes(180))).abs() < EPSILON);
        assert!((model.absorbed_carbs(30.0, minutes(180), minutes(180)) - 30.0).abs() < EPSILON);
    }

    #[test]
    fn piecewise_known_values() {
        // Peak rate is 1/0.675. At 50% of the duration the absorbed
        // fraction is (0.5 - 0.075) / 0.675.
        let at_half = PiecewiseLinearAbsorption::percent_absorption(0.5);
        assert!((at_half - 0.425 / 0.675).abs() < EPSILON);

        // Branches agree where they meet.
        let at_rise = PiecewiseLinearAbsorption::percent_absorption(0.15);
        assert!((at_rise - 0.075 / 0.675).abs() < EPSILON);
    }

    #[test]
    fn contract_complement_and_monotonicity() {
        let linear = LinearAbsorption;
        let piecewise = PiecewiseLinearAbsorption;
        let total = 42.0;
        let duration = minutes(200);

        let mut previous_linear = 0.0;
        let mut previous_piecewise = 0.0;
        for minute in -10..=210 {
            let at = minutes(minute);

            let absorbed = linear.absorbed_carbs(total, at, duration);
            assert!(
                (absorbed + linear.unabsorbed_carbs(total, at, duration) - total).abs() < EPSILON
            );
            assert!(absorbed + EPSILON >= previous_linear);
            previous_linear = absorbed;

            let absorbed = piecewise.absorbed_carbs(total, at, duration);
            assert!(
                (absorbed + piecewise.unabsorbed_carbs(total, at, duration) - total).abs()
                    < EPSILON
            );
            assert!(absorbed + EPSILON >= previous_piecewise);
            previous_piecewise = absorbed;
        }
    }
}
