//! The carb status aggregate and the absorption estimator.
//!
//! [`AbsorptionEstimator`] blends a parametric absorption curve with
//! observed absorption data into a single estimate that is continuous
//! across three regimes: before any observation has accumulated, inside
//! the observation window, and after observation ends but before
//! absorption completes.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::absorption::{AbsorptionSummary, ObservedTimeline, ObservedValue};
use crate::entry::{CarbEntry, CarbIntake};
use crate::model::AbsorptionModel;

/// One carb entry paired with the latest available absorption data.
///
/// Produced once per (entry, observation) pass by an upstream aggregation
/// stage and queried repeatedly at different times; never mutated here.
/// A missing `observed` timeline means "not enough data accumulated to
/// report observed absorption", which is distinct from "zero absorption
/// observed".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarbStatus {
    /// The recorded intake.
    pub entry: CarbEntry,

    /// Modeled absorption for the entry, if any has been computed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absorption: Option<AbsorptionSummary>,

    /// Observed absorption samples, ascending by end time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed: Option<ObservedTimeline>,
}

impl CarbIntake for CarbStatus {
    fn grams(&self) -> f64 {
        self.entry.grams
    }

    fn start_time(&self) -> DateTime<Utc> {
        self.entry.start_time
    }

    /// The effective absorption duration: the summary's estimate when
    /// dynamic data exists, else whatever the entry declared.
    fn absorption_time(&self) -> Option<Duration> {
        self.absorption
            .as_ref()
            .map(AbsorptionSummary::estimated_duration)
            .or_else(|| self.entry.absorption_time())
    }
}

/// Computes carbs on board and absorbed carbs for a [`CarbStatus`] at an
/// arbitrary query time.
///
/// The absorption curve is injected at construction so callers (and tests)
/// choose the strategy; the estimator only relies on the
/// [`AbsorptionModel`] contract.
#[derive(Debug, Clone)]
pub struct AbsorptionEstimator<M> {
    model: M,
}

impl<M: AbsorptionModel> AbsorptionEstimator<M> {
    /// Creates an estimator using the given absorption curve.
    pub const fn new(model: M) -> Self {
        Self { model }
    }

    /// The injected absorption curve.
    pub const fn model(&self) -> &M {
        &self.model
    }

    /// Grams still unabsorbed at `at` ("carbs on board").
    ///
    /// - With no modeled absorption data, or for queries more than `delta`
    ///   before the entry starts, falls back to the entry's static
    ///   estimate.
    /// - Before observation has accumulated, evaluates the curve over the
    ///   summary's estimated duration.
    /// - Inside the observation window (`at` at or before the last
    ///   sample's end), subtracts every completed sample from the entry's
    ///   quantity, clamped at zero. Observed ground truth takes precedence
    ///   over prediction here.
    /// - After the observation window, continues the curve over a
    ///   re-anchored duration so the estimate agrees with
    ///   `summary.remaining_grams` exactly at the boundary.
    pub fn carbs_on_board(
        &self,
        status: &CarbStatus,
        at: DateTime<Utc>,
        default_absorption_time: Duration,
        delay: Duration,
        delta: Duration,
    ) -> f64 {
        let entry = &status.entry;

        if at < entry.start_time - delta {
            return entry.carbs_on_board(&self.model, at, default_absorption_time, delay);
        }
        let Some(summary) = &status.absorption else {
            tracing::trace!("no absorption summary, using static carbs-on-board estimate");
            return entry.carbs_on_board(&self.model, at, default_absorption_time, delay);
        };

        match &status.observed {
            Some(observed) if at > observed.end_time() => {
                let time = at - entry.start_time - delay;
                let time_at_end = observed.end_time() - entry.start_time - delay;
                // Continue the curve from where observation stopped, over
                // however long the model currently thinks is left.
                let dynamic_absorption_time = time_at_end + summary.estimated_time_remaining();

                let unabsorbed_now =
                    self.model
                        .unabsorbed_carbs(summary.total_grams, time, dynamic_absorption_time);
                let unabsorbed_at_end = self.model.unabsorbed_carbs(
                    summary.total_grams,
                    time_at_end,
                    dynamic_absorption_time,
                );
                (summary.remaining_grams + unabsorbed_now - unabsorbed_at_end).max(0.0)
            }
            Some(observed) => {
                let absorbed: f64 = observed
                    .values()
                    .iter()
                    .filter(|value| value.end_time <= at)
                    .map(|value| value.grams)
                    .sum();
                (entry.grams - absorbed).max(0.0)
            }
            None => self.model.unabsorbed_carbs(
                summary.total_grams,
                at - entry.start_time - delay,
                summary.estimated_duration(),
            ),
        }
    }

    /// Grams absorbed by `at`.
    ///
    /// Mirrors [`carbs_on_board`](Self::carbs_on_board), with one extra
    /// rule inside the observation window: the chronologically last sample
    /// whose start (shifted by `delta`) has been reached contributes a
    /// linearly pro-rated share of its mass, so the estimate rises
    /// smoothly within an interval instead of jumping at each sample
    /// boundary. The result is clamped to the entry's recorded quantity.
    pub fn absorbed_carbs(
        &self,
        status: &CarbStatus,
        at: DateTime<Utc>,
        default_absorption_time: Duration,
        delay: Duration,
        delta: Duration,
    ) -> f64 {
        let entry = &status.entry;

        if at < entry.start_time {
            return entry.absorbed_carbs(&self.model, at, default_absorption_time, delay);
        }
        let Some(summary) = &status.absorption else {
            tracing::trace!("no absorption summary, using static absorbed-carbs estimate");
            return entry.absorbed_carbs(&self.model, at, default_absorption_time, delay);
        };

        match &status.observed {
            Some(observed) if at > observed.end_time() => {
                let time = at - entry.start_time - delay;
                let time_at_end = observed.end_time() - entry.start_time - delay;
                let dynamic_absorption_time = time_at_end + summary.estimated_time_remaining();

                // Anchored to the observed total at the boundary; the
                // summary's internal consistency is trusted, so no clamp.
                summary.observed_grams
                    + self
                        .model
                        .absorbed_carbs(summary.total_grams, time, dynamic_absorption_time)
                    - self.model.absorbed_carbs(
                        summary.total_grams,
                        time_at_end,
                        dynamic_absorption_time,
                    )
            }
            Some(observed) => {
                let begun: Vec<&ObservedValue> = observed
                    .values()
                    .iter()
                    .filter(|value| value.start_time + delta <= at)
                    .collect();
                let Some((&last, earlier)) = begun.split_last() else {
                    return 0.0;
                };
                let completed: f64 = earlier.iter().map(|value| value.grams).sum();
                (completed + prorated_grams(last, at)).min(entry.grams)
            }
            None => self.model.absorbed_carbs(
                summary.total_grams,
                at - entry.start_time - delay,
                summary.estimated_duration(),
            ),
        }
    }
}

/// The share of a sample's mass absorbed by `at`, linear in the overlap
/// between `[start, at]` and the sample's interval.
///
/// Zero-length intervals contribute nothing; the guard is explicit rather
/// than letting the division produce an infinity to clamp away.
fn prorated_grams(value: &ObservedValue, at: DateTime<Utc>) -> f64 {
    let duration_ms = value.duration().num_milliseconds();
    if duration_ms <= 0 {
        return 0.0;
    }
    let overlap_ms = (at.min(value.end_time) - value.start_time)
        .num_milliseconds()
        .max(0);
    #[allow(clippy::cast_precision_loss)]
    let fraction = overlap_ms as f64 / duration_ms as f64;
    value.grams * fraction
}
