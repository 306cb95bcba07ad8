//! Modeled absorption snapshots and observed absorption timelines.
//!
//! Both shapes are produced by an upstream aggregation stage that reconciles
//! carb entries with glucose/insulin-effect data; this crate only consumes
//! them.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::ValidationError;

/// A snapshot of modeled absorption for one carb entry.
///
/// `total_grams` may differ from the entry's recorded quantity when the
/// model has corrected the expected total from prior observation.
/// `observed_grams + remaining_grams` is expected to be close to
/// `total_grams` but exact agreement is the producer's contract, not
/// enforced here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbsorptionSummary {
    /// Grams expected to eventually be absorbed.
    pub total_grams: f64,

    /// Grams observed absorbed so far.
    pub observed_grams: f64,

    /// Grams still expected to be absorbed.
    pub remaining_grams: f64,

    /// Estimated total absorption duration in milliseconds.
    pub estimated_duration_ms: i64,

    /// Estimated time until absorption completes, in milliseconds.
    pub estimated_time_remaining_ms: i64,
}

impl AbsorptionSummary {
    /// The estimated total absorption duration.
    pub fn estimated_duration(&self) -> Duration {
        Duration::milliseconds(self.estimated_duration_ms)
    }

    /// The estimated time remaining until absorption completes.
    pub fn estimated_time_remaining(&self) -> Duration {
        Duration::milliseconds(self.estimated_time_remaining_ms)
    }
}

/// Grams confirmed absorbed during one observation interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservedValue {
    /// Grams absorbed during the interval.
    pub grams: f64,

    /// Start of the interval.
    pub start_time: DateTime<Utc>,

    /// End of the interval.
    pub end_time: DateTime<Utc>,
}

impl ObservedValue {
    /// The interval's length. Zero-length intervals are valid (degenerate)
    /// samples.
    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }
}

/// A non-empty sequence of observed absorption samples, ascending by end
/// time with non-overlapping intervals.
///
/// The ordering invariant is checked at construction (and therefore at the
/// serde boundary) because the estimator's partial-interval pro-ration
/// silently mis-attributes mass if samples arrive out of order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ObservedValue>", into = "Vec<ObservedValue>")]
pub struct ObservedTimeline(Vec<ObservedValue>);

impl ObservedTimeline {
    /// Creates a timeline after validating the ordering invariant.
    pub fn new(values: Vec<ObservedValue>) -> Result<Self, ValidationError> {
        if values.is_empty() {
            return Err(ValidationError::EmptyTimeline);
        }
        for (index, value) in values.iter().enumerate() {
            if value.end_time < value.start_time {
                return Err(ValidationError::InvertedInterval { index });
            }
            if index > 0 && value.start_time < values[index - 1].end_time {
                return Err(ValidationError::UnorderedTimeline { index });
            }
        }
        Ok(Self(values))
    }

    /// The samples, ascending by end time.
    pub fn values(&self) -> &[ObservedValue] {
        &self.0
    }

    /// End of the observation window: the last sample's end time.
    pub fn end_time(&self) -> DateTime<Utc> {
        // Non-empty by construction; the fallback is unreachable.
        self.0
            .last()
            .map_or(DateTime::<Utc>::MIN_UTC, |value| value.end_time)
    }
}

impl TryFrom<Vec<ObservedValue>> for ObservedTimeline {
    type Error = ValidationError;

    fn try_from(values: Vec<ObservedValue>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

impl From<ObservedTimeline> for Vec<ObservedValue> {
    fn from(timeline: ObservedTimeline) -> Self {
        timeline.0
    }
}
