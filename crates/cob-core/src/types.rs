//! Validation errors and clinical defaults shared across the crate.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// A carb quantity was negative or not a number.
    #[error("carb quantity must be a non-negative number of grams, got {grams}")]
    InvalidQuantity { grams: f64 },

    /// An observed timeline was constructed with no samples.
    ///
    /// "No observation yet" is represented by the absence of a timeline,
    /// not by an empty one.
    #[error("observed timeline cannot be empty")]
    EmptyTimeline,

    /// An observed sample ends before it starts.
    #[error("observed sample at index {index} ends before it starts")]
    InvertedInterval { index: usize },

    /// Observed samples are out of order or overlap.
    #[error("observed timeline is not chronologically ordered at index {index}")]
    UnorderedTimeline { index: usize },
}

/// Default absorption durations the surrounding system chooses a fallback
/// duration from when an entry carries no declared absorption time.
///
/// These are plain values; loading them from user settings is the caller's
/// concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultAbsorptionTimes {
    /// Fast-absorbing intake (e.g. juice). Milliseconds.
    pub fast_ms: i64,
    /// Typical mixed meal. Milliseconds.
    pub medium_ms: i64,
    /// Slow-absorbing intake (e.g. high fat). Milliseconds.
    pub slow_ms: i64,
}

impl DefaultAbsorptionTimes {
    /// The fast duration as a [`Duration`].
    pub fn fast(&self) -> Duration {
        Duration::milliseconds(self.fast_ms)
    }

    /// The medium duration as a [`Duration`].
    pub fn medium(&self) -> Duration {
        Duration::milliseconds(self.medium_ms)
    }

    /// The slow duration as a [`Duration`].
    pub fn slow(&self) -> Duration {
        Duration::milliseconds(self.slow_ms)
    }
}

impl Default for DefaultAbsorptionTimes {
    fn default() -> Self {
        Self {
            fast_ms: 2 * 60 * 60 * 1000,   // 2 hours
            medium_ms: 3 * 60 * 60 * 1000, // 3 hours
            slow_ms: 4 * 60 * 60 * 1000,   // 4 hours
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_times_are_ordered() {
        let defaults = DefaultAbsorptionTimes::default();
        assert!(defaults.fast() < defaults.medium());
        assert!(defaults.medium() < defaults.slow());
    }

    #[test]
    fn default_times_serde_roundtrip() {
        let defaults = DefaultAbsorptionTimes::default();
        let json = serde_json::to_string(&defaults).unwrap();
        let parsed: DefaultAbsorptionTimes = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, defaults);
    }
}
