//! Recorded carbohydrate intake entries and their static estimators.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::model::AbsorptionModel;
use crate::types::ValidationError;

/// The capability interface shared by anything that can stand in for a
/// carb intake record.
///
/// A plain [`CarbEntry`] implements it directly. The
/// [`CarbStatus`](crate::CarbStatus) aggregate implements it as a view over
/// its entry, overriding the effective absorption time — downstream
/// consumers treat either one as "a carb entry" without caring which.
pub trait CarbIntake {
    /// Carbohydrate mass in grams.
    fn grams(&self) -> f64;

    /// When the intake was recorded.
    fn start_time(&self) -> DateTime<Utc>;

    /// The effective absorption duration, if one is known.
    fn absorption_time(&self) -> Option<Duration>;
}

/// A recorded carbohydrate intake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarbEntry {
    /// When the intake was recorded.
    pub start_time: DateTime<Utc>,

    /// Carbohydrate mass in grams.
    pub grams: f64,

    /// Declared absorption duration in milliseconds, if the user entered
    /// one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absorption_time_ms: Option<i64>,
}

impl CarbEntry {
    /// Creates an entry after validating the quantity.
    pub fn new(
        start_time: DateTime<Utc>,
        grams: f64,
        absorption_time: Option<Duration>,
    ) -> Result<Self, ValidationError> {
        if grams.is_nan() || grams < 0.0 {
            return Err(ValidationError::InvalidQuantity { grams });
        }
        Ok(Self {
            start_time,
            grams,
            absorption_time_ms: absorption_time.map(|d| d.num_milliseconds()),
        })
    }

    /// Carbs on board at `at`, predicted purely from the curve.
    ///
    /// This is the estimate used when no observed absorption data exists:
    /// the entry's declared absorption time (else `default_absorption_time`)
    /// parameterizes the model, and `delay` shifts the effective time
    /// origin to account for measurement and physiological lag.
    pub fn carbs_on_board<M: AbsorptionModel>(
        &self,
        model: &M,
        at: DateTime<Utc>,
        default_absorption_time: Duration,
        delay: Duration,
    ) -> f64 {
        let absorption_time = self.absorption_time().unwrap_or(default_absorption_time);
        model.unabsorbed_carbs(self.grams, at - self.start_time - delay, absorption_time)
    }

    /// Grams absorbed by `at`, predicted purely from the curve.
    pub fn absorbed_carbs<M: AbsorptionModel>(
        &self,
        model: &M,
        at: DateTime<Utc>,
        default_absorption_time: Duration,
        delay: Duration,
    ) -> f64 {
        let absorption_time = self.absorption_time().unwrap_or(default_absorption_time);
        model.absorbed_carbs(self.grams, at - self.start_time - delay, absorption_time)
    }
}

impl CarbIntake for CarbEntry {
    fn grams(&self) -> f64 {
        self.grams
    }

    fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    fn absorption_time(&self) -> Option<Duration> {
        self.absorption_time_ms.map(Duration::milliseconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LinearAbsorption;
    use chrono::TimeZone;

    const EPSILON: f64 = 1e-9;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0)
            .single()
            .expect("valid test timestamp")
    }

    #[test]
    fn rejects_invalid_quantity() {
        assert!(CarbEntry::new(t0(), -1.0, None).is_err());
        assert!(CarbEntry::new(t0(), f64::NAN, None).is_err());
        assert!(CarbEntry::new(t0(), 0.0, None).is_ok());
    }

    #[test]
    fn cob_before_start_is_full_quantity() {
        let entry = CarbEntry::new(t0(), 30.0, None).unwrap();
        let cob = entry.carbs_on_board(
            &LinearAbsorption,
            t0() - Duration::minutes(5),
            Duration::minutes(180),
            Duration::minutes(10),
        );
        assert!((cob - 30.0).abs() < EPSILON);
    }

    #[test]
    fn cob_uses_declared_absorption_time_over_default() {
        let entry = CarbEntry::new(t0(), 30.0, Some(Duration::minutes(60))).unwrap();
        // 30 minutes after delay into a 60 minute absorption: half gone.
        let cob = entry.carbs_on_board(
            &LinearAbsorption,
            t0() + Duration::minutes(30),
            Duration::minutes(180),
            Duration::zero(),
        );
        assert!((cob - 15.0).abs() < EPSILON);
    }

    #[test]
    fn absorbed_shifts_by_delay() {
        let entry = CarbEntry::new(t0(), 30.0, None).unwrap();
        let absorbed = entry.absorbed_carbs(
            &LinearAbsorption,
            t0() + Duration::minutes(100),
            Duration::minutes(180),
            Duration::minutes(10),
        );
        // 90 effective minutes of a 180 minute absorption.
        assert!((absorbed - 15.0).abs() < EPSILON);
    }

    #[test]
    fn entry_serde_roundtrip() {
        let entry = CarbEntry::new(t0(), 45.0, Some(Duration::hours(4))).unwrap();
        let json = serde_json::to_string(&entry).unwrap();
        let parsed: CarbEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, entry);
    }

    #[test]
    fn absorption_time_omitted_when_absent() {
        let entry = CarbEntry::new(t0(), 45.0, None).unwrap();
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("absorption_time_ms"));
    }
}
