//! Core domain logic for carbohydrate absorption estimation.
//!
//! This crate contains the fundamental types and logic for:
//! - Entries: recorded carb intakes and their curve-only static estimates
//! - Absorption: modeled summaries and observed absorption timelines
//! - Estimation: blending the curve with observation into continuous
//!   carbs-on-board and absorbed-carbs queries
//!
//! Everything here is a pure function of immutable inputs: no I/O, no
//! clocks, no shared state.

mod absorption;
mod entry;
mod model;
mod status;
pub mod types;

pub use absorption::{AbsorptionSummary, ObservedTimeline, ObservedValue};
pub use entry::{CarbEntry, CarbIntake};
pub use model::{AbsorptionModel, LinearAbsorption, PiecewiseLinearAbsorption};
pub use status::{AbsorptionEstimator, CarbStatus};
pub use types::{DefaultAbsorptionTimes, ValidationError};
