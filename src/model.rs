//! Battery degradation data types.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, ops::RangeBounds};
use thiserror::Error;

/// Error returned by the degradation model.
#[derive(Debug, PartialEq, Error)]
pub enum ModelError {
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// How the battery is usually charged.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ChargingHabit {
    /// Slow (low current) charging.
    Slow,
    /// Regular charging up to 100%.
    Standard,
    /// Fast (high current) charging.
    Fast,
    /// Partial charging, kept between 20% and 80%.
    Partial,
}

impl ChargingHabit {
    /// Multiplicative factor applied to the cycle aging rate.
    pub fn factor(self) -> f64 {
        match self {
            Self::Partial => 0.6,
            Self::Slow => 0.8,
            Self::Standard => 1.0,
            Self::Fast => 1.2,
        }
    }
}

/// Parameters of a single degradation simulation.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct SimulationParameters {
    /// Rated capacity of the new battery (Wh).
    pub initial_capacity_wh: f64,
    /// Full-equivalent charge cycles per year.
    pub cycles_per_year: f64,
    /// Number of simulated years.
    pub years: u32,
    /// Average operating temperature (°C).
    pub average_temperature_c: f64,
    /// Usual charging habit.
    pub charging_habit: ChargingHabit,
    /// Average depth of discharge per cycle, in (0, 1].
    pub depth_of_discharge: f64,
    /// Calendar aging intensity, in [0, 1] (0 = none, 1 = high).
    #[serde(default = "default_calendar_aging")]
    pub calendar_aging: f64,
}

const MAX_CAPACITY_WH: f64 = 1e9;
const MAX_CYCLES_PER_YEAR: f64 = 100_000.0;
const MAX_YEARS: u32 = 1000;

fn default_calendar_aging() -> f64 {
    0.2
}

impl SimulationParameters {
    /// Check every parameter, reporting the first one that is out of range.
    ///
    /// # Errors
    /// Returns [`ModelError::InvalidParameter`] naming the offending field.
    pub fn validate(&self) -> Result<(), ModelError> {
        check_positive("initial_capacity_wh", self.initial_capacity_wh, MAX_CAPACITY_WH)?;
        check_positive("cycles_per_year", self.cycles_per_year, MAX_CYCLES_PER_YEAR)?;
        check_num("years", self.years, 1..=MAX_YEARS)?;
        if !self.average_temperature_c.is_finite() {
            return Err(invalid(
                "average_temperature_c",
                format!("must be finite, but is {}", self.average_temperature_c),
            ));
        }
        // The lower bound is exclusive, which `RangeBounds` literals can't express.
        if !(self.depth_of_discharge > 0.0 && self.depth_of_discharge <= 1.0) {
            return Err(invalid(
                "depth_of_discharge",
                format!("must be in the range (0, 1], but is {}", self.depth_of_discharge),
            ));
        }
        check_num("calendar_aging", self.calendar_aging, 0.0..=1.0)?;
        Ok(())
    }
}

/// State of health of the battery at the end of a simulated year.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct SamplePoint {
    /// Years elapsed since the battery was new.
    pub year: u32,
    /// Remaining capacity (Wh).
    pub remaining_capacity: f64,
    /// Remaining capacity relative to the initial capacity (%).
    pub soh_percent: f64,
}

/// Time at which the state of health first drops below a threshold.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ThresholdCrossing {
    /// Threshold (%).
    pub soh_percent: f64,
    /// Fractional year of the crossing, `None` if never reached.
    pub year: Option<f64>,
}

fn invalid(name: &'static str, reason: String) -> ModelError {
    ModelError::InvalidParameter { name, reason }
}

fn check_positive(name: &'static str, num: f64, max: f64) -> Result<(), ModelError> {
    if !(num > 0.0 && num <= max) {
        return Err(invalid(
            name,
            format!("must be in the range (0, {max}], but is {num}"),
        ));
    }
    Ok(())
}

fn check_num<T, R>(name: &'static str, num: T, range: R) -> Result<(), ModelError>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        return Err(invalid(
            name,
            format!("must be in the range {range:?}, but is {num:?}"),
        ));
    }
    Ok(())
}
