use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::{
    types::{
        distance::{Kilometers, KmPerHour},
        money::Money,
        time::SecondsRound,
    },
    Error, Result,
};

/// The tariff of a ride. A tiered model: a flat initial fare covers the first stretch of the
/// ride, after that every full unit of distance is charged. While the taxi moves at or below
/// the time threshold speed, or stands still, elapsed time is charged instead of distance.
///
/// ```json
/// {
///   "initial_fare": 500,
///   "initial_distance": 1.096,
///   "unit_fare": 100,
///   "unit_distance": 0.237,
///   "time_threshold": 10.0,
///   "time_unit_fare": 100,
///   "time_unit": 90
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "UncheckedFareConfig")]
pub struct FareConfig {
    /// The fare charged when the meter starts.
    pub initial_fare: Money,
    /// The distance covered by the initial fare.
    pub initial_distance: Kilometers,
    /// The fare charged per unit of distance beyond the initial distance.
    pub unit_fare: Money,
    /// The distance of a single distance unit. Must be positive.
    pub unit_distance: Kilometers,
    /// Speeds at or below this threshold are charged by time instead of distance.
    pub time_threshold: KmPerHour,
    /// The fare charged per unit of time.
    pub time_unit_fare: Money,
    /// The duration of a single time unit. At least a millisecond, serialized in seconds.
    pub time_unit: SecondsRound,
}

impl FareConfig {
    /// Check that every divisor is positive and no distance or speed is negative.
    pub fn validate(&self) -> Result<()> {
        if self.unit_distance.is_sign_negative() || self.unit_distance.is_zero() {
            return Err(Error::InvalidFareConfig("`unit_distance` must be positive"));
        }

        // Time units are counted in whole milliseconds.
        if Duration::from(self.time_unit).num_milliseconds() < 1 {
            return Err(Error::InvalidFareConfig(
                "`time_unit` must be at least one millisecond",
            ));
        }

        if self.initial_distance.is_sign_negative() {
            return Err(Error::InvalidFareConfig(
                "`initial_distance` must not be negative",
            ));
        }

        if self.time_threshold.is_sign_negative() {
            return Err(Error::InvalidFareConfig(
                "`time_threshold` must not be negative",
            ));
        }

        Ok(())
    }
}

/// A fare config as it appears on the wire, before validation.
#[derive(Deserialize)]
struct UncheckedFareConfig {
    initial_fare: Money,
    initial_distance: Kilometers,
    unit_fare: Money,
    unit_distance: Kilometers,
    time_threshold: KmPerHour,
    time_unit_fare: Money,
    time_unit: SecondsRound,
}

impl TryFrom<UncheckedFareConfig> for FareConfig {
    type Error = Error;

    fn try_from(value: UncheckedFareConfig) -> Result<Self> {
        let UncheckedFareConfig {
            initial_fare,
            initial_distance,
            unit_fare,
            unit_distance,
            time_threshold,
            time_unit_fare,
            time_unit,
        } = value;

        let config = Self {
            initial_fare,
            initial_distance,
            unit_fare,
            unit_distance,
            time_threshold,
            time_unit_fare,
            time_unit,
        };

        config.validate()?;
        Ok(config)
    }
}
