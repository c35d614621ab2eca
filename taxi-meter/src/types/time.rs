use std::fmt::Display;

use chrono::Duration;
use serde::{Deserialize, Serialize, Serializer};

use crate::Error;

const SECS_IN_MIN: i64 = 60;
const MINS_IN_HOUR: i64 = 60;

/// A `chrono` UTC date time.
pub type DateTime = chrono::DateTime<chrono::Utc>;

/// A duration that converts from and to a whole amount of seconds.
#[derive(Debug, PartialEq, Eq, Clone, Copy, PartialOrd, Ord)]
pub struct SecondsRound(Duration);

impl SecondsRound {
    /// Construct from a whole amount of seconds.
    pub fn from_seconds(seconds: u64) -> Result<Self, Error> {
        let seconds = i64::try_from(seconds).map_err(|_| Error::NumericOverflow)?;
        let duration = Duration::try_seconds(seconds).ok_or(Error::NumericOverflow)?;

        Ok(Self(duration))
    }
}

impl<'de> Deserialize<'de> for SecondsRound {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error as DeError;

        let seconds = u64::deserialize(deserializer)?;
        Self::from_seconds(seconds).map_err(DeError::custom)
    }
}

impl Serialize for SecondsRound {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.0.num_seconds())
    }
}

impl From<SecondsRound> for Duration {
    fn from(value: SecondsRound) -> Self {
        value.0
    }
}

impl From<Duration> for SecondsRound {
    fn from(value: Duration) -> Self {
        Self(value)
    }
}

impl Display for SecondsRound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Elapsed(self.0).fmt(f)
    }
}

/// Accumulated trip time, displayed as `HH:MM:SS` and serialized as whole seconds.
#[derive(Debug, PartialEq, Eq, Clone, Copy, PartialOrd, Ord)]
pub struct Elapsed(Duration);

impl Elapsed {
    #[must_use]
    pub fn zero() -> Self {
        Self(Duration::zero())
    }

    #[must_use]
    pub fn saturating_add(self, other: Duration) -> Self {
        Self(self.0.checked_add(&other).unwrap_or(Duration::MAX))
    }
}

impl Default for Elapsed {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<Elapsed> for Duration {
    fn from(value: Elapsed) -> Self {
        value.0
    }
}

impl From<Duration> for Elapsed {
    fn from(value: Duration) -> Self {
        Self(value)
    }
}

impl Serialize for Elapsed {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.0.num_seconds())
    }
}

impl Display for Elapsed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let total_seconds = self.0.num_seconds();
        let seconds = total_seconds % SECS_IN_MIN;
        let minutes = (total_seconds / SECS_IN_MIN) % MINS_IN_HOUR;
        let hours = total_seconds / (SECS_IN_MIN * MINS_IN_HOUR);

        write!(f, "{hours:0>2}:{minutes:0>2}:{seconds:0>2}")
    }
}
