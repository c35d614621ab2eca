use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// A fare amount in whole currency units. Fractions of a unit are never charged.
#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    /// No charge.
    #[must_use]
    pub fn zero() -> Self {
        Self(0)
    }

    /// `None` on overflow.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// The price of `count` units at `self` each, `None` on overflow.
    #[must_use]
    pub fn checked_times(self, count: u64) -> Option<Self> {
        self.0.checked_mul(count).map(Self)
    }
}

impl From<u64> for Money {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::Money;

    #[test]
    fn should_detect_overflow() {
        let almost_max = Money::from(u64::MAX - 10);

        assert_eq!(almost_max.checked_add(10.into()), Some(u64::MAX.into()));
        assert_eq!(almost_max.checked_add(100.into()), None);
        assert_eq!(Money::from(100).checked_times(3), Some(300.into()));
        assert_eq!(almost_max.checked_times(2), None);
    }
}
