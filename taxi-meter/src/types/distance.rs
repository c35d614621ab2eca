use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::number::Number;

/// A distance in kilometers.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy, PartialOrd, Ord, Default)]
#[serde(transparent)]
pub struct Kilometers(Number);

impl Kilometers {
    #[must_use]
    pub fn zero() -> Self {
        Self(Number::zero())
    }

    /// Saturating addition
    #[must_use]
    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Subtraction that stops at zero, distances are never negative.
    #[must_use]
    pub fn sub_or_zero(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0)).max(Self::zero())
    }

    /// The amount of whole `unit`s that fit in this distance, `None` when `unit` is zero or the
    /// result does not fit.
    pub(crate) fn whole_units(self, unit: Self) -> Option<u64> {
        let units = self.0.checked_div(unit.0)?.floor();
        u64::try_from(units).ok()
    }

    pub(crate) fn is_sign_negative(self) -> bool {
        self.0.is_sign_negative()
    }

    pub(crate) fn is_zero(self) -> bool {
        self.0.is_zero()
    }
}

impl From<rust_decimal::Decimal> for Kilometers {
    fn from(value: rust_decimal::Decimal) -> Self {
        Self(value.into())
    }
}

impl From<Kilometers> for rust_decimal::Decimal {
    fn from(value: Kilometers) -> Self {
        value.0.into()
    }
}

impl Display for Kilometers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} km", self.0)
    }
}

/// An average speed in kilometers per hour.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy, PartialOrd, Ord, Default)]
#[serde(transparent)]
pub struct KmPerHour(Number);

impl KmPerHour {
    pub(crate) fn is_sign_negative(self) -> bool {
        self.0.is_sign_negative()
    }
}

impl From<rust_decimal::Decimal> for KmPerHour {
    fn from(value: rust_decimal::Decimal) -> Self {
        Self(value.into())
    }
}

impl From<KmPerHour> for rust_decimal::Decimal {
    fn from(value: KmPerHour) -> Self {
        value.0.into()
    }
}

impl Display for KmPerHour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1} km/h", self.0)
    }
}
