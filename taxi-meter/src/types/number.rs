use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// A decimal kept at the precision it was written with, up to the 28 significant digits of
/// `Decimal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub(crate) struct Number(rust_decimal::Decimal);

impl Number {
    pub(crate) fn zero() -> Self {
        Self(rust_decimal::Decimal::ZERO)
    }

    pub(crate) fn is_sign_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    pub(crate) fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub(crate) fn floor(self) -> Self {
        Self(self.0.floor())
    }

    pub(crate) fn checked_div(self, other: Self) -> Option<Self> {
        self.0.checked_div(other.0).map(Self)
    }

    pub(crate) fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    pub(crate) fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl From<rust_decimal::Decimal> for Number {
    fn from(value: rust_decimal::Decimal) -> Self {
        Self(value)
    }
}

impl From<Number> for rust_decimal::Decimal {
    fn from(value: Number) -> Self {
        value.0
    }
}

impl TryFrom<Number> for u64 {
    type Error = rust_decimal::Error;

    fn try_from(value: Number) -> Result<Self, Self::Error> {
        value.0.try_into()
    }
}

impl Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
