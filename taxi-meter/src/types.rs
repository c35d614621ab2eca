/// Kilometers and kilometers per hour.
pub mod distance;

/// Integer currency amounts.
pub mod money;

pub(crate) mod number;

/// Timestamps and segment durations.
pub mod time;
