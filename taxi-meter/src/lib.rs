//! # Taxi meter library
//!
//! Functionality to meter a taxi ride from a time ordered stream of trip events. The
//! [`session::RideSession`] tracks the ride lifecycle and drives the [`meter::Meter`] which
//! derives the fare. Use [`replay::Replay`] to run a recorded [`feed::TripFeed`] in one go.

use std::fmt;

/// The tariff a meter prices a ride with.
pub mod config;

/// Trip events a meter and session consume.
pub mod event;

/// Module for generating a human readable tariff.
pub mod explain;

/// Recorded trips in their JSON wire format.
pub mod feed;

pub mod lint;

/// The fare engine.
pub mod meter;

/// Module containing the functionality to replay a recorded trip through a session.
pub mod replay;

/// Ride lifecycle, payment and summary.
pub mod session;

/// Numeric and time types used for calculations, serializing and deserializing.
pub mod types;

use event::EventKind;
use session::SessionStatus;

type Result<T> = std::result::Result<T, Error>;

/// Possible errors when metering a ride.
///
/// All of these are violated preconditions of the call that returned them. Retrying the same
/// call on the same state always fails the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A start event was received while the meter was already running.
    AlreadyRunning,
    /// A move, stop or end event was received while the meter was not running.
    MeterNotRunning { event: EventKind },
    /// A start or end event does not fit the current status of the ride.
    InvalidTransition {
        event: EventKind,
        status: SessionStatus,
    },
    /// A payment was attempted before the ride was completed.
    NotCompleted { status: SessionStatus },
    /// A payment was attempted for a ride that is already paid.
    AlreadyPaid,
    /// The event type of a recorded event is not one of `start`, `move`, `stop` or `end`.
    UnknownEventType(String),
    /// A recorded move or stop event lacks segment data that can not be derived otherwise.
    MissingSegmentField {
        event: EventKind,
        field: &'static str,
    },
    /// A segment reported a negative distance, duration or speed.
    NegativeSegmentValue {
        event: EventKind,
        field: &'static str,
    },
    /// The fare configuration can not be used for pricing.
    InvalidFareConfig(&'static str),
    /// The recorded trip does not contain a fare configuration and none was provided.
    ///
    /// Consider providing one using [`replay::Replay::with_config`].
    NoFareConfig,
    /// A numeric overflow occurred during fare calculation.
    NumericOverflow,
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyRunning => f.write_str("The meter is already running"),
            Self::MeterNotRunning { event } => {
                write!(f, "Cannot process `{event}`, the meter is not running")
            }
            Self::InvalidTransition { event, status } => {
                write!(f, "Cannot process `{event}` for a ride in status `{status}`")
            }
            Self::NotCompleted { status } => write!(
                f,
                "Cannot process payment for a ride in status `{status}`, the ride is not completed"
            ),
            Self::AlreadyPaid => f.write_str("The payment for this ride was already processed"),
            Self::UnknownEventType(ty) => write!(f, "Unknown event type `{ty}`"),
            Self::MissingSegmentField { event, field } => {
                write!(f, "The `{event}` event is missing the `{field}` field")
            }
            Self::NegativeSegmentValue { event, field } => {
                write!(f, "The `{event}` event has a negative `{field}`")
            }
            Self::InvalidFareConfig(reason) => write!(f, "Invalid fare configuration: {reason}"),
            Self::NoFareConfig => f.write_str("No fare configuration has been provided"),
            Self::NumericOverflow => f.write_str("A numeric overflow occurred during fare calculation"),
        }
    }
}
