use std::fmt;

use chrono::Duration;
use serde::Serialize;

use crate::{
    types::{
        distance::{Kilometers, KmPerHour},
        time::DateTime,
    },
    Error, Result,
};

/// A single event of a trip, delivered in the order it occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TripEvent {
    /// The passenger boarded and the meter starts.
    Start { timestamp: DateTime },
    /// The taxi covered a segment of the route.
    Move {
        timestamp: DateTime,
        segment: Segment,
    },
    /// The taxi stood still, for example at a traffic light.
    Stop {
        timestamp: DateTime,
        duration: Duration,
    },
    /// The passenger arrived and the meter stops.
    End { timestamp: DateTime },
}

impl TripEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Start { .. } => EventKind::Start,
            Self::Move { .. } => EventKind::Move,
            Self::Stop { .. } => EventKind::Stop,
            Self::End { .. } => EventKind::End,
        }
    }

    pub fn timestamp(&self) -> DateTime {
        match *self {
            Self::Start { timestamp }
            | Self::Move { timestamp, .. }
            | Self::Stop { timestamp, .. }
            | Self::End { timestamp } => timestamp,
        }
    }
}

/// The distance, duration and average speed of a single move. The three are supplied
/// independently; none of them is derived from the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub distance: Kilometers,
    pub duration: Duration,
    pub speed: KmPerHour,
}

impl Segment {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.distance.is_sign_negative() {
            return Err(Error::NegativeSegmentValue {
                event: EventKind::Move,
                field: "distance",
            });
        }

        if self.duration < Duration::zero() {
            return Err(Error::NegativeSegmentValue {
                event: EventKind::Move,
                field: "duration",
            });
        }

        if self.speed.is_sign_negative() {
            return Err(Error::NegativeSegmentValue {
                event: EventKind::Move,
                field: "speed",
            });
        }

        Ok(())
    }
}

/// The tag of a [`TripEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Start,
    Move,
    Stop,
    End,
}

impl EventKind {
    /// The event type as it appears in a recorded trip.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Move => "move",
            Self::Stop => "stop",
            Self::End => "end",
        }
    }
}

impl std::str::FromStr for EventKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "start" => Ok(Self::Start),
            "move" => Ok(Self::Move),
            "stop" => Ok(Self::Stop),
            "end" => Ok(Self::End),
            other => Err(Error::UnknownEventType(other.to_owned())),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
