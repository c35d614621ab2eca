//! A recorded trip as it is exchanged in JSON.
//!
//! ```json
//! {
//!   "session_id": "ride-001",
//!   "driver": { "id": "driver-123", "name": "Taro Tanaka" },
//!   "passenger": { "id": "passenger-456", "name": "Hanako Sato" },
//!   "events": [
//!     { "type": "start", "timestamp": "2024-05-01T09:00:00Z" },
//!     { "type": "move", "timestamp": "2024-05-01T09:02:00Z", "distance": 0.8, "duration": 120, "speed": 24.0 },
//!     { "type": "stop", "timestamp": "2024-05-01T09:04:00Z", "duration": 120 },
//!     { "type": "end", "timestamp": "2024-05-01T09:04:00Z" }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::{
    config::FareConfig,
    event::{EventKind, Segment, TripEvent},
    session::{Driver, Passenger},
    types::{
        distance::{Kilometers, KmPerHour},
        time::{DateTime, SecondsRound},
    },
    Error, Result,
};

/// A recorded ride: who took part, optionally the tariff, and every event in the order it
/// occurred.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TripFeed {
    /// Identifier of the ride.
    pub session_id: String,

    pub driver: Driver,

    pub passenger: Passenger,

    /// The tariff the ride is priced with. Can be overridden while replaying.
    #[serde(default)]
    pub fare: Option<FareConfig>,

    /// The events of the ride, in the order they occurred.
    pub events: Vec<FeedEvent>,
}

/// A single recorded event. Which of the segment fields are required depends on the event type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FeedEvent {
    /// One of `start`, `move`, `stop` or `end`.
    #[serde(rename = "type")]
    pub event_type: String,

    /// The moment the event occurred.
    pub timestamp: DateTime,

    /// The distance of a move, in kilometers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<Kilometers>,

    /// The duration of a move or a stop, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<SecondsRound>,

    /// The average speed of a move, in kilometers per hour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<KmPerHour>,
}

impl FeedEvent {
    /// The kind of this event, fails for event types outside the vocabulary.
    pub fn kind(&self) -> Result<EventKind> {
        self.event_type.parse()
    }
}

impl TryFrom<&FeedEvent> for TripEvent {
    type Error = Error;

    fn try_from(event: &FeedEvent) -> Result<Self> {
        let timestamp = event.timestamp;

        let trip_event = match event.kind()? {
            EventKind::Start => Self::Start { timestamp },
            EventKind::Move => Self::Move {
                timestamp,
                segment: Segment {
                    distance: required(event.distance, EventKind::Move, "distance")?,
                    duration: required(event.duration, EventKind::Move, "duration")?.into(),
                    speed: required(event.speed, EventKind::Move, "speed")?,
                },
            },
            EventKind::Stop => Self::Stop {
                timestamp,
                duration: required(event.duration, EventKind::Stop, "duration")?.into(),
            },
            EventKind::End => Self::End { timestamp },
        };

        Ok(trip_event)
    }
}

fn required<T>(value: Option<T>, event: EventKind, field: &'static str) -> Result<T> {
    value.ok_or(Error::MissingSegmentField { event, field })
}
