use std::fmt::Display;

use chrono::Duration;

use crate::{
    event::EventKind,
    feed::{FeedEvent, TripFeed},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    MissingStart,
    UnknownEventType {
        event_index: usize,
        event_type: String,
    },
    TimestampRegression {
        event_index: usize,
    },
    DurationExceedsElapsed {
        event_index: usize,
        elapsed: Duration,
        duration: Duration,
    },
    EventAfterEnd {
        event_index: usize,
    },
}

impl Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingStart => {
                f.write_str("The first event at `$.events[0]` is not a `start`, the meter will reject events until it starts.")
            }
            Self::UnknownEventType {
                event_index,
                event_type,
            } => write!(
                f,
                "Event at `$.events[{event_index}]` has unknown type `{event_type}`, it will be skipped."
            ),
            Self::TimestampRegression { event_index } => write!(
                f,
                "Event at `$.events[{event_index}]` occurred before the previous event, events are processed in the order they are listed."
            ),
            Self::DurationExceedsElapsed {
                event_index,
                elapsed,
                duration,
            } => write!(
                f,
                "Event at `$.events[{event_index}]` reports a duration of {}s but only {}s elapsed since the previous event.",
                duration.num_seconds(),
                elapsed.num_seconds()
            ),
            Self::EventAfterEnd { event_index } => write!(
                f,
                "Event at `$.events[{event_index}]` follows the `end` of the ride and will be rejected."
            ),
        }
    }
}

/// Lint the provided trip feed and produce a set of relevant warnings.
pub fn lint(feed: &TripFeed) -> Vec<Warning> {
    let mut warnings = Vec::new();

    if let Some(first) = feed.events.first() {
        if first.kind().ok() != Some(EventKind::Start) {
            warnings.push(Warning::MissingStart);
        }
    }

    let mut previous: Option<&FeedEvent> = None;
    let mut ended = false;

    for (event_index, event) in feed.events.iter().enumerate() {
        let kind = event.kind().ok();

        if kind.is_none() {
            warnings.push(Warning::UnknownEventType {
                event_index,
                event_type: event.event_type.clone(),
            });
        }

        if ended {
            warnings.push(Warning::EventAfterEnd { event_index });
        }

        if let Some(previous) = previous {
            let elapsed = event.timestamp.signed_duration_since(previous.timestamp);

            if elapsed < Duration::zero() {
                warnings.push(Warning::TimestampRegression { event_index });
            } else if let Some(duration) = event.duration.map(Duration::from) {
                if duration > elapsed {
                    warnings.push(Warning::DurationExceedsElapsed {
                        event_index,
                        elapsed,
                        duration,
                    });
                }
            }
        }

        ended |= kind == Some(EventKind::End);
        previous = Some(event);
    }

    warnings
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::{lint, Warning};
    use crate::feed::TripFeed;

    fn feed(events: &str) -> TripFeed {
        serde_json::from_str(&format!(
            r#"{{
                "session_id": "ride-003",
                "driver": {{ "id": "driver-1", "name": "Driver" }},
                "passenger": {{ "id": "passenger-1", "name": "Passenger" }},
                "events": {events}
            }}"#
        ))
        .unwrap()
    }

    #[test]
    fn clean_feed_should_not_warn() {
        let feed = feed(
            r#"[
                { "type": "start", "timestamp": "2024-05-01T09:00:00Z" },
                { "type": "move", "timestamp": "2024-05-01T09:02:00Z", "distance": 0.8, "duration": 120, "speed": 24 },
                { "type": "move", "timestamp": "2024-05-01T09:05:00Z", "distance": 0.8, "duration": 120, "speed": 24 },
                { "type": "end", "timestamp": "2024-05-01T09:05:00Z" }
            ]"#,
        );

        assert!(lint(&feed).is_empty());
    }

    #[test]
    fn empty_feed_should_not_warn() {
        assert!(lint(&feed("[]")).is_empty());
    }

    #[test]
    fn should_warn_for_every_problem() {
        let feed = feed(
            r#"[
                { "type": "move", "timestamp": "2024-05-01T09:02:00Z", "distance": 0.8, "duration": 120, "speed": 24 },
                { "type": "stop", "timestamp": "2024-05-01T09:03:00Z", "duration": 120 },
                { "type": "honk", "timestamp": "2024-05-01T09:01:00Z" },
                { "type": "end", "timestamp": "2024-05-01T09:04:00Z" },
                { "type": "start", "timestamp": "2024-05-01T09:04:00Z" }
            ]"#,
        );

        assert_eq!(
            lint(&feed),
            vec![
                Warning::MissingStart,
                Warning::DurationExceedsElapsed {
                    event_index: 1,
                    elapsed: Duration::try_seconds(60).unwrap(),
                    duration: Duration::try_seconds(120).unwrap(),
                },
                Warning::UnknownEventType {
                    event_index: 2,
                    event_type: "honk".into(),
                },
                Warning::TimestampRegression { event_index: 2 },
                Warning::EventAfterEnd { event_index: 4 },
            ]
        );
    }

    #[test]
    fn warnings_should_point_at_the_event() {
        let warning = Warning::EventAfterEnd { event_index: 7 };

        assert_eq!(
            warning.to_string(),
            "Event at `$.events[7]` follows the `end` of the ride and will be rejected."
        );
    }
}
