use std::fmt;

use serde::{Deserialize, Serialize};

pub use crate::meter::Outcome;
use crate::{
    config::FareConfig,
    event::{EventKind, TripEvent},
    meter::Meter,
    types::{
        distance::Kilometers,
        money::Money,
        time::{DateTime, Elapsed},
    },
    Error, Result,
};

/// A single ride of one passenger with one driver.
///
/// The session owns the meter of the ride and forwards every accepted event to it. Every
/// received event is kept in the order it was received, including the events that were
/// rejected.
#[derive(Debug, Clone)]
pub struct RideSession {
    id: String,
    driver: Driver,
    passenger: Passenger,
    status: SessionStatus,
    start_time: Option<DateTime>,
    end_time: Option<DateTime>,
    meter: Meter,
    events: Vec<TripEvent>,
    payment: Option<Payment>,
}

impl RideSession {
    /// Create a session waiting for its passenger.
    pub fn new(
        id: impl Into<String>,
        driver: Driver,
        passenger: Passenger,
        config: FareConfig,
    ) -> Result<Self> {
        Ok(Self {
            id: id.into(),
            driver,
            passenger,
            status: SessionStatus::Waiting,
            start_time: None,
            end_time: None,
            meter: Meter::new(config)?,
            events: Vec::new(),
            payment: None,
        })
    }

    /// Apply a single trip event.
    ///
    /// A start is only accepted while waiting and moves the ride onboard, an end is only
    /// accepted onboard and completes the ride. Moves and stops leave the status as is. The
    /// status only changes once the meter accepted the event.
    pub fn process_event(&mut self, event: &TripEvent) -> Result<Outcome> {
        self.events.push(event.clone());

        let transition = match event {
            TripEvent::Start { timestamp } => Some(self.transition(
                EventKind::Start,
                SessionStatus::Waiting,
                SessionStatus::Onboard,
                *timestamp,
            )?),
            TripEvent::End { timestamp } => Some(self.transition(
                EventKind::End,
                SessionStatus::Onboard,
                SessionStatus::Completed,
                *timestamp,
            )?),
            TripEvent::Move { .. } | TripEvent::Stop { .. } => None,
        };

        let mut outcome = self.meter.process(event)?;

        if let Some(transition) = transition {
            outcome.log_lines.insert(0, self.commit(transition));
        }

        Ok(outcome)
    }

    /// Pay the final fare of a completed ride. A ride is paid exactly once, the amount is the
    /// fare at the moment of payment.
    pub fn process_payment(&mut self, method: PaymentMethod, now: DateTime) -> Result<Outcome> {
        if self.status != SessionStatus::Completed {
            return Err(Error::NotCompleted {
                status: self.status,
            });
        }

        if self.payment.is_some() {
            return Err(Error::AlreadyPaid);
        }

        let payment = Payment {
            method,
            amount: self.meter.current_fare(),
            processed_at: now,
        };
        self.payment = Some(payment);

        Ok(Outcome {
            message: "Payment processed".into(),
            fare_change: Money::zero(),
            total_fare: payment.amount,
            calculation: None,
            trip: None,
            log_lines: vec![format!("Payment processed: {method} - {}", payment.amount)],
        })
    }

    /// A read-only projection of the current state of the ride.
    pub fn summary(&self) -> Summary {
        Summary {
            session_id: self.id.clone(),
            driver: self.driver.clone(),
            passenger: self.passenger.clone(),
            status: self.status,
            start_time: self.start_time,
            end_time: self.end_time,
            total_distance: self.meter.total_distance(),
            total_time: self.meter.total_time(),
            final_fare: self.meter.current_fare(),
            event_count: self.events.len(),
            payment: self.payment,
        }
    }

    fn transition(
        &self,
        event: EventKind,
        from: SessionStatus,
        to: SessionStatus,
        at: DateTime,
    ) -> Result<Transition> {
        if self.status == from {
            Ok(Transition { event, to, at })
        } else {
            Err(Error::InvalidTransition {
                event,
                status: self.status,
            })
        }
    }

    fn commit(&mut self, transition: Transition) -> String {
        self.status = transition.to;

        match transition.event {
            EventKind::Start => {
                self.start_time = Some(transition.at);
                format!("Session started (id: {})", self.id)
            }
            EventKind::End => {
                self.end_time = Some(transition.at);
                format!("Session ended (id: {})", self.id)
            }
            EventKind::Move | EventKind::Stop => {
                unreachable!("only start and end events change the status")
            }
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn driver(&self) -> &Driver {
        &self.driver
    }

    pub fn passenger(&self) -> &Passenger {
        &self.passenger
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn meter(&self) -> &Meter {
        &self.meter
    }

    /// Every received event, in the order it was received.
    pub fn events(&self) -> &[TripEvent] {
        &self.events
    }

    pub fn payment(&self) -> Option<&Payment> {
        self.payment.as_ref()
    }
}

/// A status change that was checked but not applied yet.
struct Transition {
    event: EventKind,
    to: SessionStatus,
    at: DateTime,
}

/// The lifecycle of a ride.
///
/// Only `Waiting`, `Onboard` and `Completed` are reached through trip events. `PickingUp` and
/// `Cancelled` belong to dispatching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Waiting,
    PickingUp,
    Onboard,
    Completed,
    Cancelled,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display = match self {
            Self::Waiting => "waiting",
            Self::PickingUp => "picking_up",
            Self::Onboard => "onboard",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        };

        f.write_str(display)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Driver {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Passenger {
    pub id: String,
    pub name: String,
}

/// How a ride was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Digital,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display = match self {
            Self::Cash => "cash",
            Self::Card => "card",
            Self::Digital => "digital",
        };

        f.write_str(display)
    }
}

/// The payment of a completed ride. Never changes once processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Payment {
    pub method: PaymentMethod,
    /// The fare at the moment the payment was processed.
    pub amount: Money,
    pub processed_at: DateTime,
}

/// Structure containing the state of a ride at the moment it was requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub session_id: String,
    pub driver: Driver,
    pub passenger: Passenger,
    pub status: SessionStatus,
    /// The moment the ride started, `None` while waiting.
    pub start_time: Option<DateTime>,
    /// The moment the ride was completed.
    pub end_time: Option<DateTime>,
    pub total_distance: Kilometers,
    pub total_time: Elapsed,
    pub final_fare: Money,
    /// The amount of received events, including rejected ones.
    pub event_count: usize,
    pub payment: Option<Payment>,
}

impl Summary {
    /// The summary as named fields with their rendered values, in a fixed order. Payment fields
    /// are only present once the ride is paid.
    ///
    /// Timestamps are rendered with `render_time` so the caller decides on the time zone.
    pub fn entries(
        &self,
        render_time: impl Fn(DateTime) -> String,
    ) -> Vec<(&'static str, String)> {
        let optional_time =
            |time: Option<DateTime>| time.map_or_else(|| "-".to_owned(), &render_time);

        let mut entries = vec![
            ("session_id", self.session_id.clone()),
            ("driver", self.driver.name.clone()),
            ("passenger", self.passenger.name.clone()),
            ("status", self.status.to_string()),
            ("start_time", optional_time(self.start_time)),
            ("end_time", optional_time(self.end_time)),
            ("total_distance", self.total_distance.to_string()),
            ("total_time", self.total_time.to_string()),
            ("final_fare", self.final_fare.to_string()),
            ("event_count", self.event_count.to_string()),
        ];

        if let Some(payment) = &self.payment {
            entries.push(("payment_method", payment.method.to_string()));
            entries.push(("payment_amount", payment.amount.to_string()));
            entries.push(("payment_processed", render_time(payment.processed_at)));
        }

        entries
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;

    use super::{Driver, Passenger, PaymentMethod, RideSession, SessionStatus};
    use crate::{
        config::test_config,
        event::{EventKind, Segment, TripEvent},
        types::{money::Money, time::DateTime},
        Error,
    };

    fn at(minute: u32) -> DateTime {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, minute, 0).unwrap()
    }

    fn session() -> RideSession {
        RideSession::new(
            "ride-001",
            Driver {
                id: "driver-123".into(),
                name: "Taro Tanaka".into(),
            },
            Passenger {
                id: "passenger-456".into(),
                name: "Hanako Sato".into(),
            },
            test_config::standard(),
        )
        .unwrap()
    }

    fn start(minute: u32) -> TripEvent {
        TripEvent::Start {
            timestamp: at(minute),
        }
    }

    fn end(minute: u32) -> TripEvent {
        TripEvent::End {
            timestamp: at(minute),
        }
    }

    fn fast_move(minute: u32) -> TripEvent {
        TripEvent::Move {
            timestamp: at(minute),
            segment: Segment {
                distance: dec!(2.1).into(),
                duration: Duration::try_minutes(4).unwrap(),
                speed: dec!(31.5).into(),
            },
        }
    }

    fn completed() -> RideSession {
        let mut session = session();
        session.process_event(&start(0)).unwrap();
        session.process_event(&fast_move(4)).unwrap();
        session.process_event(&end(4)).unwrap();
        session
    }

    #[test]
    fn should_complete_a_ride() {
        let mut session = session();
        assert_eq!(session.status(), SessionStatus::Waiting);

        let outcome = session.process_event(&start(0)).unwrap();
        assert_eq!(session.status(), SessionStatus::Onboard);
        assert_eq!(outcome.total_fare, 500.into());
        assert_eq!(
            outcome.log_lines,
            vec!["Session started (id: ride-001)", "Meter started - initial fare: 500"]
        );

        let outcome = session.process_event(&fast_move(4)).unwrap();
        assert_eq!(session.status(), SessionStatus::Onboard);
        assert_eq!(outcome.fare_change, 400.into());

        let outcome = session.process_event(&end(4)).unwrap();
        assert_eq!(session.status(), SessionStatus::Completed);
        assert_eq!(outcome.total_fare, 900.into());
        assert_eq!(outcome.log_lines[0], "Session ended (id: ride-001)");

        let summary = session.summary();
        assert_eq!(summary.start_time, Some(at(0)));
        assert_eq!(summary.end_time, Some(at(4)));
        assert_eq!(summary.event_count, 3);
        assert_eq!(summary.final_fare, 900.into());
    }

    #[test]
    fn start_on_completed_ride_should_fail() {
        let mut session = completed();

        assert_eq!(
            session.process_event(&start(5)),
            Err(Error::InvalidTransition {
                event: EventKind::Start,
                status: SessionStatus::Completed
            })
        );
        assert_eq!(session.status(), SessionStatus::Completed);
        assert_eq!(session.meter().current_fare(), 900.into());
        assert_eq!(session.events().len(), 4);
    }

    #[test]
    fn start_while_onboard_should_fail() {
        let mut session = session();
        session.process_event(&start(0)).unwrap();

        assert_eq!(
            session.process_event(&start(1)),
            Err(Error::InvalidTransition {
                event: EventKind::Start,
                status: SessionStatus::Onboard
            })
        );
        assert_eq!(session.status(), SessionStatus::Onboard);
        assert_eq!(session.summary().start_time, Some(at(0)));
        assert_eq!(session.meter().current_fare(), 500.into());
    }

    #[test]
    fn end_on_completed_ride_should_fail() {
        let mut session = completed();

        assert_eq!(
            session.process_event(&end(6)),
            Err(Error::InvalidTransition {
                event: EventKind::End,
                status: SessionStatus::Completed
            })
        );
        assert_eq!(session.status(), SessionStatus::Completed);
        assert_eq!(session.summary().end_time, Some(at(4)));
        assert_eq!(session.events().len(), 4);
    }

    #[test]
    fn end_before_start_should_fail() {
        let mut session = session();

        assert_eq!(
            session.process_event(&end(0)),
            Err(Error::InvalidTransition {
                event: EventKind::End,
                status: SessionStatus::Waiting
            })
        );
        assert_eq!(session.summary().end_time, None);
    }

    #[test]
    fn move_before_start_should_fail_in_meter() {
        let mut session = session();

        assert_eq!(
            session.process_event(&fast_move(1)),
            Err(Error::MeterNotRunning {
                event: EventKind::Move
            })
        );
        assert_eq!(session.status(), SessionStatus::Waiting);
    }

    #[test]
    fn rejected_events_should_be_logged() {
        let mut session = session();

        let results = [
            session.process_event(&end(0)).map(|_| ()),
            session.process_event(&fast_move(1)).map(|_| ()),
            session.process_event(&start(2)).map(|_| ()),
            session.process_event(&start(3)).map(|_| ()),
        ];

        assert_eq!(
            results,
            [
                Err(Error::InvalidTransition {
                    event: EventKind::End,
                    status: SessionStatus::Waiting
                }),
                Err(Error::MeterNotRunning {
                    event: EventKind::Move
                }),
                Ok(()),
                Err(Error::InvalidTransition {
                    event: EventKind::Start,
                    status: SessionStatus::Onboard
                }),
            ]
        );

        assert_eq!(session.events().len(), 4);
        assert_eq!(session.events()[0], end(0));
        assert_eq!(session.summary().event_count, 4);
        assert_eq!(session.summary().start_time, Some(at(2)));
    }

    #[test]
    fn payment_before_completion_should_fail() {
        let mut session = session();
        session.process_event(&start(0)).unwrap();

        assert_eq!(
            session.process_payment(PaymentMethod::Cash, at(1)),
            Err(Error::NotCompleted {
                status: SessionStatus::Onboard
            })
        );
        assert!(session.payment().is_none());
    }

    #[test]
    fn payment_should_happen_once() {
        let mut session = completed();

        let outcome = session.process_payment(PaymentMethod::Card, at(5)).unwrap();
        assert_eq!(outcome.total_fare, 900.into());
        assert_eq!(outcome.fare_change, Money::zero());
        assert_eq!(outcome.log_lines, vec!["Payment processed: card - 900"]);

        assert_eq!(
            session.process_event(&fast_move(6)),
            Err(Error::MeterNotRunning {
                event: EventKind::Move
            })
        );
        assert_eq!(
            session.process_event(&start(7)),
            Err(Error::InvalidTransition {
                event: EventKind::Start,
                status: SessionStatus::Completed
            })
        );

        assert_eq!(
            session.process_payment(PaymentMethod::Cash, at(8)),
            Err(Error::AlreadyPaid)
        );

        let payment = session.payment().unwrap();
        assert_eq!(payment.method, PaymentMethod::Card);
        assert_eq!(payment.amount, 900.into());
        assert_eq!(payment.processed_at, at(5));
    }

    #[test]
    fn summary_entries_should_include_payment_once_paid() {
        let mut session = completed();
        let render = |time: DateTime| time.format("%H:%M").to_string();

        let keys: Vec<_> = session
            .summary()
            .entries(render)
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        assert!(!keys.contains(&"payment_method"));

        session
            .process_payment(PaymentMethod::Digital, at(9))
            .unwrap();

        let entries = session.summary().entries(render);
        assert_eq!(entries.len(), 13);
        assert!(entries.contains(&("driver", "Taro Tanaka".to_owned())));
        assert!(entries.contains(&("total_distance", "2.10 km".to_owned())));
        assert!(entries.contains(&("start_time", "09:00".to_owned())));
        assert!(entries.contains(&("payment_method", "digital".to_owned())));
        assert!(entries.contains(&("payment_processed", "09:09".to_owned())));
    }

    #[test]
    fn waiting_summary_should_render_missing_times() {
        let entries = session().summary().entries(|time| time.to_rfc3339());

        assert!(entries.contains(&("start_time", "-".to_owned())));
        assert!(entries.contains(&("status", "waiting".to_owned())));
        assert!(entries.contains(&("final_fare", "0".to_owned())));
    }
}
