use serde::Serialize;

use crate::{
    config::FareConfig,
    event::TripEvent,
    feed::{FeedEvent, TripFeed},
    session::{Outcome, PaymentMethod, RideSession, Summary},
    types::{money::Money, time::DateTime},
    Error, Result,
};

/// Replay that feeds a recorded trip through a new ride session.
/// To run the replay call `build_report`. The resulting report contains the outcome of every
/// event, the final fare and a summary of the ride.
///
/// Either use the tariff contained in the `TripFeed`.
/// ```ignore
/// let replay = Replay::new(&feed)?;
/// let report = replay.build_report();
/// ```
///
/// Or provide both the `TripFeed` and a `FareConfig`.
/// ```ignore
/// let replay = Replay::with_config(&feed, config)?.with_payment(PaymentMethod::Card, now);
/// let report = replay.build_report();
/// ```
pub struct Replay {
    session: RideSession,
    events: Vec<FeedEvent>,
    payment: Option<(PaymentMethod, DateTime)>,
}

impl Replay {
    /// Instantiate the replay with a `TripFeed` that contains a fare config.
    pub fn new(feed: &TripFeed) -> Result<Self> {
        let config = feed.fare.clone().ok_or(Error::NoFareConfig)?;
        Self::with_config(feed, config)
    }

    /// Instantiate the replay with a `TripFeed` priced with `config`, whether or not the feed
    /// contains a fare config.
    pub fn with_config(feed: &TripFeed, config: FareConfig) -> Result<Self> {
        let session = RideSession::new(
            feed.session_id.clone(),
            feed.driver.clone(),
            feed.passenger.clone(),
            config,
        )?;

        Ok(Self {
            session,
            events: feed.events.clone(),
            payment: None,
        })
    }

    /// Pay the ride with `method` once all events are processed.
    #[must_use]
    pub fn with_payment(mut self, method: PaymentMethod, at: DateTime) -> Self {
        self.payment = Some((method, at));
        self
    }

    /// Process every event in order and build a report containing the results. A failing event
    /// is reported and the replay continues with the next one.
    pub fn build_report(self) -> Report {
        let (report, _) = self.run();
        report
    }

    /// Like [`Replay::build_report`], but also hands back the session for further use.
    pub fn run(mut self) -> (Report, RideSession) {
        let mut events = Vec::with_capacity(self.events.len());

        for (index, feed_event) in self.events.iter().enumerate() {
            let result = TripEvent::try_from(feed_event)
                .and_then(|event| self.session.process_event(&event));

            events.push(EventReport::new(
                index,
                feed_event.event_type.clone(),
                result,
                self.session.meter().current_fare(),
            ));
        }

        let payment = self.payment.map(|(method, at)| {
            let result = self.session.process_payment(method, at);
            EventReport::new(
                events.len(),
                "payment".to_owned(),
                result,
                self.session.meter().current_fare(),
            )
        });

        let report = Report {
            events,
            payment,
            final_fare: self.session.meter().current_fare(),
            summary: self.session.summary(),
        };

        (report, self.session)
    }
}

/// Structure containing a recorded trip replayed through a ride session.
#[derive(Debug, Serialize)]
pub struct Report {
    /// The outcome of every recorded event, in order.
    pub events: Vec<EventReport>,
    /// The outcome of the payment, if one was requested.
    pub payment: Option<EventReport>,
    /// The fare after the last event.
    pub final_fare: Money,
    /// The state of the ride after the last event and payment.
    pub summary: Summary,
}

impl Report {
    /// The reports of the events that were rejected.
    pub fn failures(&self) -> impl Iterator<Item = &EventReport> {
        self.events
            .iter()
            .chain(self.payment.iter())
            .filter(|event| !event.success)
    }
}

/// A report for a single processed event.
#[derive(Debug, Serialize)]
pub struct EventReport {
    /// The position of the event in the recorded trip.
    pub index: usize,
    /// The event type as recorded.
    pub event_type: String,
    pub success: bool,
    /// What happened, or why the event was rejected.
    pub message: String,
    /// The amount this event added to the fare. Zero for rejected events.
    pub fare_change: Money,
    /// The fare after this event.
    pub total_fare: Money,
    /// Human readable lines describing the event.
    pub log_lines: Vec<String>,
    /// The rejection reason.
    #[serde(skip)]
    pub error: Option<Error>,
}

impl EventReport {
    fn new(index: usize, event_type: String, result: Result<Outcome>, fare: Money) -> Self {
        match result {
            Ok(outcome) => Self {
                index,
                event_type,
                success: true,
                message: outcome.message,
                fare_change: outcome.fare_change,
                total_fare: outcome.total_fare,
                log_lines: outcome.log_lines,
                error: None,
            },
            Err(error) => Self {
                index,
                event_type,
                success: false,
                message: error.to_string(),
                fare_change: Money::zero(),
                total_fare: fare,
                log_lines: Vec::new(),
                error: Some(error),
            },
        }
    }
}
