use std::fmt;

use chrono::Duration;
use serde::Serialize;

use crate::{
    config::FareConfig,
    event::{EventKind, Segment, TripEvent},
    types::{
        distance::Kilometers,
        money::Money,
        time::{DateTime, Elapsed},
    },
    Error, Result,
};

/// The fare engine of a single ride.
///
/// A meter starts out not running with a zero fare. A start event sets the initial fare, after
/// which every move and stop adds to the fare until the end event stops the meter.
///
/// ```ignore
/// let mut meter = Meter::new(config)?;
/// meter.process(&TripEvent::Start { timestamp })?;
/// let outcome = meter.process(&TripEvent::Move { timestamp, segment })?;
/// println!("charged {}", outcome.fare_change);
/// ```
#[derive(Debug, Clone)]
pub struct Meter {
    config: FareConfig,
    state: MeterState,
    total_distance: Kilometers,
    total_time: Elapsed,
    current_fare: Money,
    start_time: Option<DateTime>,
    last_event_time: Option<DateTime>,
}

impl Meter {
    /// Create a meter that is not running yet. Fails if the config can not be used for pricing.
    pub fn new(config: FareConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            state: MeterState::NotRunning,
            total_distance: Kilometers::zero(),
            total_time: Elapsed::zero(),
            current_fare: Money::zero(),
            start_time: None,
            last_event_time: None,
        })
    }

    /// Apply a single trip event.
    pub fn process(&mut self, event: &TripEvent) -> Result<Outcome> {
        match event {
            TripEvent::Start { timestamp } => self.start(*timestamp),
            TripEvent::Move { timestamp, segment } => self.travel(*timestamp, segment),
            TripEvent::Stop {
                timestamp,
                duration,
            } => self.stop(*timestamp, *duration),
            TripEvent::End { timestamp } => self.end(*timestamp),
        }
    }

    /// Start the meter at the initial fare.
    pub fn start(&mut self, timestamp: DateTime) -> Result<Outcome> {
        if self.is_running() {
            return Err(Error::AlreadyRunning);
        }

        self.state = MeterState::Running;
        self.start_time = Some(timestamp);
        self.last_event_time = Some(timestamp);
        self.current_fare = self.config.initial_fare;
        self.total_distance = Kilometers::zero();
        self.total_time = Elapsed::zero();

        Ok(Outcome {
            message: "Meter started".into(),
            fare_change: self.current_fare,
            total_fare: self.current_fare,
            calculation: None,
            trip: None,
            log_lines: vec![format!(
                "Meter started - initial fare: {}",
                self.current_fare
            )],
        })
    }

    /// Account for a moving segment. Segments at or below the time threshold speed are charged
    /// by their duration, faster segments by the distance units they cross.
    pub fn travel(&mut self, timestamp: DateTime, segment: &Segment) -> Result<Outcome> {
        self.ensure_running(EventKind::Move)?;
        segment.validate()?;

        let total_distance = self.total_distance.saturating_add(segment.distance);

        let calculation = if segment.speed <= self.config.time_threshold {
            self.time_fare(segment.duration)?
        } else {
            self.distance_fare(total_distance, segment.distance)?
        };

        let current_fare = self.charge(&calculation)?;

        self.total_distance = total_distance;
        self.total_time = self.total_time.saturating_add(segment.duration);
        self.last_event_time = Some(timestamp);
        self.current_fare = current_fare;

        let mut log_lines = vec![match calculation.mode {
            PricingMode::Time => {
                format!("Low speed travel ({}) - time rate applied", segment.speed)
            }
            PricingMode::Distance => {
                format!("Travel ({}) - distance rate applied", segment.speed)
            }
        }];
        log_lines.push(self.charge_line(&calculation));

        Ok(Outcome {
            message: "Movement processed".into(),
            fare_change: calculation.amount,
            total_fare: self.current_fare,
            calculation: Some(calculation),
            trip: None,
            log_lines,
        })
    }

    /// Account for standing still. Waiting time is always charged by time, whatever the speed
    /// before the stop was.
    pub fn stop(&mut self, timestamp: DateTime, duration: Duration) -> Result<Outcome> {
        self.ensure_running(EventKind::Stop)?;

        if duration < Duration::zero() {
            return Err(Error::NegativeSegmentValue {
                event: EventKind::Stop,
                field: "duration",
            });
        }

        let calculation = self.time_fare(duration)?;
        let current_fare = self.charge(&calculation)?;

        self.total_time = self.total_time.saturating_add(duration);
        self.last_event_time = Some(timestamp);
        self.current_fare = current_fare;

        let log_lines = vec![
            "Stopped - time rate applied".to_owned(),
            self.charge_line(&calculation),
        ];

        Ok(Outcome {
            message: "Stop processed".into(),
            fare_change: calculation.amount,
            total_fare: self.current_fare,
            calculation: Some(calculation),
            trip: None,
            log_lines,
        })
    }

    /// Stop the meter. The fare is final from here on.
    pub fn end(&mut self, timestamp: DateTime) -> Result<Outcome> {
        self.ensure_running(EventKind::End)?;

        self.state = MeterState::NotRunning;
        self.last_event_time = Some(timestamp);

        let trip = self.totals();

        Ok(Outcome {
            message: "Meter stopped".into(),
            fare_change: Money::zero(),
            total_fare: self.current_fare,
            calculation: None,
            trip: Some(trip),
            log_lines: vec![
                "Trip ended".to_owned(),
                format!("Total distance: {}", trip.total_distance),
                format!("Total time: {}", trip.total_time),
                format!("Final fare: {}", trip.final_fare),
            ],
        })
    }

    /// Charge the distance units newly crossed by a segment of `segment_distance` that brought
    /// the cumulative distance to `total_distance`.
    fn distance_fare(
        &self,
        total_distance: Kilometers,
        segment_distance: Kilometers,
    ) -> Result<FareCalculation> {
        if total_distance <= self.config.initial_distance {
            return Ok(FareCalculation::none(
                PricingMode::Distance,
                ChargeReason::WithinInitialDistance,
            ));
        }

        let units = self.distance_units(total_distance)?;
        let previous_units = self.distance_units(total_distance.sub_or_zero(segment_distance))?;
        let new_units = units.saturating_sub(previous_units);

        if new_units == 0 {
            return Ok(FareCalculation::none(
                PricingMode::Distance,
                ChargeReason::NoNewUnits,
            ));
        }

        Ok(FareCalculation {
            mode: PricingMode::Distance,
            units: new_units,
            amount: self
                .config
                .unit_fare
                .checked_times(new_units)
                .ok_or(Error::NumericOverflow)?,
            reason: ChargeReason::Charged,
        })
    }

    /// The whole distance units beyond the initial distance at a cumulative `distance`.
    fn distance_units(&self, distance: Kilometers) -> Result<u64> {
        distance
            .sub_or_zero(self.config.initial_distance)
            .whole_units(self.config.unit_distance)
            .ok_or(Error::NumericOverflow)
    }

    /// Charge the whole time units of a single segment. Time is not carried over between
    /// segments.
    fn time_fare(&self, duration: Duration) -> Result<FareCalculation> {
        let unit = Duration::from(self.config.time_unit).num_milliseconds();
        let units = duration
            .num_milliseconds()
            .checked_div(unit)
            .and_then(|units| u64::try_from(units).ok())
            .ok_or(Error::NumericOverflow)?;

        if units == 0 {
            return Ok(FareCalculation::none(
                PricingMode::Time,
                ChargeReason::BelowTimeUnit,
            ));
        }

        Ok(FareCalculation {
            mode: PricingMode::Time,
            units,
            amount: self
                .config
                .time_unit_fare
                .checked_times(units)
                .ok_or(Error::NumericOverflow)?,
            reason: ChargeReason::Charged,
        })
    }

    /// The fare after adding `calculation`. Leaves the meter untouched on overflow.
    fn charge(&self, calculation: &FareCalculation) -> Result<Money> {
        self.current_fare
            .checked_add(calculation.amount)
            .ok_or(Error::NumericOverflow)
    }

    fn charge_line(&self, calculation: &FareCalculation) -> String {
        let rate = match calculation.mode {
            PricingMode::Time => "time",
            PricingMode::Distance => "distance",
        };

        format!(
            "  {rate} fare +{} ({calculation}, total: {})",
            calculation.amount, self.current_fare
        )
    }

    fn ensure_running(&self, event: EventKind) -> Result<()> {
        if self.is_running() {
            Ok(())
        } else {
            Err(Error::MeterNotRunning { event })
        }
    }

    fn totals(&self) -> TripTotals {
        TripTotals {
            total_distance: self.total_distance,
            total_time: self.total_time,
            final_fare: self.current_fare,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == MeterState::Running
    }

    pub fn current_fare(&self) -> Money {
        self.current_fare
    }

    pub fn total_distance(&self) -> Kilometers {
        self.total_distance
    }

    pub fn total_time(&self) -> Elapsed {
        self.total_time
    }

    pub fn start_time(&self) -> Option<DateTime> {
        self.start_time
    }

    pub fn last_event_time(&self) -> Option<DateTime> {
        self.last_event_time
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MeterState {
    NotRunning,
    Running,
}

/// The two mutually exclusive ways a segment is priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingMode {
    Distance,
    Time,
}

/// Why a calculation charged what it charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeReason {
    /// The cumulative distance is still covered by the initial fare.
    WithinInitialDistance,
    /// The segment did not complete a distance unit that was not billed before.
    NoNewUnits,
    /// The segment was shorter than a single time unit.
    BelowTimeUnit,
    /// One or more units were charged.
    Charged,
}

/// The result of pricing a single segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FareCalculation {
    pub mode: PricingMode,
    /// The amount of units charged.
    pub units: u64,
    /// The amount added to the fare.
    pub amount: Money,
    pub reason: ChargeReason,
}

impl FareCalculation {
    fn none(mode: PricingMode, reason: ChargeReason) -> Self {
        Self {
            mode,
            units: 0,
            amount: Money::zero(),
            reason,
        }
    }
}

impl fmt::Display for FareCalculation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            ChargeReason::WithinInitialDistance => f.write_str("within initial distance"),
            ChargeReason::NoNewUnits => f.write_str("no additional units"),
            ChargeReason::BelowTimeUnit => f.write_str("below one time unit"),
            ChargeReason::Charged => {
                let mode = match self.mode {
                    PricingMode::Distance => "distance",
                    PricingMode::Time => "time",
                };
                let plural = if self.units == 1 { "" } else { "s" };

                write!(f, "{} {mode} unit{plural}", self.units)
            }
        }
    }
}

/// Distance, time and fare of a trip, reported when the meter stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TripTotals {
    pub total_distance: Kilometers,
    pub total_time: Elapsed,
    pub final_fare: Money,
}

/// The result of a successfully processed event or payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    /// A short human readable description of what happened.
    pub message: String,
    /// The amount this event added to the fare.
    pub fare_change: Money,
    /// The fare after this event.
    pub total_fare: Money,
    /// How the segment of a move or stop was priced.
    pub calculation: Option<FareCalculation>,
    /// The trip totals, only present once the meter stopped.
    pub trip: Option<TripTotals>,
    /// Human readable lines describing the event, for the caller to emit.
    pub log_lines: Vec<String>,
}
