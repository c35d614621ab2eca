use rust_decimal::Decimal;

use crate::{config::FareConfig, types::money::Money};

#[derive(Debug)]
pub struct Explain {
    pub initial: ExplainInitial,
    pub distance_rate: ExplainRate,
    pub time_rate: ExplainRate,
}

#[derive(Debug)]
pub struct ExplainInitial {
    pub fare: Money,
    pub distance: String,
}

#[derive(Debug)]
pub struct ExplainRate {
    pub fare: Money,
    /// The unit the fare is charged per.
    pub unit: String,
    /// When this rate applies.
    pub condition: String,
}

impl ExplainRate {
    fn describe(&self) -> String {
        format!("{} per full {}, {}", self.fare, self.unit, self.condition)
    }
}

impl Explain {
    /// The explanation as human readable lines.
    pub fn lines(&self) -> Vec<String> {
        vec![
            format!(
                "{} for the first {}",
                self.initial.fare, self.initial.distance
            ),
            self.distance_rate.describe(),
            self.time_rate.describe(),
        ]
    }
}

pub fn explain(config: &FareConfig) -> Explain {
    let threshold = Decimal::from(config.time_threshold).normalize();

    Explain {
        initial: ExplainInitial {
            fare: config.initial_fare,
            distance: format!("{} km", Decimal::from(config.initial_distance).normalize()),
        },
        distance_rate: ExplainRate {
            fare: config.unit_fare,
            unit: format!("{} km", Decimal::from(config.unit_distance).normalize()),
            condition: format!("beyond the initial distance while faster than {threshold} km/h"),
        },
        time_rate: ExplainRate {
            fare: config.time_unit_fare,
            unit: config.time_unit.to_string(),
            condition: format!("while stopped or at most {threshold} km/h"),
        },
    }
}
