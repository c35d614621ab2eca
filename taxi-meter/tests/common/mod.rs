use std::{
    fs::{read_dir, File},
    path::PathBuf,
};

use chrono::Duration;
use serde::Deserialize;
use taxi_meter::{
    config::FareConfig,
    feed::TripFeed,
    replay::Replay,
    types::{distance::Kilometers, money::Money},
};

pub struct JsonTest {
    pub path: PathBuf,
    pub config: FareConfig,
    pub cases: Vec<(String, Case)>,
}

/// A recorded trip together with the totals it should be metered at.
#[derive(Debug, Deserialize)]
pub struct Case {
    pub feed: TripFeed,
    pub expected: Expected,
}

#[derive(Debug, Deserialize)]
pub struct Expected {
    pub final_fare: Money,
    pub total_distance: Option<Kilometers>,
    /// In seconds.
    pub total_time: Option<i64>,
    pub status: Option<String>,
    pub event_count: Option<usize>,
    /// Indices of the events that should be rejected.
    pub failed_events: Option<Vec<usize>>,
}

pub fn collect_json_tests() -> Result<Vec<JsonTest>, Box<dyn std::error::Error>> {
    let mut tests = Vec::new();

    for test_dir in read_dir(concat!(env!("CARGO_MANIFEST_DIR"), "/resources"))? {
        let test_dir_path = test_dir?.path();

        if !test_dir_path.is_dir() {
            continue;
        }

        let mut config = None;
        let mut cases = Vec::new();

        for json_file in read_dir(&test_dir_path)? {
            let file_path = json_file?.path();

            if file_path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }

            let file_stem = file_path.file_stem().unwrap().to_string_lossy().to_string();
            if file_stem == "config" {
                config = Some(serde_json::from_reader(File::open(&file_path)?)?);
            } else {
                cases.push((file_stem, serde_json::from_reader(File::open(&file_path)?)?));
            }
        }

        cases.sort_by(|(a, _), (b, _)| a.cmp(b));

        tests.push(JsonTest {
            config: config
                .unwrap_or_else(|| panic!("no config.json in test directory {test_dir_path:?}")),
            cases,
            path: test_dir_path,
        });
    }

    Ok(tests)
}

#[macro_export]
macro_rules! fare_config {
    ($name:literal) => {
        serde_json::from_str::<'_, taxi_meter::config::FareConfig>(include_str!(concat!(
            "../resources/",
            $name,
            "/config.json"
        )))
        .unwrap()
    };
}

pub fn validate_case(case: &Case, config: FareConfig) -> Result<(), taxi_meter::Error> {
    let report = Replay::with_config(&case.feed, config)?.build_report();
    let expected = &case.expected;

    assert_eq!(report.final_fare, expected.final_fare, "final_fare");
    assert_eq!(report.summary.final_fare, expected.final_fare, "summary final_fare");

    if let Some(total_distance) = expected.total_distance {
        assert_eq!(
            report.summary.total_distance, total_distance,
            "total_distance"
        );
    }

    if let Some(total_time) = expected.total_time {
        assert_eq!(
            Duration::from(report.summary.total_time),
            Duration::try_seconds(total_time).unwrap(),
            "total_time"
        );
    }

    if let Some(status) = &expected.status {
        assert_eq!(&report.summary.status.to_string(), status, "status");
    }

    if let Some(event_count) = expected.event_count {
        assert_eq!(report.summary.event_count, event_count, "event_count");
    }

    if let Some(failed_events) = &expected.failed_events {
        let failed: Vec<_> = report.failures().map(|event| event.index).collect();
        assert_eq!(&failed, failed_events, "failed_events");
    }

    Ok(())
}
