use chrono::{TimeZone, Utc};
use taxi_meter::{
    explain::explain,
    feed::TripFeed,
    lint::{lint, Warning},
    replay::Replay,
    session::{PaymentMethod, SessionStatus},
    Error,
};

mod common;

#[test]
fn test_json_files() {
    let mut should_panic = false;

    for json_test in common::collect_json_tests().unwrap() {
        eprintln!("\ntesting directory {:?}", json_test.path);

        for (name, case) in &json_test.cases {
            eprint!("  testing json case `{name}`: ");

            let config = json_test.config.clone();
            let result = std::panic::catch_unwind(|| {
                common::validate_case(case, config).unwrap();
            });

            if result.is_err() {
                should_panic = true;
            } else {
                eprintln!("success");
            }
        }
    }

    assert!(!should_panic, "not all json tests succeeded");
}

fn sample_ride() -> TripFeed {
    let case: common::Case = serde_json::from_str(include_str!(
        "../resources/tokyo/sample_ride.json"
    ))
    .unwrap();

    case.feed
}

#[test]
fn sample_ride_should_be_paid_once() {
    let paid_at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 12, 0).unwrap();

    let (report, mut session) = Replay::with_config(&sample_ride(), fare_config!("tokyo"))
        .unwrap()
        .with_payment(PaymentMethod::Card, paid_at)
        .run();

    let payment = report.payment.unwrap();
    assert!(payment.success);
    assert_eq!(payment.log_lines, ["Payment processed: card - 1300"]);
    assert_eq!(session.status(), SessionStatus::Completed);

    let later = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
    assert_eq!(
        session.process_payment(PaymentMethod::Cash, later).unwrap_err(),
        Error::AlreadyPaid
    );
    assert_eq!(session.payment().unwrap().amount, 1300.into());
    assert_eq!(session.payment().unwrap().method, PaymentMethod::Card);
}

#[test]
fn sample_ride_should_log_every_step() {
    let report = Replay::with_config(&sample_ride(), fare_config!("tokyo"))
        .unwrap()
        .build_report();

    let lines: Vec<&str> = report
        .events
        .iter()
        .flat_map(|event| event.log_lines.iter().map(String::as_str))
        .collect();

    assert_eq!(
        lines,
        [
            "Session started (id: ride-001)",
            "Meter started - initial fare: 500",
            "Travel (24.0 km/h) - distance rate applied",
            "  distance fare +0 (within initial distance, total: 500)",
            "Stopped - time rate applied",
            "  time fare +100 (1 time unit, total: 600)",
            "Low speed travel (6.0 km/h) - time rate applied",
            "  time fare +300 (3 time units, total: 900)",
            "Travel (24.0 km/h) - distance rate applied",
            "  distance fare +400 (4 distance units, total: 1300)",
            "Session ended (id: ride-001)",
            "Trip ended",
            "Total distance: 2.10 km",
            "Total time: 00:11:00",
            "Final fare: 1300",
        ]
    );
}

#[test]
fn sample_ride_should_lint_clean() {
    assert_eq!(lint(&sample_ride()), Vec::<Warning>::new());
}

#[test]
fn tariffs_should_explain() {
    let lines = explain(&fare_config!("congested")).lines();

    assert_eq!(
        lines,
        [
            "710 for the first 1.052 km",
            "90 per full 0.233 km, beyond the initial distance while faster than 10 km/h",
            "90 per full 00:01:25, while stopped or at most 10 km/h",
        ]
    );
}
