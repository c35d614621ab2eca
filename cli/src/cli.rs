use std::{
    borrow::Cow,
    fs::File,
    io::stdin,
    path::{Path, PathBuf},
    process::exit,
};

use chrono::Utc;
use chrono_tz::Tz;
use clap::{Args, Parser, Subcommand, ValueEnum};
use console::style;
use tabled::{settings::Style, Table, Tabled};
use taxi_meter::{
    config::FareConfig,
    explain::explain,
    feed::TripFeed,
    lint::lint,
    replay::{Replay, Report},
    session::PaymentMethod,
};

use crate::{error::Error, Result};

/// The ride of the built-in demo.
const DEMO_FEED: &str = include_str!("../resources/demo.json");

#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Log debug information. `RUST_LOG` overrides this.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[clap(subcommand)]
    command: Command,
}

impl Cli {
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }

    pub fn run(self) {
        if let Err(err) = self.command.run() {
            eprintln!("{} {err}", style("error:").red().bold());
            exit(1);
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Replay a recorded trip through a ride session, priced with either a provided fare
    /// configuration or the one contained in the trip itself.
    ///
    /// Every processed event is logged, followed by a summary of the ride.
    Run(Run),
    /// Describe a fare configuration in human readable terms.
    Explain(ExplainArgs),
    /// Check a recorded trip for events the meter will reject or that look suspicious.
    Lint(Lint),
    /// Replay the built-in sample ride.
    Demo(Demo),
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Self::Run(args) => args.run(),
            Self::Explain(args) => args.run(),
            Self::Lint(args) => args.run(),
            Self::Demo(args) => args.run(),
        }
    }
}

/// How the passenger pays once the ride is completed.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum PayMethod {
    Cash,
    Card,
    Digital,
}

impl From<PayMethod> for PaymentMethod {
    fn from(value: PayMethod) -> Self {
        match value {
            PayMethod::Cash => Self::Cash,
            PayMethod::Card => Self::Card,
            PayMethod::Digital => Self::Digital,
        }
    }
}

#[derive(Debug, Args)]
pub struct FeedArgs {
    /// A path to the recorded trip in json format.
    ///
    /// If no path is provided the trip is read from standard in.
    #[arg(short = 'f', long)]
    feed: Option<PathBuf>,
}

impl FeedArgs {
    fn feed_name(&self) -> Cow<'_, str> {
        self.feed
            .as_ref()
            .and_then(|path| path.file_name())
            .map_or("<stdin>".into(), |name| name.to_string_lossy())
    }

    fn load_feed(&self) -> Result<TripFeed> {
        if let Some(path) = &self.feed {
            tracing::debug!(path = %path.display(), "loading trip feed");

            let file = File::open(path).map_err(|e| Error::file(path.clone(), e))?;
            serde_json::from_reader(&file)
                .map_err(|e| Error::deserialize(path.display(), "trip", e))
        } else {
            tracing::debug!("reading trip feed from standard in");

            let mut stdin = stdin().lock();
            serde_json::from_reader(&mut stdin)
                .map_err(|e| Error::deserialize("<stdin>", "trip", e))
        }
    }
}

fn load_config(path: &Path) -> Result<FareConfig> {
    tracing::debug!(path = %path.display(), "loading fare configuration");

    let file = File::open(path).map_err(|e| Error::file(path.to_path_buf(), e))?;
    serde_json::from_reader(&file)
        .map_err(|e| Error::deserialize(path.display(), "fare configuration", e))
}

#[derive(Debug, Args)]
pub struct OutputArgs {
    /// Pay the ride with this method once all events are processed.
    #[arg(long)]
    pay: Option<PayMethod>,
    /// Timezone for displaying the times of the ride.
    #[arg(short = 'z', long, default_value = "Asia/Tokyo")]
    timezone: Tz,
    /// Print the report as json instead of a table.
    #[arg(long)]
    json: bool,
}

impl OutputArgs {
    fn replay(&self, replay: Replay) -> Result<()> {
        let replay = match self.pay {
            Some(method) => replay.with_payment(method.into(), Utc::now()),
            None => replay,
        };

        let report = replay.build_report();
        emit(&report);

        if self.json {
            let json = serde_json::to_string_pretty(&report).map_err(Error::Serialize)?;
            println!("{json}");
        } else {
            self.print_summary(&report);
        }

        Ok(())
    }

    fn print_summary(&self, report: &Report) {
        let timezone = self.timezone;
        let rows = report
            .summary
            .entries(|time| {
                time.with_timezone(&timezone)
                    .format("%Y-%m-%d %H:%M:%S %Z")
                    .to_string()
            })
            .into_iter()
            .map(|(field, value)| SummaryRow { field, value });

        println!("{}", Table::new(rows).with(Style::modern()));

        let failures = report.failures().count();
        if failures > 0 {
            println!(
                "{}",
                style(format!("{failures} event(s) were rejected")).red()
            );
        }
    }
}

/// Log the outcome of every event of the report.
fn emit(report: &Report) {
    for event in report.events.iter().chain(report.payment.iter()) {
        if event.success {
            tracing::debug!(
                index = event.index,
                event_type = %event.event_type,
                fare_change = %event.fare_change,
                "{}",
                event.message
            );

            for line in &event.log_lines {
                tracing::info!("{line}");
            }
        } else {
            tracing::error!(
                index = event.index,
                event_type = %event.event_type,
                "{}",
                event.message
            );
        }
    }
}

#[derive(Debug, Tabled)]
struct SummaryRow {
    field: &'static str,
    value: String,
}

#[derive(Debug, Parser)]
pub struct Run {
    #[command(flatten)]
    args: FeedArgs,
    /// A path to the fare configuration in json format.
    ///
    /// If no path is provided, then the fare configuration is expected to be contained inside
    /// the recorded trip.
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,
    #[command(flatten)]
    output: OutputArgs,
}

impl Run {
    fn config_name(&self) -> Cow<'_, str> {
        self.config
            .as_ref()
            .and_then(|path| path.file_name())
            .map_or("<trip-fare>".into(), |name| name.to_string_lossy())
    }

    fn run(self) -> Result<()> {
        let feed = self.args.load_feed()?;

        let replay = if let Some(path) = &self.config {
            Replay::with_config(&feed, load_config(path)?)?
        } else {
            Replay::new(&feed)?
        };

        eprintln!(
            "{} `{}` with fare `{}`",
            style("Replaying").green(),
            self.args.feed_name(),
            self.config_name()
        );

        self.output.replay(replay)
    }
}

#[derive(Debug, Parser)]
pub struct ExplainArgs {
    /// A path to the fare configuration in json format.
    #[arg(short = 'c', long)]
    config: PathBuf,
}

impl ExplainArgs {
    fn run(self) -> Result<()> {
        let config = load_config(&self.config)?;

        println!("{}", style("Fare").green().bold());

        for line in explain(&config).lines() {
            println!("  {line}");
        }

        Ok(())
    }
}

#[derive(Debug, Parser)]
pub struct Lint {
    #[command(flatten)]
    args: FeedArgs,
}

impl Lint {
    fn run(self) -> Result<()> {
        let feed = self.args.load_feed()?;
        let warnings = lint(&feed);

        for warning in &warnings {
            tracing::warn!("{warning}");
        }

        if warnings.is_empty() {
            println!(
                "{} `{}` has no warnings",
                style("Clean").green(),
                self.args.feed_name()
            );
        } else {
            println!(
                "{} `{}` has {} warning(s)",
                style("Linted").yellow(),
                self.args.feed_name(),
                warnings.len()
            );
        }

        Ok(())
    }
}

#[derive(Debug, Parser)]
pub struct Demo {
    #[command(flatten)]
    output: OutputArgs,
}

impl Demo {
    fn run(self) -> Result<()> {
        let feed: TripFeed = serde_json::from_str(DEMO_FEED)
            .map_err(|e| Error::deserialize("<demo>", "trip", e))?;

        eprintln!("{} the sample ride", style("Replaying").green());

        self.output.replay(Replay::new(&feed)?)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use taxi_meter::{feed::TripFeed, replay::Replay};

    use super::{Cli, Command, DEMO_FEED};

    #[test]
    fn demo_ride_should_replay() {
        let feed: TripFeed = serde_json::from_str(DEMO_FEED).unwrap();
        let report = Replay::new(&feed).unwrap().build_report();

        assert_eq!(report.final_fare, 1300.into());
        assert_eq!(report.failures().count(), 0);
    }

    #[test]
    fn should_parse_run_arguments() {
        let cli = Cli::try_parse_from([
            "taxi-meter",
            "run",
            "-f",
            "ride.json",
            "--pay",
            "digital",
            "-z",
            "UTC",
            "-v",
        ])
        .unwrap();

        assert_eq!(cli.log_level(), "debug");
        assert!(matches!(cli.command, Command::Run(_)));
    }

    #[test]
    fn explain_should_require_config() {
        assert!(Cli::try_parse_from(["taxi-meter", "explain"]).is_err());
    }
}
