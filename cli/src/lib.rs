use clap::Parser;

mod cli;
mod error;
mod logger;

type Result<T> = std::result::Result<T, error::Error>;

pub fn run() {
    let cli = cli::Cli::parse();
    logger::init_logging(cli.log_level());
    cli.run();
}
