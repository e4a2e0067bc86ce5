#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use tracing::{Level as TraceLevel, debug};
use tracing_subscriber::FmtSubscriber;

use campaign_ledger::cli::{self, Cli};
use campaign_ledger::config::Settings;

fn parse_level(level: &str) -> TraceLevel {
    match level.to_lowercase().as_str() {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "info" => TraceLevel::INFO,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::WARN,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load()?;

    // LOG_LEVEL wins over the settings file
    let log_level = parse_level(&std::env::var("LOG_LEVEL").unwrap_or_else(|_| settings.log_level.clone()));

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    debug!(settings = ?settings, "Starting campaign-ledger");

    cli::run(cli, settings)
}
