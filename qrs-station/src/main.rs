//! qrs-station - barcode scan station
//!
//! Records scanned codes per target and day, reports hourly production
//! statistics and exports days to spreadsheets.

use std::fs::OpenOptions;
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use qrs_common::config::{load_toml_config, resolve_root_folder, LoggingConfig};
use qrs_common::storage::JsonFileStore;
use qrs_station::cli::Args;
use qrs_station::{commands, Station};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let config = load_toml_config(args.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(&config.logging)?;

    info!("Starting qrs-station v{}", env!("CARGO_PKG_VERSION"));

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), &config);
    info!("Data root: {}", root_folder.display());

    let station = Station::new(JsonFileStore::new(root_folder), config);
    let mut stdout = std::io::stdout().lock();
    let ok = commands::run(&station, args.command, args.config.as_deref(), &mut stdout).await?;

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Install the global subscriber
///
/// `RUST_LOG` overrides the configured level. Output goes to stderr so it
/// never mixes with command output; a log file gets a plain-text copy.
fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .context("Invalid log level")?;

    let file_layer = match &logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();
    Ok(())
}
