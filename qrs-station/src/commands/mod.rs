//! Command handlers
//!
//! Each handler takes the [`Station`] plus its arguments and writes
//! operator-facing output to `out`. Logging goes through `tracing`.

mod catalog;
mod export;
mod query;
mod scan;

pub use catalog::{init, products, rules};
pub use export::export;
pub use query::{delete, history, records, stats};
pub use scan::{scan, ScanSummary};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use qrs_common::catalog::find_product;
use qrs_common::storage::JsonFileStore;
use qrs_common::{Error, ScanSession};

use crate::cli::Command;
use crate::Station;

/// Run one parsed command
///
/// Returns whether every part of the command succeeded; rejected scans and
/// failed exports are reported on `out` rather than as errors.
pub async fn run(
    station: &Station,
    command: Command,
    config_path: Option<&std::path::Path>,
    out: &mut impl std::io::Write,
) -> Result<bool> {
    match command {
        Command::Init => init(station, config_path, out).await.map(|_| true),
        Command::Products(cmd) => products(station, cmd, out).await.map(|_| true),
        Command::Rules(cmd) => rules(station, cmd, out).await.map(|_| true),
        Command::Scan { target, date } => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let summary = scan(station, &target, date, stdin, out).await?;
            Ok(summary.rejected == 0)
        }
        Command::Stats { target, date, json } => {
            stats(station, &target, date, json, out).await.map(|_| true)
        }
        Command::Records {
            target,
            date,
            page,
            filter,
        } => records(station, &target, date, page, filter.as_deref(), out)
            .await
            .map(|_| true),
        Command::Delete { target, code, date } => delete(station, &target, &code, date, out).await,
        Command::History { target } => history(station, &target, out).await.map(|_| true),
        Command::Export { target, dates, all } => {
            let outcomes = export(station, &target, &dates, all, out).await?;
            Ok(outcomes.iter().all(|(_, outcome)| outcome.success))
        }
    }
}

/// Look up a scan target and load one of its days into a fresh session
pub(crate) async fn open_target(
    station: &Station,
    target_id: &str,
    date: Option<NaiveDate>,
) -> Result<ScanSession<JsonFileStore>> {
    let products = station
        .store
        .read_products()
        .await
        .context("Failed to read scan targets")?;
    let product = find_product(&products, target_id)
        .cloned()
        .ok_or_else(|| Error::NotFound(format!("scan target '{}'", target_id)))?;

    let session = station.session();
    session
        .select(product, date)
        .await
        .with_context(|| format!("Failed to open scan target {}", target_id))?;
    Ok(session)
}
