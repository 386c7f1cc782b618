//! Spreadsheet export

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;
use qrs_common::storage::{ExportOutcome, ScanRepository};
use qrs_common::time::format_date;
use tracing::warn;

use super::open_target;
use crate::Station;

/// Export the given days, every stored day with `all`, or today
pub async fn export(
    station: &Station,
    target_id: &str,
    dates: &[NaiveDate],
    all: bool,
    out: &mut impl Write,
) -> Result<Vec<(NaiveDate, ExportOutcome)>> {
    let session = open_target(station, target_id, None).await?;

    let dates: Vec<NaiveDate> = if all {
        station
            .store
            .list_exportable_dates(target_id)
            .await?
            .iter()
            .filter_map(|entry| entry.date())
            .collect()
    } else if dates.is_empty() {
        vec![station.clock.today()]
    } else {
        dates.to_vec()
    };

    if dates.is_empty() {
        writeln!(out, "Nothing to export")?;
        return Ok(Vec::new());
    }

    let outcomes = session.export_dates(&dates).await?;
    for (date, outcome) in &outcomes {
        match (&outcome.path, outcome.success) {
            (Some(path), true) => writeln!(out, "{}  {}", format_date(*date), path.display())?,
            _ => {
                warn!("Export of {} for {} failed: {}", format_date(*date), target_id, outcome.message);
                writeln!(out, "{}  failed: {}", format_date(*date), outcome.message)?;
            }
        }
    }
    Ok(outcomes)
}
