//! Read-side commands and deletion

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;

use super::open_target;
use crate::report;
use crate::Station;

pub async fn stats(
    station: &Station,
    target_id: &str,
    date: Option<NaiveDate>,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    let session = open_target(station, target_id, date).await?;
    let target = session.active_target().await?;
    let snapshot = session.snapshot().await;

    if json {
        serde_json::to_writer_pretty(&mut *out, &snapshot)?;
        writeln!(out)?;
    } else {
        report::write_snapshot(out, &target.product, target.date, &snapshot)?;
    }
    Ok(())
}

pub async fn records(
    station: &Station,
    target_id: &str,
    date: Option<NaiveDate>,
    page: i64,
    filter: Option<&str>,
    out: &mut impl Write,
) -> Result<()> {
    let session = open_target(station, target_id, date).await?;
    let rows = session.page(page, filter).await?;
    let info = session.page_info(filter).await;
    report::write_records_page(out, page, &rows, &info)?;
    Ok(())
}

/// Returns whether the code was found
pub async fn delete(
    station: &Station,
    target_id: &str,
    code: &str,
    date: Option<NaiveDate>,
    out: &mut impl Write,
) -> Result<bool> {
    let session = open_target(station, target_id, date).await?;
    let removed = session.delete_code(code).await?;
    if removed {
        writeln!(
            out,
            "Deleted {} ({} remaining)",
            code,
            session.snapshot().await.total_capacity
        )?;
    } else {
        writeln!(out, "Code {} not found", code)?;
    }
    Ok(removed)
}

pub async fn history(station: &Station, target_id: &str, out: &mut impl Write) -> Result<()> {
    let session = open_target(station, target_id, None).await?;
    let dates = session.history().await?;
    report::write_history(out, &dates)?;
    Ok(())
}
