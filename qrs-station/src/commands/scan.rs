//! Interactive scanning from a line-oriented reader

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;
use qrs_common::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info};

use super::open_target;
use crate::Station;

/// Counts for one scanning run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub accepted: usize,
    pub rejected: usize,
}

/// Submit every non-blank line of `input` as a scanned code
///
/// Rejected codes are reported and scanning continues; storage failures
/// abort the run.
pub async fn scan<I>(
    station: &Station,
    target_id: &str,
    date: Option<NaiveDate>,
    input: I,
    out: &mut impl Write,
) -> Result<ScanSummary>
where
    I: AsyncBufRead + Unpin,
{
    let session = open_target(station, target_id, date).await?;
    let target = session.active_target().await?;
    writeln!(
        out,
        "Scanning {} for {} ({} recorded)",
        target.product.product_name,
        qrs_common::time::format_date(target.date),
        session.snapshot().await.total_capacity
    )?;
    out.flush()?;

    let mut summary = ScanSummary::default();
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let code = line.trim();
        if code.is_empty() {
            continue;
        }

        match session.submit_code(code).await {
            Ok(record) => {
                summary.accepted += 1;
                let snapshot = session.snapshot().await;
                debug!("Accepted {} at {}", record.code, record.timestamp);
                writeln!(
                    out,
                    "OK  {}  total {}  this hour {}",
                    record.code, snapshot.total_capacity, snapshot.last_hour_capacity
                )?;
            }
            Err(
                e @ (Error::DuplicateCode(_)
                | Error::InvalidFormat { .. }
                | Error::ReadOnlyDate(_)),
            ) => {
                summary.rejected += 1;
                writeln!(out, "ERR {}  {}", code, e)?;
            }
            Err(e) => return Err(e.into()),
        }
        out.flush()?;
    }

    info!(
        "Scan run for {} finished: {} accepted, {} rejected",
        target_id, summary.accepted, summary.rejected
    );
    writeln!(
        out,
        "{} accepted, {} rejected",
        summary.accepted, summary.rejected
    )?;
    Ok(summary)
}
