//! Plain-text rendering of station data

use std::io::{self, Write};

use chrono::NaiveDate;
use qrs_common::store::PageInfo;
use qrs_common::storage::DateEntry;
use qrs_common::time::{format_date, format_scan_time};
use qrs_common::{Product, Rule, ScanRecord, Snapshot};

/// Widest bar drawn in the hourly chart
const CHART_WIDTH: u64 = 40;

pub fn write_snapshot(
    out: &mut impl Write,
    product: &Product,
    date: NaiveDate,
    snapshot: &Snapshot,
) -> io::Result<()> {
    writeln!(
        out,
        "{} ({}) {}",
        product.product_name,
        product.product_value,
        format_date(date)
    )?;
    if snapshot.is_empty() {
        writeln!(out, "  No scans recorded")?;
        return Ok(());
    }

    writeln!(out, "  Total capacity  {}", snapshot.total_capacity)?;
    writeln!(
        out,
        "  Last hour       {} (previous {}, {:+.1}%)",
        snapshot.last_hour_capacity,
        snapshot.previous_hour_capacity,
        snapshot.growth_percent()
    )?;
    writeln!(out, "  Speed           {:.1} per hour", snapshot.speed)?;
    writeln!(out)?;

    let peak = snapshot
        .chart_series
        .iter()
        .map(|p| p.count)
        .max()
        .unwrap_or(0)
        .max(1);
    for point in &snapshot.chart_series {
        let width = (point.count * CHART_WIDTH).div_ceil(peak);
        writeln!(
            out,
            "  {}  {:<width$}  {}",
            point.label,
            "#".repeat(width as usize),
            point.count,
            width = CHART_WIDTH as usize
        )?;
    }
    Ok(())
}

pub fn write_records_page(
    out: &mut impl Write,
    page: i64,
    records: &[ScanRecord],
    info: &PageInfo,
) -> io::Result<()> {
    if info.total_records == 0 {
        writeln!(out, "No records")?;
        return Ok(());
    }

    let first = (page.max(1) as usize - 1) * info.page_capacity;
    for (offset, record) in records.iter().enumerate() {
        writeln!(
            out,
            "{:>5}  {}  {}",
            first + offset + 1,
            format_scan_time(record.timestamp),
            record.code
        )?;
    }
    writeln!(
        out,
        "Page {} of {} ({} records)",
        page, info.total_pages, info.total_records
    )
}

pub fn write_history(out: &mut impl Write, dates: &[DateEntry]) -> io::Result<()> {
    for entry in dates {
        if entry.path.is_empty() {
            writeln!(out, "{}  (no records yet)", entry.name)?;
        } else {
            writeln!(out, "{}  {}", entry.name, entry.path)?;
        }
    }
    Ok(())
}

pub fn write_products(out: &mut impl Write, products: &[Product]) -> io::Result<()> {
    if products.is_empty() {
        writeln!(out, "No scan targets")?;
        return Ok(());
    }
    for product in products {
        match &product.scan_rule {
            Some(rule) => writeln!(
                out,
                "{:<24} {:<24} {}",
                product.product_value, product.product_name, rule
            )?,
            None => writeln!(out, "{:<24} {}", product.product_value, product.product_name)?,
        }
    }
    Ok(())
}

pub fn write_rules(out: &mut impl Write, rules: &[Rule]) -> io::Result<()> {
    if rules.is_empty() {
        writeln!(out, "No rules")?;
        return Ok(());
    }
    for rule in rules {
        let marker = if rule.is_default { "*" } else { " " };
        writeln!(out, "{} {:<36} {}", marker, rule.rule_name, rule.rule_value)?;
    }
    Ok(())
}
