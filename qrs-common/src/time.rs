//! Timestamp utilities
//!
//! Scan timestamps are epoch milliseconds. Hour buckets, day partitions and
//! exported times are all expressed in local time.

use chrono::{DateTime, Local, NaiveDate, TimeZone, Timelike};
use std::sync::atomic::{AtomicI64, Ordering};

/// Date format used for storage partitions and command-line arguments
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Time format used in exported spreadsheets
pub const SCAN_TIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Get current local timestamp
pub fn now() -> DateTime<Local> {
    Local::now()
}

/// Convert epoch milliseconds to local time
pub fn local_datetime(timestamp_ms: i64) -> Option<DateTime<Local>> {
    Local.timestamp_millis_opt(timestamp_ms).single()
}

/// Local hour (0-23) a timestamp falls into
///
/// Out-of-range timestamps land in hour 0.
pub fn local_hour(timestamp_ms: i64) -> u32 {
    local_datetime(timestamp_ms).map(|dt| dt.hour()).unwrap_or(0)
}

/// Chart label for an hour bucket, e.g. `09:00`
pub fn hour_label(hour: u32) -> String {
    format!("{:02}:00", hour)
}

/// Format a scan timestamp as `YYYY/MM/DD HH:mm:ss`
pub fn format_scan_time(timestamp_ms: i64) -> String {
    local_datetime(timestamp_ms)
        .map(|dt| dt.format(SCAN_TIME_FORMAT).to_string())
        .unwrap_or_default()
}

/// Format a partition date as `YYYY-MM-DD`
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a `YYYY-MM-DD` partition name
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// Source of "now" for scan sessions
pub trait Clock: Send + Sync {
    /// Current local time
    fn now(&self) -> DateTime<Local>;

    /// Current epoch milliseconds
    fn now_ms(&self) -> i64 {
        self.now().timestamp_millis()
    }

    /// Current local date
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Settable clock for tests and replays
#[derive(Debug)]
pub struct FixedClock {
    millis: AtomicI64,
}

impl FixedClock {
    pub fn new(at: DateTime<Local>) -> Self {
        Self {
            millis: AtomicI64::new(at.timestamp_millis()),
        }
    }

    pub fn set(&self, at: DateTime<Local>) {
        self.millis.store(at.timestamp_millis(), Ordering::SeqCst);
    }

    pub fn advance_ms(&self, millis: i64) {
        self.millis.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        local_datetime(self.millis.load(Ordering::SeqCst)).unwrap_or_else(Local::now)
    }
}
