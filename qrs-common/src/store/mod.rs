//! Scan aggregator
//!
//! Holds the working set of scan records for the active target and day,
//! keeps the hour-bucket index, code index and recency view consistent with
//! it, and publishes a fresh [`Snapshot`] after every mutation.
//!
//! All mutations are synchronous. Observers are notified through the
//! [`EventBus`] only after the working set and every index have been
//! updated, so a received snapshot always matches the working set.
//!
//! One store is created per station session and reused across target and
//! date switches via [`ScanStore::load_full`] and [`ScanStore::reset`].

pub mod pagination;
mod stats;

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::debug;

use crate::events::{EventBus, ScanEvent, StatsTrigger};
use crate::models::ScanRecord;
use crate::time::local_hour;
use crate::{Error, Result};

pub use pagination::{PageInfo, PagingPolicy, PAGE_CAPACITY};
pub use stats::{ChartPoint, HourIndex, Snapshot};

/// Ticket for an asynchronous full load
///
/// Only the most recently issued ticket may apply its records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadToken(u64);

/// Store tuning
#[derive(Debug, Clone, Copy)]
pub struct StoreOptions {
    pub page_capacity: usize,
    pub paging: PagingPolicy,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            page_capacity: PAGE_CAPACITY,
            paging: PagingPolicy::Strict,
        }
    }
}

pub struct ScanStore {
    records: Vec<ScanRecord>,
    codes: HashSet<String>,
    hours: HourIndex,
    /// Working set ordered newest first
    recent: Vec<ScanRecord>,
    snapshot: Snapshot,
    options: StoreOptions,
    latest_load: u64,
    events: Arc<EventBus>,
}

impl ScanStore {
    pub fn new(options: StoreOptions, events: Arc<EventBus>) -> Self {
        Self {
            records: Vec::new(),
            codes: HashSet::new(),
            hours: HourIndex::new(),
            recent: Vec::new(),
            snapshot: Snapshot::default(),
            options,
            latest_load: 0,
            events,
        }
    }

    /// Replace the working set wholesale and rebuild every index
    pub fn load_full(&mut self, records: Vec<ScanRecord>) {
        self.codes = records.iter().map(|r| r.code.clone()).collect();
        self.hours = HourIndex::from_records(&records);
        self.recent = recency_view(&records);
        self.records = records;
        debug!(records = self.records.len(), buckets = self.hours.len(), "Working set loaded");
        self.publish(StatsTrigger::Load);
    }

    /// Issue a ticket for a load that is about to start
    pub fn issue_load_token(&mut self) -> LoadToken {
        self.latest_load += 1;
        LoadToken(self.latest_load)
    }

    pub fn is_current(&self, token: LoadToken) -> bool {
        token.0 == self.latest_load
    }

    /// Apply a finished load unless a newer one was issued meanwhile
    ///
    /// Returns `false` (and leaves the store untouched) for stale tokens.
    pub fn load_full_if_current(&mut self, token: LoadToken, records: Vec<ScanRecord>) -> bool {
        if !self.is_current(token) {
            debug!(token = token.0, latest = self.latest_load, "Discarding stale load");
            return false;
        }
        self.load_full(records);
        true
    }

    /// Record one scan
    ///
    /// Fails with [`Error::DuplicateCode`] without touching state when the
    /// code is already in the working set.
    pub fn submit(&mut self, record: ScanRecord) -> Result<()> {
        if self.codes.contains(&record.code) {
            return Err(Error::DuplicateCode(record.code));
        }
        let hour = local_hour(record.timestamp);
        self.hours.increment(hour);
        self.codes.insert(record.code.clone());
        let pos = self
            .recent
            .partition_point(|r| r.timestamp > record.timestamp);
        self.recent.insert(pos, record.clone());
        self.records.push(record);
        debug!(hour, total = self.records.len(), "Scan submitted");
        self.publish(StatsTrigger::Submit);
        Ok(())
    }

    pub fn is_exists(&self, code: &str) -> bool {
        self.codes.contains(code)
    }

    /// Remove the record with `code`, if any
    ///
    /// The hour index is rebuilt from the remaining records rather than
    /// decremented. Returns whether a record was removed; a missing code is
    /// a no-op that still republishes.
    pub fn delete_by_code(&mut self, code: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.code != code);
        let removed = self.records.len() != before;
        if removed {
            self.codes.remove(code);
            self.recent.retain(|r| r.code != code);
            self.hours = HourIndex::from_records(&self.records);
        }
        debug!(code, removed, total = self.records.len(), "Delete by code");
        self.publish(StatsTrigger::Delete);
        removed
    }

    /// One page of records, newest first
    ///
    /// `filter` keeps codes containing it, ignoring case, and is evaluated
    /// against the live working set before paging.
    pub fn get_page(&self, page: i64, filter: Option<&str>) -> Result<Vec<ScanRecord>> {
        let matching = self.matching(filter);
        let bounds = pagination::page_bounds(
            matching.len(),
            self.options.page_capacity,
            page,
            self.options.paging,
        )?;
        Ok(match bounds {
            Some(range) => matching[range].iter().map(|r| (*r).clone()).collect(),
            None => Vec::new(),
        })
    }

    pub fn page_info(&self, filter: Option<&str>) -> PageInfo {
        PageInfo::new(self.matching(filter).len(), self.options.page_capacity)
    }

    /// Clear the working set, indexes and views
    ///
    /// Also invalidates any load still in flight.
    pub fn reset(&mut self) {
        self.records.clear();
        self.codes.clear();
        self.hours.clear();
        self.recent.clear();
        self.latest_load += 1;
        debug!("Working set reset");
        self.publish(StatsTrigger::Reset);
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ScanEvent> {
        self.events.subscribe()
    }

    /// Working set in submission order
    pub fn records(&self) -> &[ScanRecord] {
        &self.records
    }

    pub fn hour_index(&self) -> &HourIndex {
        &self.hours
    }

    pub fn options(&self) -> StoreOptions {
        self.options
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn matching(&self, filter: Option<&str>) -> Vec<&ScanRecord> {
        match filter.map(str::trim).filter(|f| !f.is_empty()) {
            Some(needle) => {
                let needle = needle.to_lowercase();
                self.recent
                    .iter()
                    .filter(|r| r.code.to_lowercase().contains(&needle))
                    .collect()
            }
            None => self.recent.iter().collect(),
        }
    }

    fn publish(&mut self, trigger: StatsTrigger) {
        self.snapshot = self.hours.snapshot(self.records.len() as u64);
        self.events.emit_lossy(ScanEvent::StatsUpdated {
            snapshot: self.snapshot.clone(),
            trigger,
            timestamp: crate::time::now(),
        });
    }
}

/// Newest first; among equal timestamps the later-submitted record leads
fn recency_view(records: &[ScanRecord]) -> Vec<ScanRecord> {
    let mut view: Vec<ScanRecord> = records.iter().rev().cloned().collect();
    view.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    view
}
