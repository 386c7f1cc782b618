//! Event types for the QRS event system
//!
//! Provides the shared event definitions and the EventBus that carries
//! statistics snapshots and scan outcomes to observers.

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::store::Snapshot;

/// Mutation that produced a published snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatsTrigger {
    Load,
    Submit,
    Delete,
    Reset,
}

/// Why a scanned code was not recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Code already recorded today for this target
    Duplicate,
    /// Code failed the target's rule
    InvalidFormat,
    /// Active date is a past day opened for viewing
    ReadOnlyDate,
}

/// QRS event types
///
/// Events are broadcast via EventBus and serialize with a `type` tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ScanEvent {
    /// Statistics republished after a working-set mutation
    ///
    /// Emitted only once the working set and every index are consistent.
    StatsUpdated {
        snapshot: Snapshot,
        trigger: StatsTrigger,
        timestamp: DateTime<Local>,
    },

    /// Session switched to a target/date
    TargetSelected {
        target_id: String,
        date: NaiveDate,
        timestamp: DateTime<Local>,
    },

    /// Code recorded and persisted
    ScanAccepted {
        target_id: String,
        code: String,
        timestamp: DateTime<Local>,
    },

    /// Code refused; nothing was mutated
    ScanRejected {
        target_id: String,
        code: String,
        reason: RejectReason,
        timestamp: DateTime<Local>,
    },

    /// A live session crossed midnight and started a new day
    DayRolledOver {
        target_id: String,
        previous: NaiveDate,
        current: NaiveDate,
        timestamp: DateTime<Local>,
    },

    /// A load finished after a newer one was issued and was dropped
    StaleLoadDiscarded {
        target_id: String,
        date: NaiveDate,
        timestamp: DateTime<Local>,
    },

    /// Spreadsheet export attempt finished
    ExportFinished {
        target_id: String,
        date: NaiveDate,
        success: bool,
        message: String,
        timestamp: DateTime<Local>,
    },
}

impl ScanEvent {
    /// Event type name as serialized in the `type` tag
    pub fn event_type(&self) -> &'static str {
        match self {
            ScanEvent::StatsUpdated { .. } => "StatsUpdated",
            ScanEvent::TargetSelected { .. } => "TargetSelected",
            ScanEvent::ScanAccepted { .. } => "ScanAccepted",
            ScanEvent::ScanRejected { .. } => "ScanRejected",
            ScanEvent::DayRolledOver { .. } => "DayRolledOver",
            ScanEvent::StaleLoadDiscarded { .. } => "StaleLoadDiscarded",
            ScanEvent::ExportFinished { .. } => "ExportFinished",
        }
    }
}

/// Central event distribution
///
/// Thin wrapper around a tokio broadcast channel. Sending never blocks, so
/// the scan store can publish from synchronous code.
pub struct EventBus {
    tx: broadcast::Sender<ScanEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// `capacity` is the number of events buffered per subscriber before the
    /// oldest are dropped for slow receivers.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: ScanEvent,
    ) -> Result<usize, broadcast::error::SendError<ScanEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: ScanEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
