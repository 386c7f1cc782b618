//! Persistence gateway
//!
//! Whole-document storage of a day's scan records keyed by
//! `(target id, date)`, plus spreadsheet export and the folder housekeeping
//! the catalog needs. Last write wins; there is no partial update.

mod json_store;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::ScanRecord;
use crate::Result;

pub use json_store::JsonFileStore;

/// A day with stored records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateEntry {
    /// Partition name, `YYYY-MM-DD`
    pub name: String,
    /// Folder holding the day's data file, relative to the store root
    pub path: String,
}

impl DateEntry {
    pub fn date(&self) -> Option<NaiveDate> {
        crate::time::parse_date(&self.name)
    }
}

/// Result of a spreadsheet export
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportOutcome {
    pub success: bool,
    pub message: String,
    pub path: Option<PathBuf>,
}

impl ExportOutcome {
    pub fn exported(path: PathBuf) -> Self {
        Self {
            success: true,
            message: "Export succeeded".to_string(),
            path: Some(path),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            path: None,
        }
    }
}

/// Result of moving a target's data folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameOutcome {
    pub success: bool,
    pub message: String,
}

impl RenameOutcome {
    pub fn renamed() -> Self {
        Self {
            success: true,
            message: "Folder renamed".to_string(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Storage used by scan sessions
#[async_trait]
pub trait ScanRepository: Send + Sync {
    /// Records stored for a target and day; nothing stored yields an empty list
    async fn read_records(&self, target_id: &str, date: NaiveDate) -> Result<Vec<ScanRecord>>;

    /// Overwrite the day's document with `records`
    async fn write_records(
        &self,
        target_id: &str,
        date: NaiveDate,
        records: &[ScanRecord],
    ) -> Result<()>;

    /// Write a spreadsheet of `records`; failures are reported in the outcome
    async fn export_spreadsheet(
        &self,
        records: &[ScanRecord],
        target_name: &str,
        date: NaiveDate,
    ) -> ExportOutcome;

    /// Days that have stored records for a target, oldest first
    async fn list_exportable_dates(&self, target_id: &str) -> Result<Vec<DateEntry>>;

    /// Move a target's data after its identifier changed
    async fn rename_target_folder(&self, old_id: &str, new_id: &str) -> RenameOutcome;
}
