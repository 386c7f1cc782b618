//! Common error types for QRS

use chrono::NaiveDate;
use thiserror::Error;

/// Common result type for QRS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across QRS crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON document could not be parsed or written
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Code already recorded for the active target and day
    #[error("Duplicate code: {0}")]
    DuplicateCode(String),

    /// Scanned code does not match the target's rule
    #[error("Invalid code format: {code} does not match {rule}")]
    InvalidFormat {
        /// Code as scanned
        code: String,
        /// Rule pattern the code was checked against
        rule: String,
    },

    /// Page numbers start at 1
    #[error("Invalid page: {0}")]
    InvalidPage(i64),

    /// Submissions are only accepted for the current day
    #[error("Date {0} is read-only")]
    ReadOnlyDate(NaiveDate),

    /// Operation needs a selected scan target
    #[error("No scan target selected")]
    NoActiveTarget,

    /// The selected day's records have not been loaded yet
    #[error("Records of {target_id} for {date} are not loaded")]
    NotLoaded { target_id: String, date: NaiveDate },

    /// Spreadsheet export failure
    #[error("Export error: {0}")]
    Export(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
