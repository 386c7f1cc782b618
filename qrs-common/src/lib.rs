//! # QRS Common Library
//!
//! Shared code for the QRS barcode scan station:
//! - Scan record, target and rule models
//! - Scan aggregator with hourly production statistics
//! - Event types and EventBus
//! - JSON file persistence and spreadsheet export
//! - Scan session (format checks, day rollover, persistence)
//! - Configuration loading

pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod export;
pub mod models;
pub mod rules;
pub mod session;
pub mod storage;
pub mod store;
pub mod time;

pub use error::{Error, Result};
pub use models::{Product, Rule, ScanRecord};
pub use session::ScanSession;
pub use store::{ScanStore, Snapshot};
