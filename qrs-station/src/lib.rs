//! qrs-station library - operator command line for the scan station
//!
//! Command handlers write human-readable output to any `Write` sink so they
//! can be driven from tests as well as from `main`.

use std::sync::Arc;

use qrs_common::config::TomlConfig;
use qrs_common::events::EventBus;
use qrs_common::storage::JsonFileStore;
use qrs_common::time::{Clock, SystemClock};
use qrs_common::ScanSession;

pub mod cli;
pub mod commands;
pub mod report;

/// Everything a command needs
#[derive(Clone)]
pub struct Station {
    pub store: Arc<JsonFileStore>,
    pub config: TomlConfig,
    pub clock: Arc<dyn Clock>,
}

impl Station {
    pub fn new(store: JsonFileStore, config: TomlConfig) -> Self {
        Self::with_clock(store, config, Arc::new(SystemClock))
    }

    pub fn with_clock(store: JsonFileStore, config: TomlConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Arc::new(store),
            config,
            clock,
        }
    }

    /// Fresh session over the station's store
    pub fn session(&self) -> ScanSession<JsonFileStore> {
        ScanSession::new(
            Arc::clone(&self.store),
            self.config.store_options(),
            Arc::new(EventBus::new(self.config.event_capacity)),
            Arc::clone(&self.clock),
        )
    }
}
