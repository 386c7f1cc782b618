//! Configuration loading and root folder resolution
//!
//! Settings come from an optional TOML file. A missing file is not an error:
//! the station starts on built-in defaults and logs a warning.

use crate::store::{PagingPolicy, StoreOptions, PAGE_CAPACITY};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the data root folder
pub const ROOT_FOLDER_ENV: &str = "QRS_ROOT_FOLDER";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Data root folder (optional; see [`resolve_root_folder`])
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_folder: Option<PathBuf>,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Records per page in record listings
    #[serde(default = "default_page_capacity")]
    pub page_capacity: usize,

    /// Reject page numbers below 1 instead of answering with an empty page
    #[serde(default = "default_strict_paging")]
    pub strict_paging: bool,

    /// Event channel buffer per subscriber
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr only if not specified)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            logging: LoggingConfig::default(),
            page_capacity: default_page_capacity(),
            strict_paging: default_strict_paging(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl TomlConfig {
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            page_capacity: self.page_capacity.max(1),
            paging: if self.strict_paging {
                PagingPolicy::Strict
            } else {
                PagingPolicy::Lenient
            },
        }
    }
}

fn default_page_capacity() -> usize {
    PAGE_CAPACITY
}

fn default_strict_paging() -> bool {
    true
}

fn default_event_capacity() -> usize {
    256
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Default configuration file path for the platform
///
/// `<config dir>/qrs/config.toml`, e.g. `~/.config/qrs/config.toml` on Linux.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("qrs").join("config.toml"))
}

/// Load configuration, falling back to defaults when the file is missing
///
/// A file that exists but does not parse is an error.
pub fn load_toml_config(path: Option<&Path>) -> Result<TomlConfig> {
    let path = match path.map(Path::to_path_buf).or_else(default_config_path) {
        Some(path) => path,
        None => {
            warn!("Could not determine config directory, using defaults");
            return Ok(TomlConfig::default());
        }
    };

    if !path.exists() {
        warn!("Config file {} not found, using defaults", path.display());
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;
    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Write configuration atomically (temp file + rename)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize config failed: {}", e)))?;
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let tmp = path.with_extension("toml.tmp");
    std::fs::write(&tmp, content)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Root folder resolution, highest priority first:
/// 1. Command-line argument
/// 2. `QRS_ROOT_FOLDER` environment variable
/// 3. TOML `root_folder`
/// 4. `~/wk/qr-scan`
pub fn resolve_root_folder(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// OS-dependent default root folder
pub fn default_root_folder() -> PathBuf {
    dirs::home_dir()
        .map(|d| d.join("wk").join("qr-scan"))
        .unwrap_or_else(|| PathBuf::from("./qr-scan"))
}
