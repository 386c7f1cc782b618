//! JSON file storage under a root folder
//!
//! Layout:
//! ```text
//! <root>/product/products.json
//! <root>/product/rules.json
//! <root>/product/<target id>/<YYYY-MM-DD>/data.json
//! <root>/downloads/<target name>/<YYYY-MM-DD>.xlsx
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{DateEntry, ExportOutcome, RenameOutcome, ScanRepository};
use crate::catalog::default_rules;
use crate::models::{Product, Rule, ScanRecord};
use crate::time::format_date;
use crate::{Error, Result};

const PRODUCT_DIR: &str = "product";
const DOWNLOADS_DIR: &str = "downloads";
const PRODUCTS_FILE: &str = "products.json";
const RULES_FILE: &str = "rules.json";
const DATA_FILE: &str = "data.json";

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn products_path(&self) -> PathBuf {
        self.root.join(PRODUCT_DIR).join(PRODUCTS_FILE)
    }

    pub fn rules_path(&self) -> PathBuf {
        self.root.join(PRODUCT_DIR).join(RULES_FILE)
    }

    pub fn target_dir(&self, target_id: &str) -> PathBuf {
        self.root.join(PRODUCT_DIR).join(target_id)
    }

    pub fn data_path(&self, target_id: &str, date: NaiveDate) -> PathBuf {
        self.target_dir(target_id)
            .join(format_date(date))
            .join(DATA_FILE)
    }

    pub fn export_path(&self, target_name: &str, date: NaiveDate) -> PathBuf {
        self.root
            .join(DOWNLOADS_DIR)
            .join(folder_name(target_name))
            .join(format!("{}.xlsx", format_date(date)))
    }

    /// Create the catalog files with defaults where missing
    ///
    /// Existing files are never overwritten. Returns the files created.
    pub async fn seed_defaults(&self) -> Result<Vec<PathBuf>> {
        let mut created = Vec::new();
        let products = self.products_path();
        if !tokio::fs::try_exists(&products).await? {
            write_json(&products, &Vec::<Product>::new()).await?;
            created.push(products);
        }
        let rules = self.rules_path();
        if !tokio::fs::try_exists(&rules).await? {
            write_json(&rules, &default_rules()).await?;
            created.push(rules);
        }
        for path in &created {
            info!("Seeded {}", path.display());
        }
        Ok(created)
    }

    pub async fn read_products(&self) -> Result<Vec<Product>> {
        Ok(read_json(&self.products_path()).await?.unwrap_or_default())
    }

    pub async fn write_products(&self, products: &[Product]) -> Result<()> {
        write_json(&self.products_path(), &products).await
    }

    pub async fn read_rules(&self) -> Result<Vec<Rule>> {
        Ok(read_json(&self.rules_path()).await?.unwrap_or_default())
    }

    pub async fn write_rules(&self, rules: &[Rule]) -> Result<()> {
        write_json(&self.rules_path(), &rules).await
    }
}

#[async_trait]
impl ScanRepository for JsonFileStore {
    async fn read_records(&self, target_id: &str, date: NaiveDate) -> Result<Vec<ScanRecord>> {
        let path = self.data_path(target_id, date);
        let records: Vec<ScanRecord> = read_json(&path).await?.unwrap_or_default();
        debug!(target_id, %date, records = records.len(), "Read records");
        Ok(records)
    }

    async fn write_records(
        &self,
        target_id: &str,
        date: NaiveDate,
        records: &[ScanRecord],
    ) -> Result<()> {
        let path = self.data_path(target_id, date);
        write_json(&path, &records).await?;
        debug!(target_id, %date, records = records.len(), "Wrote records");
        Ok(())
    }

    async fn export_spreadsheet(
        &self,
        records: &[ScanRecord],
        target_name: &str,
        date: NaiveDate,
    ) -> ExportOutcome {
        let path = self.export_path(target_name, date);
        let rows = records.to_vec();
        let target = path.clone();
        let written =
            tokio::task::spawn_blocking(move || crate::export::write_workbook(&target, &rows))
                .await
                .map_err(|e| Error::Internal(format!("export task failed: {}", e)))
                .and_then(|r| r);
        match written {
            Ok(()) => {
                info!("Exported {} records to {}", records.len(), path.display());
                ExportOutcome::exported(path)
            }
            Err(e) => {
                warn!("Export to {} failed: {}", path.display(), e);
                ExportOutcome::failed(format!("Error exporting to spreadsheet: {}", e))
            }
        }
    }

    async fn list_exportable_dates(&self, target_id: &str) -> Result<Vec<DateEntry>> {
        let dir = self.target_dir(target_id);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut dates = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            if !tokio::fs::try_exists(entry.path().join(DATA_FILE)).await? {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let path = entry
                .path()
                .strip_prefix(&self.root)
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_else(|_| entry.path().to_string_lossy().into_owned());
            dates.push(DateEntry { name, path });
        }
        dates.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(dates)
    }

    async fn rename_target_folder(&self, old_id: &str, new_id: &str) -> RenameOutcome {
        let from = self.target_dir(old_id);
        let to = self.target_dir(new_id);

        match tokio::fs::try_exists(&from).await {
            Ok(true) => {}
            Ok(false) => return RenameOutcome::failed("Old folder does not exist"),
            Err(e) => return RenameOutcome::failed(format!("Folder rename failed: {}", e)),
        }
        match tokio::fs::try_exists(&to).await {
            Ok(false) => {}
            Ok(true) => return RenameOutcome::failed("New folder already exists"),
            Err(e) => return RenameOutcome::failed(format!("Folder rename failed: {}", e)),
        }

        match tokio::fs::rename(&from, &to).await {
            Ok(()) => {
                info!("Renamed {} to {}", from.display(), to.display());
                RenameOutcome::renamed()
            }
            Err(e) => {
                warn!("Renaming {} failed: {}", from.display(), e);
                RenameOutcome::failed(format!("Folder rename failed: {}", e))
            }
        }
    }
}

/// `Ok(None)` when the file does not exist
/// Display name as a single path component
///
/// Separators and characters Windows refuses become `_`; names made only of
/// dots or nothing at all become `_`.
fn folder_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if cleaned.chars().all(|c| c == '.') {
        "_".to_string()
    } else {
        cleaned
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    if content.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(&content)?))
}

/// Write via a sibling temp file and rename, creating parent folders
async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }
    let content = serde_json::to_vec(value)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, content).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
