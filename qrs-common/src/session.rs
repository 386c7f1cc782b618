//! Scan session
//!
//! Wraps the [`ScanStore`] with everything the store deliberately leaves to
//! its caller: the active target and day, the code format check, day
//! rollover, persistence through a [`ScanRepository`], and exports.
//!
//! Loads are tagged with store load tokens, so when the target or day
//! changes while a read is still in flight the older result is dropped
//! instead of overwriting the newer working set.

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::{broadcast, RwLock};
use tracing::{info, warn};

use crate::events::{EventBus, RejectReason, ScanEvent};
use crate::models::{Product, ScanRecord};
use crate::rules::CodeRule;
use crate::storage::{DateEntry, ExportOutcome, ScanRepository};
use crate::store::{LoadToken, PageInfo, ScanStore, Snapshot, StoreOptions};
use crate::time::{format_date, Clock};
use crate::{Error, Result};

/// Target and day the session records against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveTarget {
    pub product: Product,
    pub date: NaiveDate,
    /// Live sessions follow the calendar and roll over at midnight;
    /// sessions opened on a past day are read-only
    pub follow_today: bool,
}

struct Active {
    target: ActiveTarget,
    rule: Option<CodeRule>,
    /// Set once the day's records are in the store; scans are refused until then
    loaded: bool,
}

impl Active {
    fn ensure_loaded(&self) -> Result<()> {
        if self.loaded {
            Ok(())
        } else {
            Err(Error::NotLoaded {
                target_id: self.target.product.product_value.clone(),
                date: self.target.date,
            })
        }
    }
}

pub struct ScanSession<R: ScanRepository> {
    repo: Arc<R>,
    store: RwLock<ScanStore>,
    active: RwLock<Option<Active>>,
    events: Arc<EventBus>,
    clock: Arc<dyn Clock>,
}

impl<R: ScanRepository> ScanSession<R> {
    pub fn new(
        repo: Arc<R>,
        options: StoreOptions,
        events: Arc<EventBus>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repo,
            store: RwLock::new(ScanStore::new(options, Arc::clone(&events))),
            active: RwLock::new(None),
            events,
            clock,
        }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repo
    }

    /// Switch to a target and day, then load its records
    ///
    /// `None` means today. Returns whether the loaded records were applied.
    /// If the load fails the session stays on the new target but refuses
    /// scans until a later [`reload`](Self::reload) succeeds.
    pub async fn select(&self, product: Product, date: Option<NaiveDate>) -> Result<bool> {
        let rule = product
            .scan_rule
            .as_deref()
            .map(|pattern| CodeRule::compile(product.product_name.clone(), pattern))
            .transpose()?;
        let today = self.clock.today();
        let date = date.unwrap_or(today);
        let target = ActiveTarget {
            product,
            date,
            follow_today: date == today,
        };
        let target_id = target.product.product_value.clone();
        info!(
            "Selected scan target {} for {} (rule: {})",
            target_id,
            format_date(date),
            rule.as_ref().map(CodeRule::name).unwrap_or("none")
        );

        let token = {
            let mut active = self.active.write().await;
            let mut store = self.store.write().await;
            store.reset();
            *active = Some(Active {
                target: target.clone(),
                rule,
                loaded: false,
            });
            store.issue_load_token()
        };

        self.events.emit_lossy(ScanEvent::TargetSelected {
            target_id,
            date,
            timestamp: self.clock.now(),
        });
        self.load(target, token).await
    }

    /// Open another day of the active target
    pub async fn open_date(&self, date: NaiveDate) -> Result<bool> {
        let product = self.active_target().await?.product;
        self.select(product, Some(date)).await
    }

    /// Reload the active target and day from the repository
    ///
    /// Returns `false` if a newer load or a reset superseded this one.
    pub async fn reload(&self) -> Result<bool> {
        let (target, token) = {
            let active = self.active.read().await;
            let target = active
                .as_ref()
                .map(|a| a.target.clone())
                .ok_or(Error::NoActiveTarget)?;
            let token = self.store.write().await.issue_load_token();
            (target, token)
        };
        self.load(target, token).await
    }

    /// Read `target`'s records and apply them if `token` is still current
    async fn load(&self, target: ActiveTarget, token: LoadToken) -> Result<bool> {
        let target_id = target.product.product_value;
        let records = self.repo.read_records(&target_id, target.date).await?;
        let count = records.len();

        let applied = {
            let mut active = self.active.write().await;
            let applied = self.store.write().await.load_full_if_current(token, records);
            // A current token means no select or reset happened since it was issued
            if applied {
                if let Some(active) = active.as_mut() {
                    active.loaded = true;
                }
            }
            applied
        };

        if applied {
            info!("Loaded {} records for {} on {}", count, target_id, format_date(target.date));
        } else {
            warn!("Discarded stale load for {} on {}", target_id, format_date(target.date));
            self.events.emit_lossy(ScanEvent::StaleLoadDiscarded {
                target_id,
                date: target.date,
                timestamp: self.clock.now(),
            });
        }
        Ok(applied)
    }

    /// Validate, record and persist one scanned code
    ///
    /// Checks run in order: format rule, day rollover, read-only day,
    /// duplicate code. Any rejection or failed save leaves the working set
    /// untouched.
    pub async fn submit_code(&self, code: &str) -> Result<ScanRecord> {
        let code = code.trim();
        if code.is_empty() {
            return Err(Error::InvalidInput("empty code".to_string()));
        }

        // Held until the write completes so saves land in submission order
        let mut guard = self.active.write().await;
        let active = guard.as_mut().ok_or(Error::NoActiveTarget)?;
        active.ensure_loaded()?;
        let target_id = active.target.product.product_value.clone();

        if let Some(rule) = &active.rule {
            if let Err(e) = rule.check(code) {
                self.reject(&target_id, code, RejectReason::InvalidFormat);
                return Err(e);
            }
        }

        let mut store = self.store.write().await;

        let today = self.clock.today();
        if active.target.follow_today && today > active.target.date {
            // Nothing changes until the new day has been read
            let records = self.repo.read_records(&target_id, today).await?;
            let previous = active.target.date;
            active.target.date = today;
            store.reset();
            store.load_full(records);
            info!(
                "Day rolled over for {}: {} -> {}",
                target_id,
                format_date(previous),
                format_date(today)
            );
            self.events.emit_lossy(ScanEvent::DayRolledOver {
                target_id: target_id.clone(),
                previous,
                current: today,
                timestamp: self.clock.now(),
            });
        }

        if active.target.date != today {
            self.reject(&target_id, code, RejectReason::ReadOnlyDate);
            return Err(Error::ReadOnlyDate(active.target.date));
        }

        let record = ScanRecord::new(
            active.target.product.product_name.clone(),
            target_id.clone(),
            code,
            self.clock.now_ms(),
        );
        if let Err(e) = store.submit(record.clone()) {
            self.reject(&target_id, code, RejectReason::Duplicate);
            return Err(e);
        }

        let saved = self
            .repo
            .write_records(&target_id, active.target.date, store.records())
            .await;
        if let Err(e) = saved {
            store.delete_by_code(code);
            warn!("Save of {} for {} failed, scan rolled back: {}", code, target_id, e);
            return Err(e);
        }
        drop(store);

        self.events.emit_lossy(ScanEvent::ScanAccepted {
            target_id,
            code: code.to_string(),
            timestamp: self.clock.now(),
        });
        Ok(record)
    }

    /// Remove a recorded code and persist the remaining records
    ///
    /// Returns whether the code was present. A failed save restores the
    /// record.
    pub async fn delete_code(&self, code: &str) -> Result<bool> {
        let guard = self.active.write().await;
        let active = guard.as_ref().ok_or(Error::NoActiveTarget)?;
        active.ensure_loaded()?;
        let target_id = &active.target.product.product_value;

        let mut store = self.store.write().await;
        let removed = store.records().iter().find(|r| r.code == code).cloned();
        if !store.delete_by_code(code) {
            return Ok(false);
        }

        let saved = self
            .repo
            .write_records(target_id, active.target.date, store.records())
            .await;
        if let Err(e) = saved {
            if let Some(record) = removed {
                store.submit(record)?;
            }
            warn!("Save after deleting {} from {} failed, record restored: {}", code, target_id, e);
            return Err(e);
        }
        info!("Deleted {} from {}", code, target_id);
        Ok(true)
    }

    pub async fn is_exists(&self, code: &str) -> bool {
        self.store.read().await.is_exists(code)
    }

    pub async fn page(&self, page: i64, filter: Option<&str>) -> Result<Vec<ScanRecord>> {
        self.store.read().await.get_page(page, filter)
    }

    pub async fn page_info(&self, filter: Option<&str>) -> PageInfo {
        self.store.read().await.page_info(filter)
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.store.read().await.snapshot().clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ScanEvent> {
        self.events.subscribe()
    }

    pub async fn active_target(&self) -> Result<ActiveTarget> {
        self.active
            .read()
            .await
            .as_ref()
            .map(|a| a.target.clone())
            .ok_or(Error::NoActiveTarget)
    }

    /// Stored days of the active target, plus today if nothing is stored yet
    pub async fn history(&self) -> Result<Vec<DateEntry>> {
        let target = self.active_target().await?;
        let mut dates: Vec<DateEntry> = self
            .repo
            .list_exportable_dates(&target.product.product_value)
            .await?
            .into_iter()
            .filter(|entry| entry.date().is_some())
            .collect();

        let today = self.clock.today();
        if !dates.iter().any(|entry| entry.date() == Some(today)) {
            dates.push(DateEntry {
                name: format_date(today),
                path: String::new(),
            });
        }
        Ok(dates)
    }

    /// Export one stored day of the active target
    pub async fn export_date(&self, date: NaiveDate) -> Result<ExportOutcome> {
        let target = self.active_target().await?;
        let target_id = target.product.product_value;
        let records = self.repo.read_records(&target_id, date).await?;

        let outcome = if records.is_empty() {
            ExportOutcome::failed(format!("No records to export for {}", format_date(date)))
        } else {
            self.repo
                .export_spreadsheet(&records, &target.product.product_name, date)
                .await
        };

        self.events.emit_lossy(ScanEvent::ExportFinished {
            target_id,
            date,
            success: outcome.success,
            message: outcome.message.clone(),
            timestamp: self.clock.now(),
        });
        Ok(outcome)
    }

    /// Export several days one after another
    pub async fn export_dates(&self, dates: &[NaiveDate]) -> Result<Vec<(NaiveDate, ExportOutcome)>> {
        let mut outcomes = Vec::with_capacity(dates.len());
        for date in dates {
            outcomes.push((*date, self.export_date(*date).await?));
        }
        Ok(outcomes)
    }

    fn reject(&self, target_id: &str, code: &str, reason: RejectReason) {
        warn!("Rejected code {} for {}: {:?}", code, target_id, reason);
        self.events.emit_lossy(ScanEvent::ScanRejected {
            target_id: target_id.to_string(),
            code: code.to_string(),
            reason,
            timestamp: self.clock.now(),
        });
    }
}
