//! File-backed alert history.
//!
//! History is an append-only list of [`AlertRecord`]s kept in memory and
//! mirrored to a single JSON file. Every append rewrites the whole file while
//! holding the write lock, so concurrent ingestions are serialized and the
//! file always reflects every record appended before it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use super::types::AlertRecord;
use crate::error::StoreError;

/// Number of records included in `statistics().recent` by default.
pub const DEFAULT_RECENT_WINDOW: usize = 10;

/// Tuning for the history store.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Records included in the statistics `recent` list
    pub recent_window: usize,
    /// Extra persist attempts after the first one fails
    pub persist_retries: u32,
    /// Delay before the first retry; doubles on each further retry
    pub persist_backoff: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            recent_window: DEFAULT_RECENT_WINDOW,
            persist_retries: 2,
            persist_backoff: Duration::from_millis(50),
        }
    }
}

/// Aggregate view over the history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertStatistics {
    /// Number of records
    pub total: usize,
    /// Count per severity
    pub by_severity: BTreeMap<String, usize>,
    /// Count per alert name
    pub by_name: BTreeMap<String, usize>,
    /// Most recent records, oldest first
    pub recent: Vec<AlertRecord>,
}

impl AlertStatistics {
    /// Compute statistics over a slice of records.
    #[must_use]
    pub fn from_records(records: &[AlertRecord], recent_window: usize) -> Self {
        let mut by_severity = BTreeMap::new();
        let mut by_name = BTreeMap::new();

        for record in records {
            *by_severity.entry(record.severity.clone()).or_insert(0) += 1;
            *by_name.entry(record.name.clone()).or_insert(0) += 1;
        }

        Self {
            total: records.len(),
            by_severity,
            by_name,
            recent: tail(records, recent_window).to_vec(),
        }
    }
}

fn tail(records: &[AlertRecord], limit: usize) -> &[AlertRecord] {
    &records[records.len().saturating_sub(limit)..]
}

/// Append-only alert history backed by a JSON file.
pub struct HistoryStore {
    path: PathBuf,
    records: RwLock<Vec<AlertRecord>>,
    options: StoreOptions,
}

impl HistoryStore {
    /// Open the store, loading any existing history.
    ///
    /// Never fails: a missing file gives an empty history, and an unreadable
    /// or corrupt file is logged and also gives an empty history. A corrupt
    /// file is moved aside first so the next persist does not overwrite it.
    pub fn load(path: impl Into<PathBuf>, options: StoreOptions) -> Self {
        let path = path.into();

        let records = match load_records(&path) {
            Ok(records) => {
                info!(
                    path = %path.display(),
                    count = records.len(),
                    "Loaded alert history"
                );
                records
            }
            Err(e @ StoreError::Corrupt { .. }) => {
                warn!("Could not load alert history: {e}");
                quarantine(&path);
                Vec::new()
            }
            Err(e) => {
                warn!("Could not load alert history: {e}");
                Vec::new()
            }
        };

        Self {
            path,
            records: RwLock::new(records),
            options,
        }
    }

    /// Append a record and persist the full history.
    ///
    /// The record is kept in memory even when persisting fails; the error
    /// only reports that the file is behind.
    pub async fn append(&self, record: AlertRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        records.push(record);
        self.persist_records(&records).await
    }

    /// Rewrite the backing file from the in-memory history.
    pub async fn persist(&self) -> Result<(), StoreError> {
        // Write lock keeps file writes ordered with appends.
        let records = self.records.write().await;
        self.persist_records(&records).await
    }

    async fn persist_records(&self, records: &[AlertRecord]) -> Result<(), StoreError> {
        let mut attempt = 0;
        loop {
            match write_records(&self.path, records) {
                Ok(()) => {
                    debug!(path = %self.path.display(), count = records.len(), "Persisted alert history");
                    return Ok(());
                }
                Err(e) if attempt < self.options.persist_retries => {
                    let delay = self.options.persist_backoff * 2u32.saturating_pow(attempt);
                    warn!(
                        attempt = attempt + 1,
                        retry_in_ms = delay.as_millis() as u64,
                        "Failed to save alert history, retrying: {e}"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!("Error saving alert history: {e}");
                    return Err(e);
                }
            }
        }
    }

    /// Aggregate statistics.
    pub async fn statistics(&self) -> AlertStatistics {
        let records = self.records.read().await;
        AlertStatistics::from_records(&records, self.options.recent_window)
    }

    /// Records whose severity matches, ignoring case, oldest first.
    pub async fn filter_by_severity(&self, severity: &str) -> Vec<AlertRecord> {
        let wanted = severity.to_lowercase();
        let records = self.records.read().await;
        records
            .iter()
            .filter(|r| r.severity.to_lowercase() == wanted)
            .cloned()
            .collect()
    }

    /// The last `limit` records, oldest first.
    pub async fn recent(&self, limit: usize) -> Vec<AlertRecord> {
        let records = self.records.read().await;
        tail(&records, limit).to_vec()
    }

    /// Copy of the full history.
    pub async fn snapshot(&self) -> Vec<AlertRecord> {
        self.records.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

/// Read a history file. A missing file is an empty history.
pub fn load_records(path: &Path) -> Result<Vec<AlertRecord>, StoreError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

/// Write records to `path` through a temporary sibling file and a rename.
fn write_records(path: &Path, records: &[AlertRecord]) -> Result<(), StoreError> {
    let content = serde_json::to_string_pretty(records)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
    }

    let tmp = sibling(path, ".tmp");
    std::fs::write(&tmp, content).map_err(|e| StoreError::io(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        StoreError::io(path, e)
    })
}

fn quarantine(path: &Path) {
    let suffix = format!(".corrupt-{}", chrono::Utc::now().timestamp());
    let target = sibling(path, &suffix);
    match std::fs::rename(path, &target) {
        Ok(()) => warn!(
            moved_to = %target.display(),
            "Moved unreadable alert history aside"
        ),
        Err(e) => warn!("Failed to move unreadable alert history aside: {e}"),
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map_or_else(|| OsString::from("alerts_received.json"), OsString::from);
    name.push(suffix);
    path.with_file_name(name)
}
