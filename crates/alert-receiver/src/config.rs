//! Receiver configuration.
//!
//! Defaults cover a standalone deployment: history and log files in the
//! working directory, the built-in classification rules, and the query
//! limits operators are used to. A JSON file can override any of these, and
//! command-line flags or environment variables override the file paths.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::alerts::classifier::{default_rules, ClassificationRule, Classifier};
use crate::alerts::store::{StoreOptions, DEFAULT_RECENT_WINDOW};

/// Default listen address.
pub const DEFAULT_ADDR: &str = "0.0.0.0:5000";

/// Default history file, relative to the working directory.
pub const DEFAULT_HISTORY_FILE: &str = "alerts_received.json";

/// Default operator log file, relative to the working directory.
pub const DEFAULT_LOG_FILE: &str = "alerts.log";

/// Default `limit` for `GET /alerts-history`.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Configuration for the alert receiver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiverConfig {
    /// JSON file holding the alert history
    pub history_file: PathBuf,
    /// Append-only operator log file
    pub log_file: PathBuf,
    /// Records returned by `/alerts-history` when no limit is given
    pub default_history_limit: usize,
    /// Records included in the `/stats` recent list
    pub recent_window: usize,
    /// Extra attempts when writing the history file fails
    pub persist_retries: u32,
    /// Initial retry delay in milliseconds; doubles per retry
    pub persist_backoff_ms: u64,
    /// Classification rules, evaluated in order
    pub rules: Vec<ClassificationRule>,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            history_file: PathBuf::from(DEFAULT_HISTORY_FILE),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            default_history_limit: DEFAULT_HISTORY_LIMIT,
            recent_window: DEFAULT_RECENT_WINDOW,
            persist_retries: 2,
            persist_backoff_ms: 50,
            rules: default_rules(),
        }
    }
}

impl ReceiverConfig {
    /// Load configuration from a JSON file. Missing fields take defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Load from an optional file, falling back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::from_file)
    }

    /// Apply command-line / environment overrides.
    #[must_use]
    pub fn with_overrides(mut self, history_file: Option<PathBuf>, log_file: Option<PathBuf>) -> Self {
        if let Some(path) = history_file {
            self.history_file = path;
        }
        if let Some(path) = log_file {
            self.log_file = path;
        }
        self
    }

    #[must_use]
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            recent_window: self.recent_window,
            persist_retries: self.persist_retries,
            persist_backoff: Duration::from_millis(self.persist_backoff_ms),
        }
    }

    #[must_use]
    pub fn classifier(&self) -> Classifier {
        Classifier::new(self.rules.clone())
    }
}
