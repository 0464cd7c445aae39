//! Webhook receiver for Alertmanager and Grafana alerts.
//!
//! Each incoming alert is classified by name into a category, the matching
//! remediation playbook is written to the operator log, and the alert is
//! appended to a JSON history file that survives restarts.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use alert_receiver::alerts::{run_server, AppState};
//! use alert_receiver::config::ReceiverConfig;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = ReceiverConfig::default();
//! let state = Arc::new(AppState::from_config(&config));
//! run_server(state, "0.0.0.0:5000").await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! - `ALERT_RECEIVER_ADDR`: listen address (default `0.0.0.0:5000`)
//! - `ALERT_RECEIVER_HISTORY_FILE`: history file (default `alerts_received.json`)
//! - `ALERT_RECEIVER_LOG_FILE`: operator log (default `alerts.log`)
//! - `ALERT_RECEIVER_CONFIG`: optional JSON config file
//! - `RUST_LOG`: overrides the log filter

pub mod alerts;
pub mod config;
pub mod error;
pub mod logging;

pub use config::ReceiverConfig;
pub use error::{IngestError, StoreError};
