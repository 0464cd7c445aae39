//! Alert webhook handling.
//!
//! Receives Alertmanager-style webhook payloads, classifies them by alert
//! name, writes remediation playbooks to the operator log, and keeps a
//! persistent history that can be queried over HTTP:
//! - `POST /alerts` ingests one payload
//! - `GET /stats` summarizes the full history
//! - `GET /alerts-history` returns the most recent records
//! - `GET /alerts/{severity}` filters by severity

pub mod classifier;
pub mod processor;
pub mod remediation;
pub mod report;
pub mod server;
pub mod store;
pub mod types;

pub use classifier::{Category, ClassificationRule, Classifier};
pub use processor::AlertProcessor;
pub use server::{build_router, run_server, AppState};
pub use store::{AlertStatistics, HistoryStore, StoreOptions};
pub use types::{AlertPayload, AlertRecord};
