//! Alert ingestion pipeline.

use serde_json::Value;
use tracing::{debug, info, warn};

use super::classifier::Classifier;
use super::remediation;
use super::store::HistoryStore;
use super::types::{AlertPayload, AlertRecord};
use crate::error::IngestError;

/// Turns raw webhook bodies into stored alert records.
pub struct AlertProcessor {
    classifier: Classifier,
    store: HistoryStore,
}

impl AlertProcessor {
    #[must_use]
    pub fn new(classifier: Classifier, store: HistoryStore) -> Self {
        Self { classifier, store }
    }

    /// History backing this processor.
    #[must_use]
    pub fn store(&self) -> &HistoryStore {
        &self.store
    }

    /// Parse a raw request body into a JSON object.
    ///
    /// Blank bodies and JSON `null` count as empty.
    pub fn parse_body(body: &[u8]) -> Result<Value, IngestError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(IngestError::EmptyPayload);
        }

        match serde_json::from_slice::<Value>(body)? {
            Value::Null => Err(IngestError::EmptyPayload),
            value @ Value::Object(_) => Ok(value),
            _ => Err(IngestError::NotAnObject),
        }
    }

    /// Classify, log remediation for, and store one alert.
    ///
    /// Nothing is stored when this returns an error. `commonAnnotations` is
    /// only read when a playbook fires, so a malformed value fails only
    /// classified alerts. A failure to persist the history after the record
    /// was appended is logged, not returned.
    pub async fn process(&self, raw: Value) -> Result<AlertRecord, IngestError> {
        let payload = AlertPayload::from_value(&raw)?;
        let record = AlertRecord::from_payload(&payload, raw)?;

        info!(
            "Processing alert: {} [Status: {}, Severity: {}]",
            record.name, record.status, record.severity
        );

        let category = self.classifier.classify(&record.name);
        if let Some(playbook) = remediation::playbook(category) {
            let description = payload.description()?;
            playbook.emit(&record.name, &description);
        } else {
            debug!(alert_name = %record.name, "No remediation playbook for alert");
        }

        if let Err(e) = self.store.append(record.clone()).await {
            warn!(
                alert_name = %record.name,
                "Alert kept in memory only, history file is behind: {e}"
            );
        }

        Ok(record)
    }
}
