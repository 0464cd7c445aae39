//! Types for inbound alert payloads and stored alert records.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::IngestError;

/// Alert name used when `groupLabels.alertname` is absent.
pub const DEFAULT_ALERT_NAME: &str = "Unknown";

/// Severity used when `commonLabels.severity` is absent.
pub const DEFAULT_SEVERITY: &str = "unknown";

/// Description used when `commonAnnotations.description` is absent.
pub const DEFAULT_DESCRIPTION: &str = "Unknown";

/// Status used when the payload carries none.
pub const DEFAULT_STATUS: &str = "unknown";

/// Known severity labels, most urgent first.
///
/// Severity is carried through from the payload as free text; this table is
/// only used for ordering output, never for validation.
pub const SEVERITY_LEVELS: [(&str, u8); 5] = [
    ("critical", 1),
    ("high", 2),
    ("medium", 3),
    ("low", 4),
    ("info", 5),
];

/// Rank of a severity label (1 = most urgent), if it is a known level.
#[must_use]
pub fn severity_rank(severity: &str) -> Option<u8> {
    SEVERITY_LEVELS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(severity))
        .map(|(_, rank)| *rank)
}

/// Grafana / Alertmanager webhook payload.
///
/// Only the fields the receiver reads are typed. Every field is optional, but
/// a field that is present with the wrong shape is rejected when accessed.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertPayload {
    /// Status: usually "firing" or "resolved", but any JSON value is kept
    #[serde(default)]
    pub status: Option<Value>,
    /// Labels that grouped this notification (carries `alertname`)
    #[serde(default)]
    pub group_labels: Map<String, Value>,
    /// Labels common to all alerts in the group (carries `severity`)
    #[serde(default)]
    pub common_labels: Map<String, Value>,
    /// Annotations common to all alerts (carries `description`).
    /// Only read when a playbook fires, so its shape is checked lazily.
    #[serde(default)]
    pub common_annotations: Option<Value>,
}

impl AlertPayload {
    /// Parse the typed view of a raw JSON object.
    pub fn from_value(value: &Value) -> Result<Self, IngestError> {
        if !value.is_object() {
            return Err(IngestError::NotAnObject);
        }
        serde_json::from_value(value.clone())
            .map_err(|e| IngestError::Processing(format!("malformed alert payload: {e}")))
    }

    /// Alert status, defaulting to "unknown". Non-string values are
    /// rendered as JSON text.
    #[must_use]
    pub fn status(&self) -> String {
        match &self.status {
            None => DEFAULT_STATUS.to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// Alert name from `groupLabels.alertname`.
    pub fn alert_name(&self) -> Result<&str, IngestError> {
        Ok(string_field(&self.group_labels, "alertname", "groupLabels.alertname")?
            .unwrap_or(DEFAULT_ALERT_NAME))
    }

    /// Lower-cased severity from `commonLabels.severity`.
    pub fn severity(&self) -> Result<String, IngestError> {
        Ok(string_field(&self.common_labels, "severity", "commonLabels.severity")?
            .unwrap_or(DEFAULT_SEVERITY)
            .to_lowercase())
    }

    /// Description annotation. Non-string values are rendered as JSON text.
    pub fn description(&self) -> Result<String, IngestError> {
        let annotations = match &self.common_annotations {
            None => return Ok(DEFAULT_DESCRIPTION.to_string()),
            Some(Value::Object(map)) => map,
            Some(_) => {
                return Err(IngestError::InvalidField {
                    field: "commonAnnotations",
                    expected: "an object",
                })
            }
        };

        Ok(match annotations.get("description") {
            None => DEFAULT_DESCRIPTION.to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        })
    }
}

fn string_field<'a>(
    map: &'a Map<String, Value>,
    key: &str,
    field: &'static str,
) -> Result<Option<&'a str>, IngestError> {
    match map.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(IngestError::InvalidField {
            field,
            expected: "a string",
        }),
    }
}

/// A processed alert as kept in history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    /// When the receiver processed the alert
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    /// Alert name
    #[serde(default = "default_name")]
    pub name: String,
    /// Lower-cased severity
    #[serde(default = "default_severity")]
    pub severity: String,
    /// Alert status
    #[serde(default = "default_status")]
    pub status: String,
    /// Verbatim inbound payload
    #[serde(default)]
    pub data: Value,
}

fn default_name() -> String {
    DEFAULT_ALERT_NAME.to_string()
}

fn default_severity() -> String {
    DEFAULT_SEVERITY.to_string()
}

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

impl AlertRecord {
    /// Build a record stamped with the current time.
    ///
    /// The timestamp is truncated to microseconds so that it survives a
    /// round-trip through the history file unchanged.
    pub fn from_payload(payload: &AlertPayload, data: Value) -> Result<Self, IngestError> {
        Ok(Self {
            timestamp: Utc::now().trunc_subsecs(6),
            name: payload.alert_name()?.to_string(),
            severity: payload.severity()?,
            status: payload.status(),
            data,
        })
    }

    /// ISO-8601 rendering of the record timestamp.
    #[must_use]
    pub fn timestamp_string(&self) -> String {
        timestamp::format(&self.timestamp)
    }
}

/// ISO-8601 timestamps with microsecond precision.
///
/// Reads both offset-carrying RFC 3339 strings and naive
/// `YYYY-MM-DDTHH:MM:SS[.ffffff]` strings, which are taken as UTC.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    /// Render a timestamp the way records are stored.
    #[must_use]
    pub fn format(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    /// Parse a stored timestamp.
    pub fn parse(s: &str) -> Option<DateTime<Utc>> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
            return Some(ts.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid ISO-8601 timestamp: {raw}")))
    }
}

/// Current time rendered as a record timestamp.
#[must_use]
pub fn now_string() -> String {
    timestamp::format(&Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: &Value) -> AlertPayload {
        AlertPayload::from_value(value).unwrap()
    }

    #[test]
    fn test_payload_defaults_when_fields_absent() {
        let p = payload(&json!({}));
        assert_eq!(p.status(), "unknown");
        assert_eq!(p.alert_name().unwrap(), "Unknown");
        assert_eq!(p.severity().unwrap(), "unknown");
        assert_eq!(p.description().unwrap(), "Unknown");
    }

    #[test]
    fn test_payload_reads_grafana_fields() {
        let p = payload(&json!({
            "status": "firing",
            "groupLabels": {"alertname": "HighFailedLoginsAlert"},
            "commonLabels": {"severity": "Critical", "instance": "web-1"},
            "commonAnnotations": {"description": "5 failed logins"},
            "receiver": "webhook"
        }));
        assert_eq!(p.status(), "firing");
        assert_eq!(p.alert_name().unwrap(), "HighFailedLoginsAlert");
        assert_eq!(p.severity().unwrap(), "critical");
        assert_eq!(p.description().unwrap(), "5 failed logins");
    }

    #[test]
    fn test_non_string_description_is_rendered() {
        let p = payload(&json!({"commonAnnotations": {"description": 42}}));
        assert_eq!(p.description().unwrap(), "42");
    }

    #[test]
    fn test_non_string_status_is_rendered() {
        let p = payload(&json!({"status": 5}));
        assert_eq!(p.status(), "5");

        let p = payload(&json!({"status": {"phase": "firing"}}));
        assert_eq!(p.status(), r#"{"phase":"firing"}"#);
    }

    #[test]
    fn test_annotations_shape_is_checked_on_read() {
        let p = payload(&json!({"commonAnnotations": "x"}));
        assert!(matches!(
            p.description(),
            Err(IngestError::InvalidField { field: "commonAnnotations", .. })
        ));
    }

    #[test]
    fn test_shape_errors_are_rejected() {
        let p = payload(&json!({"groupLabels": {"alertname": 7}}));
        assert!(matches!(
            p.alert_name(),
            Err(IngestError::InvalidField { field: "groupLabels.alertname", .. })
        ));

        let p = payload(&json!({"commonLabels": {"severity": ["high"]}}));
        assert!(p.severity().is_err());

        let err = AlertPayload::from_value(&json!({"groupLabels": "oops"})).unwrap_err();
        assert!(matches!(err, IngestError::Processing(_)));

        let err = AlertPayload::from_value(&json!(["not", "an", "object"])).unwrap_err();
        assert!(matches!(err, IngestError::NotAnObject));
    }

    #[test]
    fn test_record_keeps_payload_verbatim() {
        let raw = json!({
            "status": "resolved",
            "groupLabels": {"alertname": "CPUHigh"},
            "commonLabels": {"severity": "HIGH"},
            "extra": {"nested": [1, 2, 3]}
        });
        let record = AlertRecord::from_payload(&payload(&raw), raw.clone()).unwrap();
        assert_eq!(record.name, "CPUHigh");
        assert_eq!(record.severity, "high");
        assert_eq!(record.status, "resolved");
        assert_eq!(record.data, raw);
    }

    #[test]
    fn test_record_timestamp_survives_serialization() {
        let record = AlertRecord::from_payload(&AlertPayload::default(), json!({})).unwrap();
        let text = serde_json::to_string(&record).unwrap();
        let back: AlertRecord = serde_json::from_str(&text).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_naive_timestamps_are_read_as_utc() {
        let legacy = json!({
            "timestamp": "2024-03-01T10:15:30.123456",
            "name": "BannedIP",
            "severity": "critical",
            "status": "firing",
            "data": {}
        });
        let record: AlertRecord = serde_json::from_value(legacy).unwrap();
        assert_eq!(record.timestamp_string(), "2024-03-01T10:15:30.123456Z");

        assert!(timestamp::parse("yesterday").is_none());
    }

    #[test]
    fn test_severity_rank() {
        assert_eq!(severity_rank("critical"), Some(1));
        assert_eq!(severity_rank("INFO"), Some(5));
        assert_eq!(severity_rank("unknown"), None);
    }
}
