//! Error types for alert ingestion and history storage.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while ingesting a single alert payload.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Request body was absent, blank, or JSON `null`
    #[error("Empty payload")]
    EmptyPayload,

    /// Request body was not valid JSON
    #[error("Invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Request body was valid JSON but not an object
    #[error("Payload must be a JSON object")]
    NotAnObject,

    /// A known payload field was present with the wrong shape
    #[error("Field `{field}` must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    /// Anything else that went wrong while processing
    #[error("{0}")]
    Processing(String),
}

impl IngestError {
    /// HTTP status this error maps to.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::EmptyPayload | Self::InvalidJson(_) | Self::NotAnObject => {
                StatusCode::BAD_REQUEST
            }
            Self::InvalidField { .. } | Self::Processing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the caller sent something unusable, as opposed to a failure on our side.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = if self.is_client_error() {
            json!({ "error": self.to_string() })
        } else {
            json!({ "status": "error", "message": "Failed to process alert" })
        };

        (status, Json(body)).into_response()
    }
}

/// Errors raised by the history store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem operation failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// History could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backing file exists but does not hold a valid history array
    #[error("Corrupt history file {}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
