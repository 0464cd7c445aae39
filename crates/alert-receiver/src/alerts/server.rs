//! HTTP server for alert webhooks and history queries.

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use super::processor::AlertProcessor;
use super::store::HistoryStore;
use super::types::now_string;
use crate::config::ReceiverConfig;
use crate::error::IngestError;

/// Shared server state.
pub struct AppState {
    /// Ingestion pipeline and the history behind it
    pub processor: AlertProcessor,
    /// Records returned by `/alerts-history` without a usable `limit`
    pub default_history_limit: usize,
}

impl AppState {
    #[must_use]
    pub fn new(processor: AlertProcessor, default_history_limit: usize) -> Self {
        Self {
            processor,
            default_history_limit,
        }
    }

    /// Build state from configuration, loading any existing history.
    #[must_use]
    pub fn from_config(config: &ReceiverConfig) -> Self {
        let store = HistoryStore::load(&config.history_file, config.store_options());
        Self::new(
            AlertProcessor::new(config.classifier(), store),
            config.default_history_limit,
        )
    }

    fn store(&self) -> &HistoryStore {
        self.processor.store()
    }
}

/// Build the HTTP router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/alerts", post(receive_alert_handler))
        .route("/stats", get(stats_handler))
        .route("/alerts-history", get(history_handler))
        .route("/alerts/{severity}", get(severity_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
///
/// # Errors
///
/// Returns an error if the server fails to bind to the address.
pub async fn run_server(state: Arc<AppState>, addr: &str) -> Result<()> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Alert receiver listening on {addr}");

    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
}

/// Acknowledgement for an accepted alert.
#[derive(Debug, Serialize)]
struct ProcessedResponse {
    status: &'static str,
    alert_name: String,
    severity: String,
    timestamp: String,
}

/// Query string for `/alerts-history`.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Kept as text so a malformed value falls back to the default
    pub limit: Option<String>,
}

impl HistoryQuery {
    fn limit_or(&self, default: usize) -> usize {
        self.limit
            .as_deref()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(default)
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        timestamp: now_string(),
    })
}

/// Alertmanager webhook handler.
async fn receive_alert_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, IngestError> {
    info!("Received alert payload: {}", String::from_utf8_lossy(&body));

    let raw = AlertProcessor::parse_body(&body).inspect_err(|e| match e {
        IngestError::EmptyPayload => warn!("Received empty alert payload"),
        _ => warn!("Rejected alert payload: {e}"),
    })?;

    let record = state
        .processor
        .process(raw)
        .await
        .inspect_err(|e| error!("Error processing alert: {e}"))?;

    Ok(Json(ProcessedResponse {
        status: "processed",
        timestamp: record.timestamp_string(),
        alert_name: record.name,
        severity: record.severity,
    }))
}

async fn stats_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.store().statistics().await)
}

async fn history_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> impl IntoResponse {
    let limit = query.limit_or(state.default_history_limit);
    Json(state.store().recent(limit).await)
}

async fn severity_handler(
    State(state): State<Arc<AppState>>,
    Path(severity): Path<String>,
) -> impl IntoResponse {
    Json(state.store().filter_by_severity(&severity).await)
}
