//! REST handlers for the query server
//!
//! All list endpoints return bare JSON arrays of channel records.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metrics;
use crate::scheduler::SchedulerStatus;
use crate::storage::{paginate, search};

use super::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

/// `?page=N`, 1-indexed
///
/// Kept as raw text: a page that is negative, blank or too large for
/// `usize` is out of range and yields an empty list.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
}

impl PageParams {
    /// Requested page, `0` when it names no page
    pub fn page(&self) -> usize {
        match self.page.as_deref() {
            None => 1,
            Some(raw) => raw.trim().parse().unwrap_or(0),
        }
    }
}

/// `?query=...`
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// Scheduler and store status
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    #[serde(flatten)]
    pub scheduler: SchedulerStatus,
    pub last_updated: Option<DateTime<Utc>>,
    pub valid_channels: usize,
    pub dead_channels: usize,
}

// ============================================================================
// Routes
// ============================================================================

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/status", get(sweep_status))
        .route("/metrics", get(prometheus_metrics))
        // Channel queries
        .route("/channels", get(list_channels))
        .route("/search", get(search_channels))
        .route("/dead", get(list_dead))
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

async fn sweep_status(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.store.snapshot().await;

    Json(StatusResponse {
        scheduler: state.scheduler.status().await,
        last_updated: snapshot.generated_at,
        valid_channels: snapshot.valid.len(),
        dead_channels: snapshot.dead.len(),
    })
}

async fn prometheus_metrics() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::gather(),
    )
}

/// One page of valid channels
async fn list_channels(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> impl IntoResponse {
    let snapshot = state.store.snapshot().await;
    Json(paginate(&snapshot.valid, params.page(), state.page_size).to_vec())
}

/// Valid channels whose name contains the query
async fn search_channels(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    let snapshot = state.store.snapshot().await;
    Json(search(&snapshot.valid, &params.query))
}

/// One page of dead channels
async fn list_dead(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> impl IntoResponse {
    let snapshot = state.store.snapshot().await;
    Json(paginate(&snapshot.dead, params.page(), state.page_size).to_vec())
}
