//! Read-only HTTP query server
//!
//! Serves the latest sweep snapshot. Reads go straight to the result store,
//! so a response always reflects one complete sweep.

pub mod api;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::scheduler::SweepScheduler;
use crate::storage::ResultStore;

pub use api::create_router;

// ============================================================================
// App State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Sweep results
    pub store: Arc<dyn ResultStore>,

    /// Scheduler, for status reporting
    pub scheduler: Arc<SweepScheduler>,

    /// Records per page
    pub page_size: usize,

    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    pub fn new(scheduler: Arc<SweepScheduler>, page_size: usize) -> Self {
        Self {
            store: scheduler.store(),
            scheduler,
            page_size,
            start_time: Instant::now(),
        }
    }
}

/// Router with CORS and request tracing applied
pub fn build_router(state: AppState) -> Router {
    create_router(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Bind `addr` and serve until `shutdown_signal` resolves
pub async fn serve(
    addr: SocketAddr,
    state: AppState,
    shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<(), ServerError> {
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::BindError(e.to_string()))?;

    tracing::info!("Query server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| ServerError::ServeError(e.to_string()))?;

    tracing::info!("Query server shutdown complete");
    Ok(())
}

// ============================================================================
// Server Errors
// ============================================================================

/// Server errors
#[derive(Debug, Clone)]
pub enum ServerError {
    /// Failed to bind to address
    BindError(String),

    /// Server error
    ServeError(String),
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BindError(msg) => write!(f, "Failed to bind: {}", msg),
            Self::ServeError(msg) => write!(f, "Server error: {}", msg),
        }
    }
}

impl std::error::Error for ServerError {}
