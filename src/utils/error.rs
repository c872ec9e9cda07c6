//! Error types for the sweep engine's external collaborators
//!
//! This module defines the errors raised by the catalog fetcher and the
//! result store. Per-channel probe failures live in
//! [`crate::validator::ProbeFailure`] because they never escape the pool.

use thiserror::Error;

/// Errors that can occur while retrieving the channel catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Catalog server answered with a non-success status
    #[error("Catalog returned status {0}")]
    Status(u16),

    /// Request timeout
    #[error("Catalog request timed out")]
    Timeout,

    /// Catalog body could not be parsed
    #[error("Failed to parse catalog: {0}")]
    Parse(String),
}

impl CatalogError {
    /// Build from a reqwest error, pulling timeouts out into their own variant
    pub fn from_request(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(err)
        }
    }
}

/// Errors that can occur while persisting or loading sweep results
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem error
    #[error("I/O error during '{operation}': {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot could not be serialized
    #[error("Failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Snapshot on disk is unreadable
    #[error("Corrupt snapshot at {path}: {reason}")]
    CorruptSnapshot { path: String, reason: String },
}

impl StoreError {
    /// Wrap an I/O error with the operation that failed
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }
}
