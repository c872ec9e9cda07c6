//! Unified error handling for the iptv-sweep crate
//!
//! This module provides a unified error type that consolidates the
//! domain-specific errors into a single `Error` enum, while keeping the
//! domain errors usable on their own.
//!
//! # Architecture
//!
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors
//!
//! Per-channel probe failures ([`crate::validator::ProbeFailure`]) are not
//! part of this enum: they are folded into a `dead` verdict inside the worker
//! pool and never cross a module boundary as errors.

use std::io;
use thiserror::Error;

pub use crate::scheduler::error::SweepError;
pub use crate::utils::error::{CatalogError, StoreError};

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (HTTP, timeout, bad status)
    Network,
    /// Parsing and data extraction errors
    Parsing,
    /// Storage and I/O errors
    Storage,
    /// Configuration and validation errors
    Config,
    /// Scheduler and worker errors
    Scheduler,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Short label for logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Parsing => "parsing",
            Self::Storage => "storage",
            Self::Config => "config",
            Self::Scheduler => "scheduler",
            Self::Other => "other",
        }
    }
}

/// Unified error type for the iptv-sweep crate
#[derive(Error, Debug)]
pub enum Error {
    /// Catalog retrieval errors
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Result store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Sweep orchestration errors
    #[error("Sweep error: {0}")]
    Sweep(#[from] SweepError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Check if this error is recoverable (the next sweep may succeed)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Catalog(_) => true,
            Self::Store(StoreError::Io { .. }) => true,
            Self::Store(_) => false,
            Self::Sweep(e) => e.is_recoverable(),
            Self::Io(_) => true,
            Self::Json(_) => false,
            Self::Http(_) => true,
            Self::Config(_) => false,
            Self::Other { .. } => false,
        }
    }

    /// Get the error category for handling strategies
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Catalog(CatalogError::Parse(_)) => ErrorCategory::Parsing,
            Self::Catalog(_) | Self::Http(_) => ErrorCategory::Network,
            Self::Store(_) | Self::Io(_) => ErrorCategory::Storage,
            Self::Sweep(SweepError::Catalog(_)) => ErrorCategory::Network,
            Self::Sweep(SweepError::Store(_)) => ErrorCategory::Storage,
            Self::Sweep(_) => ErrorCategory::Scheduler,
            Self::Json(_) => ErrorCategory::Parsing,
            Self::Config(_) => ErrorCategory::Config,
            Self::Other { .. } => ErrorCategory::Other,
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other {
            context: context.into(),
            source: None,
        }
    }
}

// Conversion from anyhow::Error
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other {
            context: err.to_string(),
            source: Some(err.into()),
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
