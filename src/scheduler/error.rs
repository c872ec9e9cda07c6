//! Error types for the sweep scheduler

use std::fmt;

use crate::utils::error::{CatalogError, StoreError};

/// Result type for scheduler operations
pub type SchedulerResult<T> = Result<T, SweepError>;

/// Errors that abort a single sweep cycle
///
/// None of these are fatal to the process: the scheduler logs them and
/// moves on to the idle delay.
#[derive(Debug)]
pub enum SweepError {
    /// Catalog could not be retrieved, nothing was validated
    Catalog(CatalogError),

    /// Validation finished but the results could not be persisted
    Store(StoreError),

    /// Fewer verdicts were collected than channels were enqueued
    LostResults {
        expected: usize,
        collected: usize,
    },

    /// Collector task lost results
    Collector {
        reason: String,
    },
}

impl fmt::Display for SweepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Catalog(err) => write!(f, "Catalog fetch failed: {}", err),
            Self::Store(err) => write!(f, "Persisting sweep results failed: {}", err),
            Self::LostResults {
                expected,
                collected,
            } => write!(
                f,
                "Lost results: {} channels enqueued, {} verdicts collected",
                expected, collected
            ),
            Self::Collector { reason } => write!(f, "Result collector failed: {}", reason),
        }
    }
}

impl std::error::Error for SweepError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Catalog(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CatalogError> for SweepError {
    fn from(err: CatalogError) -> Self {
        Self::Catalog(err)
    }
}

impl From<StoreError> for SweepError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl SweepError {
    /// Whether the next scheduled cycle may succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Catalog(_) | Self::Store(_) => true,
            Self::LostResults { .. } | Self::Collector { .. } => false,
        }
    }

    /// Short label for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Catalog(_) => "catalog",
            Self::Store(_) => "store",
            Self::LostResults { .. } => "lost_results",
            Self::Collector { .. } => "collector",
        }
    }
}
