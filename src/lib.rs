//! iptv-sweep - IPTV channel sweep & validation engine
//!
//! Periodically downloads a public M3U channel catalog, probes every stream
//! with a bounded pool of concurrent workers, and persists the channels as
//! either valid or dead. A small read-only HTTP API serves the results.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`catalog`] - Catalog download, M3U parsing and "now playing" enrichment
//! - [`validator`] - Per-stream reachability, HLS and stability checks
//! - [`pool`] - Worker pool that drains a sweep's queue
//! - [`scheduler`] - Sweep cycle state machine
//! - [`storage`] - Result snapshot persistence and queries
//! - [`server`] - Read-only query API
//! - [`models`] - Core data structures and types
//! - [`metrics`] - Prometheus metrics
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use iptv_sweep::config::Config;
//! use iptv_sweep::scheduler::SweepScheduler;
//! use iptv_sweep::storage::JsonFileStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let store = Arc::new(JsonFileStore::open(&config.storage.data_dir).await?);
//!     let scheduler = SweepScheduler::from_config(&config, store)?;
//!     let report = scheduler.run_cycle().await?;
//!     println!("{} valid, {} dead", report.valid, report.dead);
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod pool;
pub mod scheduler;
pub mod server;
pub mod storage;
pub mod utils;
pub mod validator;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::catalog::{CatalogSource, HttpCatalogFetcher, StaticCatalog};
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorCategory, Result};
    pub use crate::models::{Channel, SweepReport, SweepResult, Verdict};
    pub use crate::pool::{WorkQueue, WorkerPool};
    pub use crate::scheduler::{SweepEvent, SweepScheduler, SweepState};
    pub use crate::storage::{JsonFileStore, MemoryStore, ResultStore};
    pub use crate::validator::{ProbeFailure, StreamValidator, Validator};
}

// Direct re-exports for convenience
pub use models::{Channel, SweepReport, Verdict};
