//! Sweep scheduling
//!
//! The scheduler alternates between two states forever:
//!
//! ```text
//!        ┌──────────────────── interval elapsed ───────────────────┐
//!        ▼                                                          │
//!   ┌──────────┐   fetch → validate all → persist → summary   ┌─────┴────┐
//!   │ Sweeping │ ───────────────────────────────────────────▶ │   Idle   │
//!   └──────────┘   (or: catalog/store failure, cycle aborted) └──────────┘
//! ```
//!
//! A cycle that cannot fetch the catalog is aborted before anything is
//! validated, and the store keeps the previous sweep's results. Sweeps never
//! overlap, and a running sweep is never cancelled; shutdown is only
//! observed while idle.

pub mod error;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch, RwLock};
use uuid::Uuid;

use crate::catalog::{CatalogSource, HttpCatalogFetcher, NowPlayingEnricher};
use crate::config::Config;
use crate::metrics;
use crate::models::SweepReport;
use crate::pool::{WorkQueue, WorkerPool};
use crate::storage::ResultStore;
use crate::utils::format_duration;
use crate::validator::StreamValidator;

pub use error::{SchedulerResult, SweepError};

// ============================================================================
// State & Events
// ============================================================================

/// Where the scheduler is in its cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SweepState {
    /// A sweep is running
    Sweeping {
        sweep_id: Uuid,
        started_at: DateTime<Utc>,
    },
    /// Waiting for the next sweep (`None` before the first one is scheduled)
    Idle {
        next_sweep_at: Option<DateTime<Utc>>,
    },
}

/// Events emitted by the scheduler
#[derive(Debug, Clone)]
pub enum SweepEvent {
    /// A sweep started
    Started {
        sweep_id: Uuid,
        started_at: DateTime<Utc>,
    },

    /// A sweep finished and its results were persisted
    Completed(SweepReport),

    /// A sweep was aborted; the store was left untouched
    Aborted { sweep_id: Uuid, reason: String },
}

/// Scheduler status information
#[derive(Debug, Clone, Serialize)]
pub struct SchedulerStatus {
    pub state: SweepState,
    pub last_report: Option<SweepReport>,
    pub last_error: Option<String>,
    pub sweeps_completed: u64,
    pub sweeps_aborted: u64,
}

impl Default for SchedulerStatus {
    fn default() -> Self {
        Self {
            state: SweepState::Idle {
                next_sweep_at: None,
            },
            last_report: None,
            last_error: None,
            sweeps_completed: 0,
            sweeps_aborted: 0,
        }
    }
}

// ============================================================================
// Sweep Scheduler
// ============================================================================

/// Drives fetch → validate → persist cycles on a fixed interval
pub struct SweepScheduler {
    catalog: Arc<dyn CatalogSource>,
    pool: WorkerPool,
    store: Arc<dyn ResultStore>,
    interval: Duration,
    event_sender: broadcast::Sender<SweepEvent>,
    status: RwLock<SchedulerStatus>,
}

impl SweepScheduler {
    /// Create a scheduler from its collaborators
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        pool: WorkerPool,
        store: Arc<dyn ResultStore>,
        interval: Duration,
    ) -> Self {
        let (event_sender, _) = broadcast::channel(100);

        Self {
            catalog,
            pool,
            store,
            interval,
            event_sender,
            status: RwLock::new(SchedulerStatus::default()),
        }
    }

    /// Build the production wiring from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be created
    pub fn from_config(config: &Config, store: Arc<dyn ResultStore>) -> crate::error::Result<Self> {
        let catalog = HttpCatalogFetcher::from_config(config)?;
        let validator = StreamValidator::from_config(config)?;

        let mut pool = WorkerPool::new(Arc::new(validator), config.sweep.workers);
        if config.enrichment.enabled {
            pool = pool.with_enricher(NowPlayingEnricher::new(config.enrichment_timeout())?);
        }

        Ok(Self::new(
            Arc::new(catalog),
            pool,
            store,
            config.sweep_interval(),
        ))
    }

    /// Subscribe to scheduler events
    pub fn subscribe(&self) -> broadcast::Receiver<SweepEvent> {
        self.event_sender.subscribe()
    }

    /// Current status
    pub async fn status(&self) -> SchedulerStatus {
        self.status.read().await.clone()
    }

    /// Delay between sweeps
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Store the results are written to
    pub fn store(&self) -> Arc<dyn ResultStore> {
        Arc::clone(&self.store)
    }

    /// Run one full sweep: fetch, validate every channel, persist
    ///
    /// # Errors
    ///
    /// Returns `SweepError::Catalog` if the catalog could not be fetched
    /// (nothing is validated or written), `SweepError::Store` if the results
    /// could not be persisted, and pool errors if verdicts were lost.
    pub async fn run_cycle(&self) -> SchedulerResult<SweepReport> {
        let sweep_id = Uuid::new_v4();
        let started_at = Utc::now();

        self.status.write().await.state = SweepState::Sweeping {
            sweep_id,
            started_at,
        };
        let _ = self.event_sender.send(SweepEvent::Started {
            sweep_id,
            started_at,
        });
        tracing::info!(%sweep_id, "Starting channel sweep");

        let outcome = self.sweep(sweep_id, started_at).await;

        let mut status = self.status.write().await;
        match &outcome {
            Ok(report) => {
                tracing::info!(
                    %sweep_id,
                    valid = report.valid,
                    dead = report.dead,
                    valid_ratio = report.valid_ratio(),
                    duration = %format_duration(report.duration()),
                    "Channel sweep complete"
                );
                metrics::record_sweep(report);
                status.sweeps_completed += 1;
                status.last_report = Some(report.clone());
                status.last_error = None;
                let _ = self.event_sender.send(SweepEvent::Completed(report.clone()));
            }
            Err(e) => {
                if matches!(e, SweepError::Store(_)) {
                    tracing::error!(%sweep_id, error = %e, "Failed to persist sweep results");
                } else {
                    tracing::warn!(%sweep_id, error = %e, "Channel sweep aborted");
                }
                metrics::record_sweep_failure(e.kind());
                status.sweeps_aborted += 1;
                status.last_error = Some(e.to_string());
                let _ = self.event_sender.send(SweepEvent::Aborted {
                    sweep_id,
                    reason: e.to_string(),
                });
            }
        }
        status.state = SweepState::Idle {
            next_sweep_at: None,
        };

        outcome
    }

    async fn sweep(&self, sweep_id: Uuid, started_at: DateTime<Utc>) -> SchedulerResult<SweepReport> {
        let channels = self.catalog.fetch_catalog().await?;
        let queue = WorkQueue::from_channels(channels);
        let total = queue.enqueued();

        let (result, _stats) = self.pool.run(queue).await?;
        let (valid, dead) = (result.valid.len(), result.dead.len());

        self.store.write_cycle(result.valid, result.dead).await?;

        Ok(SweepReport {
            sweep_id,
            started_at,
            finished_at: Utc::now(),
            total,
            valid,
            dead,
        })
    }

    /// Sweep, sleep, repeat until `shutdown` flips to `true`
    ///
    /// Cycle failures are logged and never end the loop.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            interval = %format_duration(self.interval),
            workers = self.pool.size(),
            "Sweep scheduler started"
        );

        loop {
            // Errors are already logged and recorded by run_cycle
            let _ = self.run_cycle().await;

            let next_sweep_at = next_sweep_after(Utc::now(), self.interval);
            self.status.write().await.state = SweepState::Idle { next_sweep_at };
            match next_sweep_at {
                Some(at) => tracing::info!(next_sweep_at = %at, "Scheduler idle"),
                None => tracing::info!("Scheduler idle, next sweep out of calendar range"),
            }

            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown.changed() => {
                    break;
                }
            }
        }

        tracing::info!("Sweep scheduler stopped");
    }
}

/// When the next sweep starts, if that instant is representable
fn next_sweep_after(now: DateTime<Utc>, interval: Duration) -> Option<DateTime<Utc>> {
    let delay = chrono::Duration::from_std(interval).ok()?;
    now.checked_add_signed(delay)
}
