//! Bounded-concurrency validation pool
//!
//! A fixed number of workers drain a shared [`WorkQueue`]. Each worker takes
//! one channel at a time, validates it, and sends the classified channel to
//! a single collector task that owns the valid and dead lists.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  WorkQueue  │────▶│   Workers   │────▶│  Collector  │──▶ SweepResult
//! │ (pre-filled)│     │ (pool size) │     │ (one task)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                       try_take()         mpsc channel
//! ```
//!
//! Workers never wait for new work: once the queue is observed empty they
//! exit. [`WorkerPool::run`] returns after every worker and the collector
//! have finished, so the caller sees a complete result.

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::catalog::NowPlayingEnricher;
use crate::models::{Channel, SweepResult, Verdict, NOT_AVAILABLE};
use crate::scheduler::error::{SchedulerResult, SweepError};
use crate::validator::{ProbeFailure, Validator};

/// Default number of workers
pub const DEFAULT_POOL_SIZE: usize = 5;

// ============================================================================
// Work Queue
// ============================================================================

/// Channels pending validation for one sweep
///
/// The queue is filled once and then only drained: the producing side is
/// closed as soon as it is built.
pub struct WorkQueue {
    rx: Mutex<mpsc::UnboundedReceiver<Channel>>,
    enqueued: usize,
}

impl WorkQueue {
    /// Build a queue holding every given channel
    pub fn from_channels(channels: impl IntoIterator<Item = Channel>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut enqueued = 0;
        for channel in channels {
            // The receiver is alive, so this cannot fail
            if tx.send(channel).is_ok() {
                enqueued += 1;
            }
        }

        Self {
            rx: Mutex::new(rx),
            enqueued,
        }
    }

    /// Take the next channel without waiting, `None` once drained
    pub async fn try_take(&self) -> Option<Channel> {
        self.rx.lock().await.try_recv().ok()
    }

    /// Whether every channel has been taken
    pub async fn is_empty(&self) -> bool {
        self.rx.lock().await.is_empty()
    }

    /// Number of channels originally enqueued
    pub fn enqueued(&self) -> usize {
        self.enqueued
    }
}

// ============================================================================
// Pool Statistics
// ============================================================================

/// Pool statistics (thread-safe)
#[derive(Debug, Default)]
pub struct PoolStats {
    /// Channels taken from the queue
    pub taken: AtomicU64,

    /// Channels classified valid
    pub valid: AtomicU64,

    /// Channels classified dead
    pub dead: AtomicU64,

    /// Validations that panicked
    pub panicked: AtomicU64,

    /// Channels that received "now playing" text
    pub enriched: AtomicU64,
}

impl PoolStats {
    /// Create new stats counter
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Record a verdict
    pub fn record(&self, verdict: Verdict) {
        match verdict {
            Verdict::Valid => self.valid.fetch_add(1, Ordering::Relaxed),
            Verdict::Dead => self.dead.fetch_add(1, Ordering::Relaxed),
        };
    }

    /// Get snapshot of current stats
    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            taken: self.taken.load(Ordering::Relaxed),
            valid: self.valid.load(Ordering::Relaxed),
            dead: self.dead.load(Ordering::Relaxed),
            panicked: self.panicked.load(Ordering::Relaxed),
            enriched: self.enriched.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of pool statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolSnapshot {
    pub taken: u64,
    pub valid: u64,
    pub dead: u64,
    pub panicked: u64,
    pub enriched: u64,
}

// ============================================================================
// Messages
// ============================================================================

/// Message from a worker to the collector
#[derive(Debug)]
struct Classified {
    worker_id: usize,
    channel: Channel,
    verdict: Verdict,
    failure: Option<ProbeFailure>,
}

// ============================================================================
// Worker Pool
// ============================================================================

/// Fixed-size pool of validation workers
pub struct WorkerPool {
    validator: Arc<dyn Validator>,
    enricher: Option<NowPlayingEnricher>,
    size: usize,
}

impl WorkerPool {
    /// Create a pool with `size` workers (at least one)
    pub fn new(validator: Arc<dyn Validator>, size: usize) -> Self {
        Self {
            validator,
            enricher: None,
            size: size.max(1),
        }
    }

    /// Enrich valid channels with "now playing" text
    #[must_use]
    pub fn with_enricher(mut self, enricher: NowPlayingEnricher) -> Self {
        self.enricher = Some(enricher);
        self
    }

    /// Number of workers spawned per run
    pub fn size(&self) -> usize {
        self.size
    }

    /// Validate every channel in the queue
    ///
    /// Returns once all workers have exited and the queue is empty. Every
    /// enqueued channel appears exactly once in the returned result.
    ///
    /// # Errors
    ///
    /// Returns `SweepError::Collector` if the collector task dies, and
    /// `SweepError::LostResults` if fewer verdicts than channels were
    /// collected.
    pub async fn run(&self, queue: WorkQueue) -> SchedulerResult<(SweepResult, PoolSnapshot)> {
        let expected = queue.enqueued();
        let queue = Arc::new(queue);
        let stats = PoolStats::new();

        tracing::info!(channels = expected, workers = self.size, "Starting worker pool");

        let (result_tx, result_rx) = mpsc::channel::<Classified>(self.size * 4);
        let collector = tokio::spawn(collect(result_rx, expected));

        let handles = self.spawn_workers(&queue, &result_tx, &stats);
        drop(result_tx);

        for (worker_id, handle) in handles.into_iter().enumerate() {
            if let Err(e) = handle.await {
                tracing::error!(worker_id, error = %e, "Worker task failed");
            }
        }

        let mut result = collector.await.map_err(|e| SweepError::Collector {
            reason: e.to_string(),
        })?;

        // Only reachable if every worker died before draining the queue
        let mut stranded = 0usize;
        while let Some(channel) = queue.try_take().await {
            result.push(channel, Verdict::Dead);
            stats.record(Verdict::Dead);
            stranded += 1;
        }
        if stranded > 0 {
            tracing::warn!(stranded, "Channels left in queue after workers exited, marked dead");
        }

        if result.total() != expected {
            return Err(SweepError::LostResults {
                expected,
                collected: result.total(),
            });
        }

        let snapshot = stats.snapshot();
        tracing::info!(
            valid = result.valid.len(),
            dead = result.dead.len(),
            panicked = snapshot.panicked,
            enriched = snapshot.enriched,
            "Worker pool finished"
        );

        Ok((result, snapshot))
    }

    fn spawn_workers(
        &self,
        queue: &Arc<WorkQueue>,
        result_tx: &mpsc::Sender<Classified>,
        stats: &Arc<PoolStats>,
    ) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::with_capacity(self.size);

        for worker_id in 0..self.size {
            let queue = Arc::clone(queue);
            let result_tx = result_tx.clone();
            let stats = Arc::clone(stats);
            let validator = Arc::clone(&self.validator);
            let enricher = self.enricher.clone();

            handles.push(tokio::spawn(async move {
                while let Some(channel) = queue.try_take().await {
                    stats.taken.fetch_add(1, Ordering::Relaxed);

                    let message =
                        classify(worker_id, channel, validator.as_ref(), enricher.as_ref(), &stats)
                            .await;
                    stats.record(message.verdict);

                    if result_tx.send(message).await.is_err() {
                        tracing::error!(worker_id, "Result channel closed, worker exiting");
                        return;
                    }
                }

                tracing::debug!(worker_id, "Queue drained, worker exiting");
            }));
        }

        handles
    }
}

/// Validate (and maybe enrich) one channel; never fails
async fn classify(
    worker_id: usize,
    channel: Channel,
    validator: &dyn Validator,
    enricher: Option<&NowPlayingEnricher>,
    stats: &PoolStats,
) -> Classified {
    let outcome = AssertUnwindSafe(validator.probe(&channel.url))
        .catch_unwind()
        .await;

    let failure = match outcome {
        Ok(Ok(())) => None,
        Ok(Err(failure)) => Some(failure),
        Err(panic) => {
            stats.panicked.fetch_add(1, Ordering::Relaxed);
            Some(ProbeFailure::Panicked(panic_message(panic.as_ref())))
        }
    };

    let verdict = Verdict::from(failure.is_none());

    let channel = match (verdict, enricher) {
        (Verdict::Valid, Some(enricher)) => {
            let lookup = AssertUnwindSafe(enricher.lookup(&channel.url))
                .catch_unwind()
                .await;
            match lookup {
                Ok(text) => {
                    if text != NOT_AVAILABLE {
                        stats.enriched.fetch_add(1, Ordering::Relaxed);
                    }
                    channel.with_playing_now(text)
                }
                Err(_) => channel,
            }
        }
        _ => channel,
    };

    Classified {
        worker_id,
        channel,
        verdict,
        failure,
    }
}

/// Collector task: sole owner of both result lists
async fn collect(mut result_rx: mpsc::Receiver<Classified>, expected: usize) -> SweepResult {
    let mut result = SweepResult {
        valid: Vec::with_capacity(expected),
        dead: Vec::new(),
    };

    while let Some(message) = result_rx.recv().await {
        match &message.failure {
            None => tracing::debug!(
                worker_id = message.worker_id,
                name = %message.channel.name,
                url = %message.channel.url,
                "Channel valid"
            ),
            Some(failure) => tracing::debug!(
                worker_id = message.worker_id,
                name = %message.channel.name,
                url = %message.channel.url,
                reason = %failure,
                kind = ?failure.kind(),
                "Channel dead"
            ),
        }
        result.push(message.channel, message.verdict);
    }

    result
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        String::from("unknown panic")
    }
}
