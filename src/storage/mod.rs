//! Sweep result persistence
//!
//! The store holds exactly one snapshot: the valid and dead lists of the
//! latest completed sweep. A new sweep replaces both lists at once; readers
//! see either the old snapshot or the new one, never a mix.
//!
//! - [`MemoryStore`] keeps the snapshot in memory only.
//! - [`JsonFileStore`] also writes it to `sweep.json` (temp file + rename)
//!   and reloads it at startup.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::models::Channel;
use crate::utils::error::StoreError;

/// Snapshot file name inside the data directory
pub const SNAPSHOT_FILE: &str = "sweep.json";

/// Both result lists of one sweep
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// When the sweep that produced this snapshot finished
    pub generated_at: Option<DateTime<Utc>>,
    pub valid: Vec<Channel>,
    pub dead: Vec<Channel>,
}

/// Durable destination of sweep results
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Replace both lists with a new cycle's results
    async fn write_cycle(&self, valid: Vec<Channel>, dead: Vec<Channel>)
        -> Result<(), StoreError>;

    /// Current snapshot
    async fn snapshot(&self) -> Arc<Snapshot>;

    /// Valid channels of the latest sweep
    async fn read_valid(&self) -> Vec<Channel> {
        self.snapshot().await.valid.clone()
    }

    /// Dead channels of the latest sweep
    async fn read_dead(&self) -> Vec<Channel> {
        self.snapshot().await.dead.clone()
    }

    /// When the current snapshot was written
    async fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.snapshot().await.generated_at
    }
}

// ============================================================================
// Query helpers
// ============================================================================

/// One page of records, 1-indexed; out-of-range pages are empty
pub fn paginate(records: &[Channel], page: usize, page_size: usize) -> &[Channel] {
    if page == 0 || page_size == 0 {
        return &[];
    }

    let start = match (page - 1).checked_mul(page_size) {
        Some(start) if start < records.len() => start,
        _ => return &[],
    };
    let end = start.saturating_add(page_size).min(records.len());

    &records[start..end]
}

/// Records whose name contains `query`, ignoring case
pub fn search(records: &[Channel], query: &str) -> Vec<Channel> {
    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|c| c.name_matches(&needle))
        .cloned()
        .collect()
}

// ============================================================================
// Memory store
// ============================================================================

/// In-memory result store
#[derive(Default)]
pub struct MemoryStore {
    current: RwLock<Arc<Snapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResultStore for MemoryStore {
    async fn write_cycle(
        &self,
        valid: Vec<Channel>,
        dead: Vec<Channel>,
    ) -> Result<(), StoreError> {
        let snapshot = Arc::new(Snapshot {
            generated_at: Some(Utc::now()),
            valid,
            dead,
        });
        *self.current.write().await = snapshot;
        Ok(())
    }

    async fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&*self.current.read().await)
    }
}

// ============================================================================
// JSON file store
// ============================================================================

/// Result store backed by a single JSON snapshot file
pub struct JsonFileStore {
    path: PathBuf,
    current: RwLock<Arc<Snapshot>>,
}

impl JsonFileStore {
    /// Open the store in `data_dir`, loading an existing snapshot if present
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the directory cannot be created or the
    /// snapshot cannot be read, and `StoreError::CorruptSnapshot` if it
    /// cannot be parsed.
    pub async fn open(data_dir: &Path) -> Result<Self, StoreError> {
        tokio::fs::create_dir_all(data_dir)
            .await
            .map_err(|e| StoreError::io("create data directory", e))?;

        let path = data_dir.join(SNAPSHOT_FILE);
        let snapshot = if tokio::fs::try_exists(&path)
            .await
            .map_err(|e| StoreError::io("check snapshot", e))?
        {
            let bytes = tokio::fs::read(&path)
                .await
                .map_err(|e| StoreError::io("read snapshot", e))?;
            let snapshot: Snapshot =
                serde_json::from_slice(&bytes).map_err(|e| StoreError::CorruptSnapshot {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;
            tracing::info!(
                path = %path.display(),
                valid = snapshot.valid.len(),
                dead = snapshot.dead.len(),
                "Loaded previous sweep snapshot"
            );
            snapshot
        } else {
            Snapshot::default()
        };

        Ok(Self {
            path,
            current: RwLock::new(Arc::new(snapshot)),
        })
    }

    /// Snapshot file location
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(snapshot)?;

        // Write to temp file first, then rename (atomic)
        let temp_path = self.path.with_extension("json.tmp");
        let mut file = tokio::fs::File::create(&temp_path)
            .await
            .map_err(|e| StoreError::io("create temp snapshot", e))?;
        file.write_all(&bytes)
            .await
            .map_err(|e| StoreError::io("write temp snapshot", e))?;
        file.sync_all()
            .await
            .map_err(|e| StoreError::io("sync temp snapshot", e))?;
        drop(file);

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| StoreError::io("rename snapshot", e))?;

        tracing::debug!(path = %self.path.display(), bytes = bytes.len(), "Snapshot saved");
        Ok(())
    }
}

#[async_trait]
impl ResultStore for JsonFileStore {
    async fn write_cycle(
        &self,
        valid: Vec<Channel>,
        dead: Vec<Channel>,
    ) -> Result<(), StoreError> {
        let snapshot = Snapshot {
            generated_at: Some(Utc::now()),
            valid,
            dead,
        };

        // Hold the write lock across the file swap so memory and disk agree
        let mut current = self.current.write().await;
        self.persist(&snapshot).await?;
        *current = Arc::new(snapshot);
        Ok(())
    }

    async fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&*self.current.read().await)
    }
}
