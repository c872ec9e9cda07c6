// Core data structures for the sweep engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Placeholder used when no "now playing" text could be found
pub const NOT_AVAILABLE: &str = "Not available";

/// A single catalog entry, rebuilt from scratch every sweep
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Display name (not necessarily unique)
    pub name: String,

    /// Stream URI
    pub url: String,

    /// Best-effort "currently playing" text
    #[serde(default = "default_playing_now")]
    pub playing_now: String,
}

fn default_playing_now() -> String {
    NOT_AVAILABLE.to_string()
}

impl Channel {
    /// Create a channel with no enrichment yet
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            playing_now: default_playing_now(),
        }
    }

    /// Attach "now playing" text
    #[must_use]
    pub fn with_playing_now(mut self, playing_now: impl Into<String>) -> Self {
        self.playing_now = playing_now.into();
        self
    }

    /// Case-insensitive substring match on the channel name
    pub fn name_matches(&self, needle_lower: &str) -> bool {
        self.name.to_lowercase().contains(needle_lower)
    }
}

/// Classification of a channel for one sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Reachable and minimally stable
    Valid,
    /// Anything else
    Dead,
}

impl Verdict {
    /// Label used in logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Dead => "dead",
        }
    }
}

impl From<bool> for Verdict {
    fn from(ok: bool) -> Self {
        if ok {
            Self::Valid
        } else {
            Self::Dead
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of one sweep: every enqueued channel lands in exactly one list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepResult {
    pub valid: Vec<Channel>,
    pub dead: Vec<Channel>,
}

impl SweepResult {
    /// Total number of channels classified
    pub fn total(&self) -> usize {
        self.valid.len() + self.dead.len()
    }

    /// Route a channel into the list matching its verdict
    pub fn push(&mut self, channel: Channel, verdict: Verdict) {
        match verdict {
            Verdict::Valid => self.valid.push(channel),
            Verdict::Dead => self.dead.push(channel),
        }
    }
}

/// Summary of a completed sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    /// Unique id of this sweep
    pub sweep_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub total: usize,
    pub valid: usize,
    pub dead: usize,
}

impl SweepReport {
    /// Wall-clock duration of the sweep
    pub fn duration(&self) -> Duration {
        (self.finished_at - self.started_at)
            .to_std()
            .unwrap_or_default()
    }

    /// Share of valid channels (0.0 - 1.0)
    pub fn valid_ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.valid as f64 / self.total as f64
    }
}
