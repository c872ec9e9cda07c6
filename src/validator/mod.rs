//! Stream liveness validation
//!
//! A stream is checked with a short sequence of network probes, each one
//! able to condemn the channel on its own:
//!
//! 1. `GET` the stream URI; anything but `200 OK` is dead.
//! 2. HLS playlists only (`.m3u8` suffix):
//!    - the playlist must contain at least one media segment,
//!    - the first segment must carry a bitrate hint,
//!    - `GET` of the first segment must answer `200 OK`,
//!    - a second, streamed `GET` must deliver its first chunk within the
//!      stability threshold.
//! 3. Non-HLS streams are valid once step 1 passes.
//!
//! The probe is shallow on purpose. Slow-but-fine streams can come out dead.
//!
//! Failures are reported as [`ProbeFailure`] so callers can log the reason,
//! while [`Validator::validate`] collapses everything to a boolean.

pub mod hls;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use url::Url;

use crate::config::Config;
use crate::utils::looks_like_hls;

/// Why a stream was classified as dead
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProbeFailure {
    /// URI could not be parsed or resolved
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Request exceeded its timeout
    #[error("Request timed out")]
    Timeout,

    /// Connection-level failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Stream URI answered with a non-200 status
    #[error("Stream returned status {status}")]
    Unreachable { status: u16 },

    /// Playlist body could not be parsed
    #[error("Failed to parse playlist: {0}")]
    PlaylistParse(String),

    /// Playlist has no media segments
    #[error("Playlist has no segments")]
    EmptyPlaylist,

    /// First segment has no bitrate hint
    #[error("First segment has no bitrate information")]
    MissingBitrate,

    /// First segment answered with a non-200 status
    #[error("Segment returned status {status}")]
    SegmentUnreachable { status: u16 },

    /// First chunk took longer than the stability threshold
    #[error("First chunk took {elapsed:?}, threshold is {threshold:?}")]
    Unstable {
        elapsed: Duration,
        threshold: Duration,
    },

    /// Validation task panicked
    #[error("Validation panicked: {0}")]
    Panicked(String),
}

/// Coarse grouping of probe failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Stream or segment could not be reached
    Reachability,
    /// Stream description is malformed
    MalformedContent,
    /// Stream is reachable but too slow
    Instability,
    /// Internal failure in the checker itself
    Internal,
}

impl ProbeFailure {
    /// Classify this failure
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::InvalidUrl(_)
            | Self::Timeout
            | Self::Transport(_)
            | Self::Unreachable { .. }
            | Self::SegmentUnreachable { .. } => FailureKind::Reachability,
            Self::PlaylistParse(_) | Self::EmptyPlaylist | Self::MissingBitrate => {
                FailureKind::MalformedContent
            }
            Self::Unstable { .. } => FailureKind::Instability,
            Self::Panicked(_) => FailureKind::Internal,
        }
    }

    fn from_request(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_builder() {
            Self::InvalidUrl(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Produces a verdict for a single stream URI
#[async_trait]
pub trait Validator: Send + Sync {
    /// Run the probe sequence, reporting the first failure
    async fn probe(&self, uri: &str) -> Result<(), ProbeFailure>;

    /// `true` when the stream is reachable and minimally stable
    async fn validate(&self, uri: &str) -> bool {
        self.probe(uri).await.is_ok()
    }
}

/// HTTP stream validator
pub struct StreamValidator {
    /// HTTP client shared by all probes
    client: Client,

    /// Timeout applied to every request
    timeout: Duration,

    /// Maximum time to receive the first chunk of a segment
    stability_threshold: Duration,

    /// How many bytes count as "the first chunk"
    probe_chunk_bytes: usize,
}

impl StreamValidator {
    /// Default per-request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

    /// Default first-chunk threshold
    pub const DEFAULT_STABILITY_THRESHOLD: Duration = Duration::from_secs(5);

    /// Create a validator with default settings
    ///
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the HTTP client cannot be created
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_settings(Self::DEFAULT_TIMEOUT, Self::DEFAULT_STABILITY_THRESHOLD)
    }

    /// Create a validator with custom timeout and stability threshold
    ///
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the HTTP client cannot be created
    pub fn with_settings(
        timeout: Duration,
        stability_threshold: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(format!("iptv-sweep/{}", env!("CARGO_PKG_VERSION")))
            .connect_timeout(timeout)
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            timeout,
            stability_threshold,
            probe_chunk_bytes: 1024,
        })
    }

    /// Create a validator from application configuration
    ///
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the HTTP client cannot be created
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let timeout = config.request_timeout();
        let client = Client::builder()
            .user_agent(&config.validator.user_agent)
            .connect_timeout(timeout)
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            timeout,
            stability_threshold: config.stability_threshold(),
            probe_chunk_bytes: config.validator.probe_chunk_bytes.max(1),
        })
    }

    /// Configured stability threshold
    pub fn stability_threshold(&self) -> Duration {
        self.stability_threshold
    }

    async fn get(&self, url: &Url) -> Result<Response, ProbeFailure> {
        self.client
            .get(url.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(ProbeFailure::from_request)
    }

    /// Fetch the segment, then time a second streamed fetch of its first chunk
    async fn probe_segment(&self, segment_url: &Url) -> Result<(), ProbeFailure> {
        let response = self.get(segment_url).await?;
        if response.status() != StatusCode::OK {
            return Err(ProbeFailure::SegmentUnreachable {
                status: response.status().as_u16(),
            });
        }
        drop(response);

        let started = Instant::now();
        let mut response = self.get(segment_url).await?;
        let mut received = 0usize;
        while received < self.probe_chunk_bytes {
            match response.chunk().await.map_err(ProbeFailure::from_request)? {
                Some(chunk) => received += chunk.len(),
                None => break,
            }
        }
        let elapsed = started.elapsed();

        tracing::trace!(url = %segment_url, received, elapsed_ms = elapsed.as_millis() as u64, "First chunk received");

        if elapsed > self.stability_threshold {
            return Err(ProbeFailure::Unstable {
                elapsed,
                threshold: self.stability_threshold,
            });
        }

        Ok(())
    }
}

#[async_trait]
impl Validator for StreamValidator {
    async fn probe(&self, uri: &str) -> Result<(), ProbeFailure> {
        let url = Url::parse(uri).map_err(|e| ProbeFailure::InvalidUrl(format!("{uri}: {e}")))?;

        let response = self.get(&url).await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(ProbeFailure::Unreachable {
                status: status.as_u16(),
            });
        }

        if !looks_like_hls(uri) {
            return Ok(());
        }

        // Redirects move the base for relative segment URIs
        let playlist_url = response.url().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| ProbeFailure::PlaylistParse(e.to_string()))?;

        let segment_url = hls::first_segment_url(&body, &playlist_url)?;
        tracing::trace!(stream = %uri, segment = %segment_url, "Probing first segment");

        self.probe_segment(&segment_url).await
    }
}
