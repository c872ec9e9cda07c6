//! Configuration management for the sweep engine
//!
//! This module handles loading and validating configuration from environment variables,
//! TOML files, and built-in defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Public iptv-org index used when no catalog URL is configured
pub const DEFAULT_CATALOG_URL: &str = "https://iptv-org.github.io/iptv/index.m3u";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Sweep scheduling configuration
    pub sweep: SweepConfig,

    /// Stream validation configuration
    pub validator: ValidatorConfig,

    /// "Now playing" enrichment configuration
    pub enrichment: EnrichmentConfig,

    /// Result storage configuration
    pub storage: StorageConfig,

    /// Query server configuration
    pub server: ServerConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Sweep-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Catalog source URL
    pub catalog_url: String,

    /// Delay between sweeps in seconds
    pub interval_secs: u64,

    /// Number of concurrent validation workers
    pub workers: usize,

    /// Catalog download timeout in seconds
    pub catalog_timeout_secs: u64,
}

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Maximum time to receive the first chunk of a segment, in milliseconds
    pub stability_threshold_ms: u64,

    /// Size of the probed chunk in bytes
    pub probe_chunk_bytes: usize,

    /// User agent string
    pub user_agent: String,
}

/// Enrichment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// Look up "now playing" text for valid channels
    pub enabled: bool,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the sweep snapshot
    pub data_dir: PathBuf,
}

/// Query server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host
    pub host: String,

    /// Bind port
    pub port: u16,

    /// Records per page
    pub page_size: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let catalog_url = std::env::var("IPTV_SWEEP_CATALOG_URL")
            .unwrap_or_else(|_| defaults.sweep.catalog_url.clone());

        let user_agent = std::env::var("IPTV_SWEEP_USER_AGENT")
            .unwrap_or_else(|_| defaults.validator.user_agent.clone());

        let data_dir = std::env::var("IPTV_SWEEP_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| defaults.storage.data_dir.clone());

        let host =
            std::env::var("IPTV_SWEEP_HOST").unwrap_or_else(|_| defaults.server.host.clone());

        let log_level =
            std::env::var("IPTV_SWEEP_LOG_LEVEL").unwrap_or_else(|_| String::from("info"));

        let log_format =
            std::env::var("IPTV_SWEEP_LOG_FORMAT").unwrap_or_else(|_| String::from("text"));

        Ok(Self {
            sweep: SweepConfig {
                catalog_url,
                interval_secs: env_or("IPTV_SWEEP_INTERVAL", defaults.sweep.interval_secs),
                workers: env_or("IPTV_SWEEP_WORKERS", defaults.sweep.workers),
                catalog_timeout_secs: env_or(
                    "IPTV_SWEEP_CATALOG_TIMEOUT",
                    defaults.sweep.catalog_timeout_secs,
                ),
            },
            validator: ValidatorConfig {
                request_timeout_secs: env_or(
                    "IPTV_SWEEP_REQUEST_TIMEOUT",
                    defaults.validator.request_timeout_secs,
                ),
                stability_threshold_ms: env_or(
                    "IPTV_SWEEP_STABILITY_THRESHOLD_MS",
                    defaults.validator.stability_threshold_ms,
                ),
                probe_chunk_bytes: defaults.validator.probe_chunk_bytes,
                user_agent,
            },
            enrichment: EnrichmentConfig {
                enabled: env_or("IPTV_SWEEP_ENRICH", defaults.enrichment.enabled),
                timeout_secs: env_or(
                    "IPTV_SWEEP_ENRICH_TIMEOUT",
                    defaults.enrichment.timeout_secs,
                ),
            },
            storage: StorageConfig { data_dir },
            server: ServerConfig {
                host,
                port: env_or("IPTV_SWEEP_PORT", defaults.server.port),
                page_size: defaults.server.page_size,
            },
            logging: LoggingConfig {
                level: log_level,
                format: log_format,
            },
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.sweep.catalog_url)
            .with_context(|| format!("Invalid catalog_url: {}", self.sweep.catalog_url))?;

        if self.sweep.workers == 0 {
            anyhow::bail!("workers must be greater than 0");
        }

        if self.sweep.interval_secs == 0 {
            anyhow::bail!("interval_secs must be greater than 0");
        }

        if self.sweep.catalog_timeout_secs == 0 || self.validator.request_timeout_secs == 0 {
            anyhow::bail!("timeouts must be greater than 0");
        }

        if self.enrichment.enabled && self.enrichment.timeout_secs == 0 {
            anyhow::bail!("enrichment timeout_secs must be greater than 0");
        }

        if self.validator.stability_threshold_ms == 0 {
            anyhow::bail!("stability_threshold_ms must be greater than 0");
        }

        if self.server.page_size == 0 {
            anyhow::bail!("page_size must be greater than 0");
        }

        Ok(())
    }

    /// Delay between sweeps
    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep.interval_secs)
    }

    /// Catalog download timeout
    #[must_use]
    pub fn catalog_timeout(&self) -> Duration {
        Duration::from_secs(self.sweep.catalog_timeout_secs)
    }

    /// Per-request validation timeout
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.validator.request_timeout_secs)
    }

    /// First-chunk stability threshold
    #[must_use]
    pub fn stability_threshold(&self) -> Duration {
        Duration::from_millis(self.validator.stability_threshold_ms)
    }

    /// Enrichment request timeout
    #[must_use]
    pub fn enrichment_timeout(&self) -> Duration {
        Duration::from_secs(self.enrichment.timeout_secs)
    }

    /// Address the query server binds to
    pub fn bind_address(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .with_context(|| {
                format!(
                    "Invalid bind address: {}:{}",
                    self.server.host, self.server.port
                )
            })
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            catalog_url: String::from(DEFAULT_CATALOG_URL),
            interval_secs: 3 * 60 * 60,
            workers: 5,
            catalog_timeout_secs: 60,
        }
    }
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 15,
            stability_threshold_ms: 5_000,
            probe_chunk_bytes: 1024,
            user_agent: format!("iptv-sweep/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_secs: 10,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 40006,
            page_size: 15,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sweep: SweepConfig::default(),
            validator: ValidatorConfig::default(),
            enrichment: EnrichmentConfig::default(),
            storage: StorageConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
