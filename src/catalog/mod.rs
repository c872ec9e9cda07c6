//! Channel catalog retrieval
//!
//! The catalog is an extended M3U list of channels downloaded at the start
//! of every sweep. Failure to obtain it aborts the whole sweep.

pub mod enrich;
pub mod m3u;

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::config::Config;
use crate::models::Channel;
use crate::utils::error::CatalogError;

pub use enrich::NowPlayingEnricher;
pub use m3u::parse_catalog;

/// Supplies the channel list for a sweep
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the full catalog
    async fn fetch_catalog(&self) -> Result<Vec<Channel>, CatalogError>;
}

/// Downloads and parses an M3U catalog over HTTP
pub struct HttpCatalogFetcher {
    /// HTTP client with configured timeout and compression
    client: Client,

    /// Catalog location
    source_url: String,
}

impl HttpCatalogFetcher {
    /// Create a fetcher for the given catalog URL
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Http` if the HTTP client cannot be created
    pub fn new(source_url: impl Into<String>, timeout: Duration) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .user_agent(format!("iptv-sweep/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            source_url: source_url.into(),
        })
    }

    /// Create a fetcher from application configuration
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Http` if the HTTP client cannot be created
    pub fn from_config(config: &Config) -> Result<Self, CatalogError> {
        Self::new(config.sweep.catalog_url.clone(), config.catalog_timeout())
    }

    /// Catalog location
    pub fn source_url(&self) -> &str {
        &self.source_url
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogFetcher {
    async fn fetch_catalog(&self) -> Result<Vec<Channel>, CatalogError> {
        tracing::debug!(url = %self.source_url, "Fetching catalog");

        let response = self
            .client
            .get(&self.source_url)
            .send()
            .await
            .map_err(CatalogError::from_request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(CatalogError::from_request)?;
        if !body.trim_start_matches('\u{feff}').trim_start().starts_with("#EXTM3U") {
            return Err(CatalogError::Parse("missing #EXTM3U header".to_string()));
        }
        let channels = parse_catalog(&body);

        tracing::info!(url = %self.source_url, channels = channels.len(), "Catalog fetched");
        Ok(channels)
    }
}

/// Fixed in-memory catalog
pub struct StaticCatalog {
    channels: Vec<Channel>,
}

impl StaticCatalog {
    pub fn new(channels: Vec<Channel>) -> Self {
        Self { channels }
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn fetch_catalog(&self) -> Result<Vec<Channel>, CatalogError> {
        Ok(self.channels.clone())
    }
}
