//! Best-effort "now playing" enrichment
//!
//! Some channel URIs serve an HTML landing page whose
//! `<meta name="description">` says what is on air. Anything else yields
//! [`NOT_AVAILABLE`]. This lookup never affects a channel's verdict.

use lazy_static::lazy_static;
use reqwest::{header::CONTENT_TYPE, Client, StatusCode};
use scraper::{Html, Selector};
use std::time::Duration;

use crate::models::NOT_AVAILABLE;
use crate::utils::{normalize_whitespace, truncate_text};

lazy_static! {
    static ref META_DESCRIPTION: Selector =
        Selector::parse(r#"meta[name="description"]"#).expect("Invalid CSS selector");
}

/// Longest description kept, in characters
const MAX_DESCRIPTION_CHARS: usize = 200;

/// Largest page inspected, in bytes
const MAX_PAGE_BYTES: usize = 512 * 1024;

/// Extract the meta description from an HTML document
pub fn extract_description(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let content = document
        .select(&META_DESCRIPTION)
        .find_map(|el| el.value().attr("content"))?;

    let text = normalize_whitespace(content);
    (!text.is_empty()).then(|| truncate_text(&text, MAX_DESCRIPTION_CHARS))
}

/// Looks up "now playing" text for a channel
#[derive(Clone)]
pub struct NowPlayingEnricher {
    client: Client,
}

impl NowPlayingEnricher {
    /// Create an enricher with the given request timeout
    ///
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the HTTP client cannot be created
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(format!("iptv-sweep/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .gzip(true)
            .build()?;

        Ok(Self { client })
    }

    /// Look up "now playing" text, falling back to [`NOT_AVAILABLE`]
    pub async fn lookup(&self, url: &str) -> String {
        match self.try_lookup(url).await {
            Some(text) => text,
            None => NOT_AVAILABLE.to_string(),
        }
    }

    async fn try_lookup(&self, url: &str) -> Option<String> {
        let mut response = self.client.get(url).send().await.ok()?;
        if response.status() != StatusCode::OK {
            return None;
        }

        // Stream bodies are not worth downloading
        let is_html = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.to_ascii_lowercase().contains("html"))
            .unwrap_or(false);
        if !is_html {
            return None;
        }

        // Only the head of the page is read, whatever the framing
        let mut body = Vec::new();
        while body.len() < MAX_PAGE_BYTES {
            match response.chunk().await.ok()? {
                Some(chunk) => {
                    let room = MAX_PAGE_BYTES - body.len();
                    body.extend_from_slice(&chunk[..chunk.len().min(room)]);
                }
                None => break,
            }
        }

        extract_description(&String::from_utf8_lossy(&body))
    }
}
