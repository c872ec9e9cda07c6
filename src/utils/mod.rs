//! Common utilities and helper functions
//!
//! This module provides shared utilities used across the application.

pub mod error;

use std::time::Duration;

/// Normalize whitespace in text
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate text to a maximum number of characters
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}

/// Whether a URI points at an HLS playlist, judged by its suffix
pub fn looks_like_hls(uri: &str) -> bool {
    if uri.ends_with(".m3u8") {
        return true;
    }

    url::Url::parse(uri)
        .map(|parsed| parsed.path().to_ascii_lowercase().ends_with(".m3u8"))
        .unwrap_or(false)
}

/// Format a duration as a short human-readable string
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;
    let secs = secs % 60;

    if hours > 0 {
        format!("{hours}h {mins}m {secs}s")
    } else if mins > 0 {
        format!("{mins}m {secs}s")
    } else {
        format!("{}ms", duration.as_millis())
    }
}
