//! Extended M3U catalog parsing
//!
//! Channel lists such as the iptv-org index look like:
//!
//! ```text
//! #EXTM3U
//! #EXTINF:-1 tvg-id="News.us" group-title="News",World News HD
//! https://cdn.example.com/news/index.m3u8
//! ```
//!
//! Only the display name and the stream URI are kept.

use crate::models::Channel;

/// Extract the display name from an `#EXTINF` line
///
/// The name is everything after the first comma that is not inside a
/// quoted attribute value.
pub fn extinf_name(line: &str) -> Option<String> {
    let rest = line.strip_prefix("#EXTINF:")?;

    let mut in_quotes = false;
    for (idx, ch) in rest.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                let name = rest[idx + 1..].trim();
                return (!name.is_empty()).then(|| name.to_string());
            }
            _ => {}
        }
    }

    None
}

/// Parse an M3U catalog into channels, in catalog order
///
/// Entries without a URI are dropped. An entry whose `#EXTINF` has no
/// name is named after its URI. Bare URI lines without a preceding
/// `#EXTINF` are kept too.
pub fn parse_catalog(content: &str) -> Vec<Channel> {
    let mut channels = Vec::new();
    let mut pending_name: Option<Option<String>> = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with("#EXTINF:") {
            pending_name = Some(extinf_name(line));
            continue;
        }

        if line.starts_with('#') {
            continue;
        }

        let name = pending_name
            .take()
            .flatten()
            .unwrap_or_else(|| line.to_string());
        channels.push(Channel::new(name, line));
    }

    channels
}
