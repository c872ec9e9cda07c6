//! HLS media playlist inspection
//!
//! Only the first media segment matters to the liveness probe: it must exist,
//! carry an `EXT-X-BITRATE` hint, and resolve to an absolute URL.

use m3u8_rs::{ExtTag, MediaSegment, Playlist};
use url::Url;

use super::ProbeFailure;

/// Bitrate of a segment, from the `EXT-X-BITRATE` tag preceding it
pub fn segment_bitrate(segment: &MediaSegment) -> Option<u64> {
    bitrate_hint(&segment.unknown_tags)
}

fn bitrate_hint(tags: &[ExtTag]) -> Option<u64> {
    tags.iter()
        .filter(|t| t.tag.trim_start_matches("EXT-") == "X-BITRATE")
        .filter_map(|t| t.rest.as_deref())
        .filter_map(|rest| rest.trim().parse::<f64>().ok())
        .find(|kbps| *kbps > 0.0)
        .map(|kbps| kbps as u64)
}

/// Parse a playlist body and resolve the URL of its first media segment
///
/// # Errors
///
/// - `PlaylistParse` if the body is not a playlist at all
/// - `EmptyPlaylist` if there are no media segments (master playlists included)
/// - `MissingBitrate` if the first segment has no bitrate hint
/// - `InvalidUrl` if the segment URI cannot be resolved
pub fn first_segment_url(body: &[u8], playlist_url: &Url) -> Result<Url, ProbeFailure> {
    let playlist = m3u8_rs::parse_playlist_res(body)
        .map_err(|e| ProbeFailure::PlaylistParse(e.to_string()))?;

    let media = match playlist {
        Playlist::MediaPlaylist(media) => media,
        Playlist::MasterPlaylist(_) => return Err(ProbeFailure::EmptyPlaylist),
    };

    let first = media.segments.first().ok_or(ProbeFailure::EmptyPlaylist)?;

    // A hint ahead of the first segment may be filed at playlist level
    if segment_bitrate(first)
        .or_else(|| bitrate_hint(&media.unknown_tags))
        .is_none()
    {
        return Err(ProbeFailure::MissingBitrate);
    }

    playlist_url
        .join(first.uri.trim())
        .map_err(|e| ProbeFailure::InvalidUrl(format!("{}: {e}", first.uri)))
}
