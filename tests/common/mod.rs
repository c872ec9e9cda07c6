//! Common test utilities

use iptv_sweep::models::Channel;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Media playlist whose first segment carries a bitrate hint
#[allow(dead_code)]
pub fn hls_playlist(segment_uri: &str) -> String {
    format!(
        "#EXTM3U\n\
         #EXT-X-VERSION:3\n\
         #EXT-X-TARGETDURATION:6\n\
         #EXT-X-MEDIA-SEQUENCE:0\n\
         #EXT-X-BITRATE:1500\n\
         #EXTINF:6.0,\n\
         {segment_uri}\n\
         #EXTINF:6.0,\n\
         next.ts\n"
    )
}

/// Media playlist with no segments
#[allow(dead_code)]
pub fn empty_playlist() -> String {
    "#EXTM3U\n#EXT-X-VERSION:3\n#EXT-X-TARGETDURATION:6\n#EXT-X-MEDIA-SEQUENCE:0\n".to_string()
}

/// A segment body larger than the probe chunk
#[allow(dead_code)]
pub fn segment_bytes() -> Vec<u8> {
    vec![0x47; 4096]
}

/// Serve a healthy HLS stream at `{prefix}/index.m3u8` with segment `{prefix}/seg0.ts`
#[allow(dead_code)]
pub async fn mount_hls_stream(server: &MockServer, prefix: &str) {
    Mock::given(method("GET"))
        .and(path(format!("{prefix}/index.m3u8")))
        .respond_with(ResponseTemplate::new(200).set_body_string(hls_playlist("seg0.ts")))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{prefix}/seg0.ts")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(segment_bytes()))
        .mount(server)
        .await;
}

/// Build an extended M3U catalog from channels
#[allow(dead_code)]
pub fn m3u_catalog(channels: &[Channel]) -> String {
    let mut out = String::from("#EXTM3U\n");
    for channel in channels {
        out.push_str(&format!(
            "#EXTINF:-1 tvg-id=\"{}\" group-title=\"Test\",{}\n{}\n",
            channel.name.to_lowercase().replace(' ', ""),
            channel.name,
            channel.url
        ));
    }
    out
}
