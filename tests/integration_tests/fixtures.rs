//! Test fixtures for integration tests
//!
//! Provides sample playlists, pages and mock-server helpers

use std::sync::Arc;
use std::time::Duration;

use iptv_sweep::catalog::{HttpCatalogFetcher, NowPlayingEnricher};
use iptv_sweep::pool::WorkerPool;
use iptv_sweep::scheduler::SweepScheduler;
use iptv_sweep::storage::ResultStore;
use iptv_sweep::validator::StreamValidator;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Media playlist with one bitrate-tagged segment
pub const LIVE_PLAYLIST: &str = "#EXTM3U
#EXT-X-VERSION:3
#EXT-X-TARGETDURATION:6
#EXT-X-MEDIA-SEQUENCE:120
#EXT-X-BITRATE:2400
#EXTINF:6.0,
seg120.ts
";

/// Landing page with a description
pub const LANDING_PAGE_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <meta name="description" content="Live: Evening Headlines">
    <title>Channel</title>
</head>
<body></body>
</html>
"#;

/// Extended M3U catalog listing `(name, path)` entries on `base`
pub fn catalog_body(base: &str, entries: &[(&str, &str)]) -> String {
    let mut body = String::from("#EXTM3U x-tvg-url=\"https://epg.example.com/guide.xml\"\n");
    for (name, route) in entries {
        body.push_str(&format!(
            "#EXTINF:-1 tvg-logo=\"https://img.example.com/logo.png\" group-title=\"General\",{name}\n{base}{route}\n"
        ));
    }
    body
}

/// Serve the catalog at `/index.m3u`
pub async fn mount_catalog(server: &MockServer, body: String) {
    Mock::given(method("GET"))
        .and(path("/index.m3u"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Serve a live HLS stream at `{prefix}/index.m3u8`
pub async fn mount_live_stream(server: &MockServer, prefix: &str) {
    Mock::given(method("GET"))
        .and(path(format!("{prefix}/index.m3u8")))
        .respond_with(ResponseTemplate::new(200).set_body_string(LIVE_PLAYLIST))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{prefix}/seg120.ts")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x47u8; 8192]))
        .mount(server)
        .await;
}

/// Scheduler pointed at `{server}/index.m3u` with short timeouts
pub fn scheduler_for(
    server: &MockServer,
    store: Arc<dyn ResultStore>,
    enrich: bool,
) -> SweepScheduler {
    let catalog = HttpCatalogFetcher::new(
        format!("{}/index.m3u", server.uri()),
        Duration::from_secs(5),
    )
    .unwrap();
    let validator =
        StreamValidator::with_settings(Duration::from_millis(500), Duration::from_secs(2))
            .unwrap();

    let mut pool = WorkerPool::new(Arc::new(validator), 3);
    if enrich {
        pool = pool.with_enricher(NowPlayingEnricher::new(Duration::from_secs(2)).unwrap());
    }

    SweepScheduler::new(Arc::new(catalog), pool, store, Duration::from_secs(3600))
}
