use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::watch;

use iptv_sweep::config::Config;
use iptv_sweep::metrics;
use iptv_sweep::scheduler::SweepScheduler;
use iptv_sweep::server::{self, AppState};
use iptv_sweep::storage::JsonFileStore;

/// Run the sweep scheduler alongside the query API
pub async fn serve(config: Config) -> Result<()> {
    if let Err(e) = metrics::init_metrics() {
        tracing::warn!(error = %e, "Metrics disabled");
    }

    let addr = config.bind_address()?;
    let store = JsonFileStore::open(&config.storage.data_dir)
        .await
        .context("Failed to open result store")?;
    let scheduler = Arc::new(
        SweepScheduler::from_config(&config, Arc::new(store))
            .context("Failed to create sweep scheduler")?,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let sweeper = {
        let scheduler = Arc::clone(&scheduler);
        let shutdown_rx = shutdown_rx.clone();
        tokio::spawn(async move { scheduler.run(shutdown_rx).await })
    };

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown requested");
            let _ = shutdown_tx.send(true);
        }
    });

    let mut server_shutdown = shutdown_rx;
    let state = AppState::new(scheduler, config.server.page_size);
    server::serve(addr, state, async move {
        let _ = server_shutdown.wait_for(|stop| *stop).await;
    })
    .await?;

    tracing::info!("Waiting for the scheduler to stop");
    sweeper.await.context("Scheduler task failed")?;

    Ok(())
}
