use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::watch;

use iptv_sweep::config::Config;
use iptv_sweep::error::Error;
use iptv_sweep::metrics;
use iptv_sweep::scheduler::SweepScheduler;
use iptv_sweep::storage::JsonFileStore;
use iptv_sweep::utils::format_duration;

/// Run one sweep, or keep sweeping until Ctrl+C
pub async fn sweep(config: Config, once: bool) -> Result<()> {
    if let Err(e) = metrics::init_metrics() {
        tracing::warn!(error = %e, "Metrics disabled");
    }

    let store = JsonFileStore::open(&config.storage.data_dir)
        .await
        .context("Failed to open result store")?;
    let scheduler = SweepScheduler::from_config(&config, Arc::new(store))
        .context("Failed to create sweep scheduler")?;

    if once {
        let report = match scheduler.run_cycle().await {
            Ok(report) => report,
            Err(e) => {
                let err = Error::from(e);
                tracing::error!(
                    category = err.category().as_str(),
                    recoverable = err.is_recoverable(),
                    "Sweep failed"
                );
                return Err(err.into());
            }
        };

        println!("Sweep {} complete", report.sweep_id);
        println!("  Channels: {}", report.total);
        println!("  Valid:    {}", report.valid);
        println!("  Dead:     {}", report.dead);
        println!("  Duration: {}", format_duration(report.duration()));
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown requested; stopping after the current sweep");
            let _ = shutdown_tx.send(true);
        }
    });

    scheduler.run(shutdown_rx).await;
    Ok(())
}
