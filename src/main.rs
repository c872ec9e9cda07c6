use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use iptv_sweep::config::Config;

mod commands;

#[derive(Parser)]
#[command(
    name = "iptv-sweep",
    version,
    about = "Periodic IPTV channel sweep and validation engine",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file (defaults to environment variables)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); overrides the configured format
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the sweep scheduler and the query API
    Serve {
        /// Override bind port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run sweeps without the query API
    Sweep {
        /// Run a single sweep and exit
        #[arg(long, default_value = "false")]
        once: bool,
    },

    /// Validate a single stream URL
    Check {
        /// Stream URL
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    config.validate()?;

    let log_format = cli
        .log_format
        .clone()
        .unwrap_or_else(|| config.logging.format.clone());
    setup_tracing(&log_format, &config.logging.level, cli.verbose)?;

    tracing::info!("iptv-sweep starting");

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            tracing::info!(
                catalog = %config.sweep.catalog_url,
                workers = config.sweep.workers,
                port = config.server.port,
                "Starting serve command"
            );
            commands::serve(config).await?;
        }

        Commands::Sweep { once } => {
            tracing::info!(once = %once, "Starting sweep command");
            commands::sweep(config, once).await?;
        }

        Commands::Check { url } => {
            tracing::info!(url = %url, "Starting check command");
            commands::check(config, url).await?;
        }
    }

    tracing::info!("iptv-sweep completed successfully");
    Ok(())
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("iptv_sweep=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("iptv_sweep={level},warn")))
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}
