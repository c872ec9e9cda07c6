use anyhow::{Context, Result};

use iptv_sweep::config::Config;
use iptv_sweep::validator::{StreamValidator, Validator};

/// Probe one stream and print the verdict
pub async fn check(config: Config, url: String) -> Result<()> {
    let validator =
        StreamValidator::from_config(&config).context("Failed to create stream validator")?;

    match validator.probe(&url).await {
        Ok(()) => println!("valid  {url}"),
        Err(failure) => {
            println!("dead   {url}");
            println!("  Reason: {failure}");
            println!("  Kind:   {:?}", failure.kind());
        }
    }

    Ok(())
}
