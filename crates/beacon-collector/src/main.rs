//! Standalone mock collector.
//!
//! Listens until Ctrl-C, then prints every captured request as one JSON
//! object per line on stdout.

#![forbid(unsafe_code)]

use anyhow::Context;
use beacon_collector::{CollectorConfig, MockCollector, telemetry};
use beacon_core::RequestLog;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CollectorConfig::from_env().context("failed to load collector configuration")?;
    config.validate()?;
    telemetry::init_tracing(config.log_format).context("failed to initialize tracing")?;

    let log = RequestLog::new();
    let collector = MockCollector::start(&config, log.clone()).await?;

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    tracing::info!(entries = log.len(), "shutting down collector");
    collector.shutdown().await?;

    let dump = log.to_json_lines();
    if !dump.is_empty() {
        println!("{dump}");
    }
    Ok(())
}
