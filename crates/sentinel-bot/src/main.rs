//! Market-anomaly detector - Entry Point

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Real-time anomaly detector for decentralized spot-market trading activity.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {}

#[tokio::main]
async fn main() -> Result<()> {
    sentinel_telemetry::init_logging()?;

    let _args = Args::parse();

    info!("starting sentinel-bot v{}", env!("CARGO_PKG_VERSION"));

    let config = sentinel_bot::AppConfig::from_env()?;
    let app = sentinel_bot::Application::new(config).await?;
    app.run().await;

    Ok(())
}
