//! Headless simulation server.
//!
//! Reads `REALM_*` settings (and `.env`), loads the data directory and ticks the
//! world until interrupted.
use anyhow::Result;

use realm_runtime::{Runtime, RuntimeConfig, logging};

#[tokio::main]
async fn main() -> Result<()> {
    let config = RuntimeConfig::from_env();
    let _guard = logging::init(config.log_dir.as_deref())?;

    tracing::info!("Starting realm");
    match &config.data_dir {
        Some(dir) => tracing::info!("Data directory: {}", dir.display()),
        None => tracing::warn!("REALM_DATA_DIR not set, starting with an empty world"),
    }

    let runtime = Runtime::start(config).await?;
    let handle = runtime.handle();
    for id in handle.area_ids().await? {
        tracing::info!(area = %id, "area ready");
    }

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    runtime.shutdown().await?;
    Ok(())
}
