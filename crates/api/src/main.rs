//! Bearing Health Service - Main Entry Point

use anyhow::Context;
use api::{init_logging, run_server, ServiceConfig};
use std::path::PathBuf;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Optional TOML config path; BEARING__* variables override it
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = ServiceConfig::load(config_path.as_deref())
        .context("loading service configuration")?;

    init_logging(&config.log_level, config.log_json);
    info!("=== Bearing Health Service v{} ===", env!("CARGO_PKG_VERSION"));

    run_server(config).await
}
