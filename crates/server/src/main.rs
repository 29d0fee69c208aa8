use anyhow::Context;
use std::path::Path;
use tracing_subscriber::EnvFilter;

use hermes_server::config;

const DEFAULT_CONFIG_PATH: &str = "hermes.yml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::load(Path::new(DEFAULT_CONFIG_PATH)).context("loading configuration")?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.log.json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "hermes server starting");
    hermes_server::run::run(config).await
}
