//! Carnival Wallet service entry point

use std::path::PathBuf;

use anyhow::Context;
use carnival_api::{start_server, AppState};
use carnival_core::AppConfig;

/// Config file: `CARNIVAL_CONFIG`, else defaults
fn load_config() -> anyhow::Result<AppConfig> {
    let mut config = match std::env::var_os("CARNIVAL_CONFIG").map(PathBuf::from) {
        Some(path) => AppConfig::from_file(&path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => AppConfig::default(),
    };
    config.apply_env().context("applying environment overrides")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("carnival=debug".parse()?)
                .add_directive("transfer=debug".parse()?)
                .add_directive("wallet_api_client=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .init();

    tracing::info!("Starting Carnival Wallet");

    let config = load_config()?;
    tracing::info!(
        wallet_api = %config.api.base_url,
        port = config.api_port,
        default_chain_id = config.default_chain_id,
        "Configuration loaded"
    );

    let port = config.api_port;
    let state = AppState::new(config).context("creating wallet API client")?;
    start_server(state, port).await.context("API server failed")?;

    Ok(())
}
