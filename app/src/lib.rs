//! Mint dApp application library

use std::path::PathBuf;

use anyhow::Context;
use mint_api::AppState;
use mint_core::AppConfig;

/// Path of an optional JSON config file
pub const CONFIG_ENV: &str = "MINT_DAPP_CONFIG";
/// Overrides `api_port`
pub const PORT_ENV: &str = "MINT_DAPP_PORT";

/// Resolve configuration from the environment
pub fn load_config() -> anyhow::Result<AppConfig> {
    let mut config = match std::env::var_os(CONFIG_ENV) {
        Some(path) => {
            let path = PathBuf::from(path);
            tracing::info!("Loading config from {}", path.display());
            AppConfig::from_file(&path)?
        }
        None => AppConfig::default(),
    };

    if let Ok(port) = std::env::var(PORT_ENV) {
        config.api_port = port
            .parse()
            .with_context(|| format!("{PORT_ENV} is not a valid port: {port}"))?;
    }

    config.validate()?;
    Ok(config)
}

/// Run the mint server until it exits
pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mint_dapp=debug".parse()?)
                .add_directive("nft_mint=debug".parse()?)
                .add_directive("mint_api=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .init();

    tracing::info!("Starting mint dApp");

    let config = load_config()?;
    tracing::debug!("Config: {}", serde_json::to_string(&config)?);

    let state = AppState::new(config).context("invalid mint settings")?;
    state.controller().activate().await;

    mint_api::start_server(state)
        .await
        .context("HTTP server failed")?;
    Ok(())
}
