//! Application state shared across API handlers

use std::sync::Arc;
use std::time::Duration;

use mint_core::AppConfig;
use nft_mint::{MintController, MintSettings, NetworkRegistry};
use tokio::sync::RwLock;

use crate::bridge::BridgeWallet;
use crate::gallery::Gallery;

/// How long `/bridge/poll` holds the connection open with nothing queued
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(25);

pub type Controller = MintController<BridgeWallet>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    bridge: BridgeWallet,
    controller: Arc<Controller>,
    gallery: RwLock<Gallery>,
    poll_timeout: Duration,
}

impl AppState {
    /// Build the controller over a fresh bridge
    pub fn new(config: AppConfig) -> mint_core::Result<Self> {
        Self::with_poll_timeout(config, DEFAULT_POLL_TIMEOUT)
    }

    pub fn with_poll_timeout(config: AppConfig, poll_timeout: Duration) -> mint_core::Result<Self> {
        let settings = MintSettings::from_config(&config)?;
        let registry = Arc::new(NetworkRegistry::load());
        let bridge = BridgeWallet::new();
        let controller = Arc::new(MintController::new(
            Arc::new(bridge.clone()),
            registry,
            settings,
        ));

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                bridge,
                controller,
                gallery: RwLock::new(Gallery::default()),
                poll_timeout,
            }),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn bridge(&self) -> &BridgeWallet {
        &self.inner.bridge
    }

    pub fn controller(&self) -> &Arc<Controller> {
        &self.inner.controller
    }

    pub fn gallery(&self) -> &RwLock<Gallery> {
        &self.inner.gallery
    }

    pub fn poll_timeout(&self) -> Duration {
        self.inner.poll_timeout
    }
}
