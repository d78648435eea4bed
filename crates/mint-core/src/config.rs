//! Configuration types for the mint dApp

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, NetworkId, Result};

/// Mint pricing and limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MintConfig {
    /// Price of one token in ether, as a decimal string (e.g., "0.05")
    #[serde(default = "default_unit_price")]
    pub unit_price_eth: String,

    /// Upper bound of the quantity stepper
    #[serde(default = "default_max_per_tx")]
    pub max_per_tx: u32,
}

fn default_unit_price() -> String {
    "0.05".to_string()
}

/// Most tokens a single purchase may request
pub const MAX_PER_TX_LIMIT: u32 = 20;

fn default_max_per_tx() -> u32 {
    MAX_PER_TX_LIMIT
}

impl Default for MintConfig {
    fn default() -> Self {
        Self {
            unit_price_eth: default_unit_price(),
            max_per_tx: default_max_per_tx(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server port
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Bind on all interfaces instead of loopback (for phones on the LAN)
    #[serde(default)]
    pub bind_all: bool,

    /// Network selected when the page first loads
    #[serde(default = "default_network")]
    pub default_network: NetworkId,

    /// Directory served under /media
    #[serde(default = "default_media_dir")]
    pub media_dir: PathBuf,

    /// Wallet app deep link prefix used on mobile without an injected wallet
    #[serde(default = "default_deep_link_base")]
    pub deep_link_base: String,

    #[serde(default)]
    pub mint: MintConfig,
}

fn default_api_port() -> u16 {
    5173
}

fn default_network() -> NetworkId {
    NetworkId::Optimism
}

fn default_media_dir() -> PathBuf {
    PathBuf::from("media")
}

fn default_deep_link_base() -> String {
    "https://metamask.app.link/dapp/".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_port: default_api_port(),
            bind_all: false,
            default_network: default_network(),
            media_dir: default_media_dir(),
            deep_link_base: default_deep_link_base(),
            mint: MintConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from a JSON file; missing fields take their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(raw).map_err(|e| Error::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.mint.max_per_tx == 0 {
            return Err(Error::Config("mint.max_per_tx must be at least 1".into()));
        }
        if self.mint.max_per_tx > MAX_PER_TX_LIMIT {
            return Err(Error::Config(format!(
                "mint.max_per_tx must be at most {MAX_PER_TX_LIMIT}"
            )));
        }
        if self.mint.unit_price_eth.trim().is_empty() {
            return Err(Error::Config("mint.unit_price_eth is empty".into()));
        }
        Ok(())
    }
}
