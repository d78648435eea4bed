//! EIP-1193 method names, error codes, and request payloads

use mint_core::{ChainId, NativeCurrency, NetworkDescriptor};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// JSON-RPC methods the dApp issues against the injected provider
pub mod methods {
    pub const ETH_REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
    pub const ETH_ACCOUNTS: &str = "eth_accounts";
    pub const ETH_CHAIN_ID: &str = "eth_chainId";
    pub const ETH_SEND_TRANSACTION: &str = "eth_sendTransaction";
    pub const WALLET_SWITCH_ETHEREUM_CHAIN: &str = "wallet_switchEthereumChain";
    pub const WALLET_ADD_ETHEREUM_CHAIN: &str = "wallet_addEthereumChain";
}

/// Provider error codes (EIP-1193 and EIP-1474)
pub mod codes {
    pub const USER_REJECTED: i64 = 4001;
    pub const DISCONNECTED: i64 = 4900;
    /// MetaMask: chain has not been added to the wallet
    pub const UNRECOGNIZED_CHAIN: i64 = 4902;
    pub const INTERNAL_ERROR: i64 = -32603;
}

/// Error object returned by a provider request
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("provider error {code}: {message}")]
pub struct ProviderError {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ProviderError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn user_rejected() -> Self {
        Self::new(codes::USER_REJECTED, "User rejected the request.")
    }

    pub fn disconnected(message: impl Into<String>) -> Self {
        Self::new(codes::DISCONNECTED, message)
    }

    pub fn invalid_response(method: &str, detail: impl std::fmt::Display) -> Self {
        Self::new(
            codes::INTERNAL_ERROR,
            format!("unexpected {method} response: {detail}"),
        )
    }

    pub fn is_user_rejected(&self) -> bool {
        self.code == codes::USER_REJECTED
            || self.message.contains("User denied")
            || self.message.contains("User rejected")
    }

    /// Mobile wallets nest the 4902 code under `data.originalError`
    pub fn is_unrecognized_chain(&self) -> bool {
        if self.code == codes::UNRECOGNIZED_CHAIN {
            return true;
        }
        self.data
            .as_ref()
            .and_then(|d| d.get("originalError"))
            .and_then(|o| o.get("code"))
            .and_then(Value::as_i64)
            == Some(codes::UNRECOGNIZED_CHAIN)
    }

    pub fn is_insufficient_funds(&self) -> bool {
        self.message.to_ascii_lowercase().contains("insufficient funds")
    }
}

/// `wallet_addEthereumChain` parameter (EIP-3085)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddChainParams {
    pub chain_id: ChainId,
    pub chain_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
}

impl From<&NetworkDescriptor> for AddChainParams {
    fn from(network: &NetworkDescriptor) -> Self {
        Self {
            chain_id: network.chain_id,
            chain_name: network.display_name.clone(),
            native_currency: network.native_currency.clone(),
            rpc_urls: network.rpc_urls.clone(),
            block_explorer_urls: network.block_explorer_urls.clone(),
        }
    }
}

/// `wallet_switchEthereumChain` parameter (EIP-3326)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchChainParams {
    pub chain_id: ChainId,
}

/// `eth_sendTransaction` parameter; all fields are `0x`-prefixed hex
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub from: String,
    pub to: String,
    pub data: String,
    pub value: String,
}
