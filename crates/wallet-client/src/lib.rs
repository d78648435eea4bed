//! wallet-client: Typed access to an injected EIP-1193 wallet
//!
//! `WalletProvider` is the seam the rest of the workspace programs against;
//! `WalletClient` wraps a provider with typed helpers for the handful of
//! methods the mint flow needs.

pub mod provider;
pub mod rpc;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

use std::sync::Arc;

use mint_core::{ChainId, TxHash};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use provider::{BrowsingContext, Subscription, SubscriptionId, WalletEvent, WalletProvider};
pub use rpc::{codes, methods, AddChainParams, ProviderError, SwitchChainParams, TransactionRequest};

/// Result type for wallet requests
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Typed wallet client over a shared provider
pub struct WalletClient<W> {
    provider: Arc<W>,
}

impl<W> Clone for WalletClient<W> {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
        }
    }
}

impl<W: WalletProvider> WalletClient<W> {
    pub fn new(provider: Arc<W>) -> Self {
        Self { provider }
    }

    pub fn environment(&self) -> BrowsingContext {
        self.provider.environment()
    }

    /// Prompt for account access
    pub async fn request_accounts(&self) -> Result<Vec<String>> {
        self.call(methods::ETH_REQUEST_ACCOUNTS, Vec::new()).await
    }

    /// Accounts already exposed to this page, without prompting
    pub async fn accounts(&self) -> Result<Vec<String>> {
        self.call(methods::ETH_ACCOUNTS, Vec::new()).await
    }

    /// Wallet's active chain, as the raw hex string it reports
    pub async fn chain_id(&self) -> Result<String> {
        self.call(methods::ETH_CHAIN_ID, Vec::new()).await
    }

    pub async fn switch_chain(&self, chain_id: ChainId) -> Result<()> {
        let params = to_param(
            methods::WALLET_SWITCH_ETHEREUM_CHAIN,
            &SwitchChainParams { chain_id },
        )?;
        self.send(methods::WALLET_SWITCH_ETHEREUM_CHAIN, vec![params])
            .await
            .map(|_| ())
    }

    pub async fn add_chain(&self, chain: &AddChainParams) -> Result<()> {
        let params = to_param(methods::WALLET_ADD_ETHEREUM_CHAIN, chain)?;
        self.send(methods::WALLET_ADD_ETHEREUM_CHAIN, vec![params])
            .await
            .map(|_| ())
    }

    /// Submit a transaction for signing; returns its hash
    pub async fn send_transaction(&self, tx: &TransactionRequest) -> Result<TxHash> {
        let params = to_param(methods::ETH_SEND_TRANSACTION, tx)?;
        let hash: String = self.call(methods::ETH_SEND_TRANSACTION, vec![params]).await?;
        if !TxHash::is_well_formed(&hash) {
            return Err(ProviderError::invalid_response(
                methods::ETH_SEND_TRANSACTION,
                format!("malformed transaction hash {hash:?}"),
            ));
        }
        Ok(TxHash::new(hash))
    }

    pub fn subscribe(&self) -> Subscription {
        self.provider.subscribe()
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.provider.unsubscribe(id)
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Vec<Value>) -> Result<T> {
        let value = self.send(method, params).await?;
        serde_json::from_value(value).map_err(|e| ProviderError::invalid_response(method, e))
    }

    async fn send(&self, method: &str, params: Vec<Value>) -> Result<Value> {
        tracing::debug!("wallet request: {}", method);
        self.provider.request(method, params).await
    }
}

fn to_param<T: serde::Serialize>(method: &str, value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| ProviderError::invalid_response(method, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::ScriptedWallet;
    use serde_json::json;

    #[tokio::test]
    async fn test_typed_requests() {
        let wallet = Arc::new(ScriptedWallet::with_provider());
        wallet.respond(methods::ETH_REQUEST_ACCOUNTS, Ok(json!(["0xabc"])));
        wallet.respond(methods::ETH_CHAIN_ID, Ok(json!("0xa")));
        let client = WalletClient::new(wallet.clone());

        assert_eq!(client.request_accounts().await.unwrap(), vec!["0xabc".to_string()]);
        assert_eq!(client.chain_id().await.unwrap(), "0xa");
    }

    #[tokio::test]
    async fn test_switch_chain_params() {
        let wallet = Arc::new(ScriptedWallet::with_provider());
        let client = WalletClient::new(wallet.clone());

        client.switch_chain(ChainId(42161)).await.unwrap();

        let requests = wallet.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, methods::WALLET_SWITCH_ETHEREUM_CHAIN);
        assert_eq!(requests[0].1, vec![json!({ "chainId": "0xa4b1" })]);
    }

    #[tokio::test]
    async fn test_send_transaction_rejects_malformed_hash() {
        let wallet = Arc::new(ScriptedWallet::with_provider());
        wallet.respond(
            methods::ETH_SEND_TRANSACTION,
            Ok(json!("0x1234567é0123456789abcdef")),
        );
        let client = WalletClient::new(wallet);
        let tx = TransactionRequest {
            from: "0x00000000000000000000000000000000000000aa".to_string(),
            to: "0x24b8b90c6050dD066e595027831A863D0906c5A7".to_string(),
            data: "0x".to_string(),
            value: "0x0".to_string(),
        };

        let err = client.send_transaction(&tx).await.unwrap_err();
        assert_eq!(err.code, codes::INTERNAL_ERROR);
        assert!(err.message.contains("eth_sendTransaction"));
    }

    #[tokio::test]
    async fn test_malformed_response_is_provider_error() {
        let wallet = Arc::new(ScriptedWallet::with_provider());
        wallet.respond(methods::ETH_CHAIN_ID, Ok(json!(10)));
        let client = WalletClient::new(wallet);

        let err = client.chain_id().await.unwrap_err();
        assert_eq!(err.code, codes::INTERNAL_ERROR);
        assert!(err.message.contains("eth_chainId"));
    }
}
