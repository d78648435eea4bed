//! The injected wallet seam
//!
//! A `WalletProvider` is whatever stands in for the browser's injected
//! provider: the HTTP bridge to a real page, or a scripted double in tests.

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::rpc::ProviderError;

/// Facts about the browsing context that hosts the wallet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowsingContext {
    /// An injected provider exists in the page
    pub provider_present: bool,
    /// Mobile user agent (deep link instead of error when no provider)
    pub mobile: bool,
    /// Host the page was served from, used to build the deep link
    pub host: Option<String>,
}

/// Unsolicited provider notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "camelCase")]
pub enum WalletEvent {
    ChainChanged(String),
    AccountsChanged(Vec<String>),
}

pub type SubscriptionId = u64;

/// Receiving end of a provider notification subscription
#[derive(Debug)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub events: mpsc::UnboundedReceiver<WalletEvent>,
}

/// Request/response plus notification interface of an injected wallet
pub trait WalletProvider: Send + Sync + 'static {
    fn environment(&self) -> BrowsingContext;

    fn request(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> impl Future<Output = Result<Value, ProviderError>> + Send;

    /// Listen for `chainChanged` / `accountsChanged`
    fn subscribe(&self) -> Subscription;

    fn unsubscribe(&self, id: SubscriptionId);
}
