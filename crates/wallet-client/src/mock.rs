//! Scripted in-memory wallet for tests
//!
//! Responses are queued per method and consumed in order; a method with no
//! queued response answers with its default (`null`, or the configured
//! account/chain for read methods). Requests can be held open to simulate a
//! pending wallet prompt.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};
use tokio::sync::{mpsc, Notify};

use crate::provider::{BrowsingContext, Subscription, SubscriptionId, WalletEvent, WalletProvider};
use crate::rpc::{methods, ProviderError};

#[derive(Default)]
struct Script {
    environment: BrowsingContext,
    responses: HashMap<String, VecDeque<Result<Value, ProviderError>>>,
    requests: Vec<(String, Vec<Value>)>,
    held: HashMap<String, Arc<Notify>>,
    subscribers: HashMap<SubscriptionId, mpsc::UnboundedSender<WalletEvent>>,
    chain_id: Option<String>,
    accounts: Vec<String>,
}

/// Deterministic `WalletProvider` double
#[derive(Default)]
pub struct ScriptedWallet {
    script: Mutex<Script>,
    next_subscription: AtomicU64,
}

/// Releases a request held with [`ScriptedWallet::hold`]
pub struct Gate(Arc<Notify>);

impl Gate {
    pub fn release(&self) {
        self.0.notify_one();
    }
}

impl ScriptedWallet {
    /// A desktop browser with no injected provider
    pub fn without_provider() -> Self {
        Self::default()
    }

    /// A desktop browser with an injected provider
    pub fn with_provider() -> Self {
        let wallet = Self::default();
        wallet.set_environment(BrowsingContext {
            provider_present: true,
            mobile: false,
            host: Some("localhost:5173".to_string()),
        });
        wallet
    }

    pub fn set_environment(&self, environment: BrowsingContext) {
        self.lock().environment = environment;
    }

    /// Answer for `eth_chainId` when nothing is queued
    pub fn set_chain(&self, chain_id: &str) {
        self.lock().chain_id = Some(chain_id.to_string());
    }

    /// Answer for `eth_accounts` / `eth_requestAccounts` when nothing is queued
    pub fn set_accounts(&self, accounts: &[&str]) {
        self.lock().accounts = accounts.iter().map(|a| a.to_string()).collect();
    }

    /// Queue one response for `method`
    pub fn respond(&self, method: &str, response: Result<Value, ProviderError>) {
        self.lock()
            .responses
            .entry(method.to_string())
            .or_default()
            .push_back(response);
    }

    /// Keep the next `method` request pending until the gate is released
    pub fn hold(&self, method: &str) -> Gate {
        let notify = Arc::new(Notify::new());
        self.lock().held.insert(method.to_string(), notify.clone());
        Gate(notify)
    }

    /// Every request issued so far, in order
    pub fn requests(&self) -> Vec<(String, Vec<Value>)> {
        self.lock().requests.clone()
    }

    pub fn request_count(&self, method: &str) -> usize {
        self.lock().requests.iter().filter(|(m, _)| m == method).count()
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    /// Deliver a notification to every live subscriber
    pub fn emit(&self, event: WalletEvent) {
        let mut script = self.lock();
        script
            .subscribers
            .retain(|_, tx| tx.send(event.clone()).is_ok());
    }

    /// Wait until `count` requests for `method` have been issued
    pub async fn wait_for(&self, method: &str, count: usize) {
        for _ in 0..1000 {
            if self.request_count(method) >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        panic!("timed out waiting for {count} x {method}");
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn default_response(script: &Script, method: &str) -> Result<Value, ProviderError> {
        match method {
            methods::ETH_CHAIN_ID => Ok(json!(script.chain_id)),
            methods::ETH_ACCOUNTS | methods::ETH_REQUEST_ACCOUNTS => Ok(json!(script.accounts)),
            _ => Ok(Value::Null),
        }
    }
}

impl WalletProvider for ScriptedWallet {
    fn environment(&self) -> BrowsingContext {
        self.lock().environment.clone()
    }

    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, ProviderError> {
        let (held, response) = {
            let mut script = self.lock();
            script.requests.push((method.to_string(), params));
            let held = script.held.remove(method);
            let queued = script
                .responses
                .get_mut(method)
                .and_then(|queue| queue.pop_front());
            let response = queued.unwrap_or_else(|| Self::default_response(&script, method));
            (held, response)
        };

        if let Some(notify) = held {
            notify.notified().await;
        }

        response
    }

    fn subscribe(&self) -> Subscription {
        let id = self.next_subscription.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().subscribers.insert(id, tx);
        Subscription { id, events: rx }
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.lock().subscribers.remove(&id);
    }
}
