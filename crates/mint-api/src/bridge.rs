//! Browser wallet bridge
//!
//! The injected provider lives in the page, so wallet requests issued by the
//! controller are queued here until the page picks them up (`GET /bridge/poll`),
//! runs them against `window.ethereum`, and posts the outcome back
//! (`POST /bridge/reply/{id}`). Provider notifications arrive on
//! `POST /bridge/event` and are fanned out to subscribers.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot, Notify};
use wallet_client::{BrowsingContext, ProviderError, Subscription, SubscriptionId, WalletEvent, WalletProvider};

type Reply = oneshot::Sender<Result<Value, ProviderError>>;

/// A wallet request waiting to be executed by the page
#[derive(Debug, Clone, Serialize)]
pub struct BridgeRequest {
    pub id: String,
    pub method: String,
    pub params: Vec<Value>,
}

#[derive(Default)]
struct BridgeInner {
    environment: RwLock<BrowsingContext>,
    queue: Mutex<VecDeque<BridgeRequest>>,
    pending: Mutex<HashMap<String, Reply>>,
    queued: Notify,
    subscribers: Mutex<HashMap<SubscriptionId, mpsc::UnboundedSender<WalletEvent>>>,
    next_subscription: AtomicU64,
}

/// `WalletProvider` backed by the page's injected wallet
#[derive(Clone, Default)]
pub struct BridgeWallet {
    inner: Arc<BridgeInner>,
}

impl BridgeWallet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A page view announced itself.
    ///
    /// Requests owed by a previous page view can no longer be answered and
    /// fail as disconnected. Returns how many were dropped.
    pub fn attach(&self, environment: BrowsingContext) -> usize {
        tracing::info!(
            "Wallet page attached (provider: {}, mobile: {}, host: {:?})",
            environment.provider_present,
            environment.mobile,
            environment.host
        );
        *self
            .inner
            .environment
            .write()
            .unwrap_or_else(|e| e.into_inner()) = environment;

        lock(&self.inner.queue).clear();
        let dropped: Vec<Reply> = lock(&self.inner.pending).drain().map(|(_, tx)| tx).collect();
        let count = dropped.len();
        for tx in dropped {
            let _ = tx.send(Err(ProviderError::disconnected("wallet page was reloaded")));
        }
        if count > 0 {
            tracing::warn!("Dropped {} wallet request(s) from previous page view", count);
        }
        count
    }

    /// Take queued requests, waiting up to `wait` for one to arrive
    pub async fn next_requests(&self, wait: Duration) -> Vec<BridgeRequest> {
        let ready = self.drain_queue();
        if !ready.is_empty() {
            return ready;
        }
        let _ = tokio::time::timeout(wait, self.inner.queued.notified()).await;
        self.drain_queue()
    }

    /// Deliver the page's answer; false if no request with this ID is pending
    pub fn resolve(&self, id: &str, outcome: Result<Value, ProviderError>) -> bool {
        match lock(&self.inner.pending).remove(id) {
            Some(tx) => {
                if let Err(e) = &outcome {
                    tracing::debug!("Wallet request {} failed: {}", id, e);
                }
                tx.send(outcome).is_ok()
            }
            None => false,
        }
    }

    /// Fan a provider notification out to subscribers
    pub fn publish(&self, event: WalletEvent) {
        tracing::debug!("Wallet event from page: {:?}", event);
        lock(&self.inner.subscribers).retain(|_, tx| tx.send(event.clone()).is_ok());
    }

    pub fn pending_count(&self) -> usize {
        lock(&self.inner.pending).len()
    }

    fn drain_queue(&self) -> Vec<BridgeRequest> {
        lock(&self.inner.queue).drain(..).collect()
    }
}

impl WalletProvider for BridgeWallet {
    fn environment(&self) -> BrowsingContext {
        self.inner
            .environment
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, ProviderError> {
        let id = generate_request_id();
        let (tx, rx) = oneshot::channel();

        lock(&self.inner.pending).insert(id.clone(), tx);
        lock(&self.inner.queue).push_back(BridgeRequest {
            id: id.clone(),
            method: method.to_string(),
            params,
        });
        self.inner.queued.notify_one();
        tracing::debug!("Queued wallet request {} ({})", id, method);

        rx.await
            .unwrap_or_else(|_| Err(ProviderError::disconnected("wallet page went away")))
    }

    fn subscribe(&self) -> Subscription {
        let id = self.inner.next_subscription.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        lock(&self.inner.subscribers).insert(id, tx);
        Subscription { id, events: rx }
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        lock(&self.inner.subscribers).remove(&id);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Timestamp plus random suffix
fn generate_request_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();

    let random: u32 = rand::random();
    format!("{:x}{:08x}", timestamp, random)
}
