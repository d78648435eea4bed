//! Network-Gated Mint Controller
//!
//! Owns the wallet session, the selected network, and the mint request, and
//! decides which single primary action (connect / switch / mint) is offered.
//!
//! Wallet notifications are the source of truth for account and chain: they
//! are applied by a listener task as they arrive, including while a request
//! is outstanding. A request's own result only fills in its operation's
//! outcome, and read results that a notification has since superseded are
//! dropped.

use std::sync::{Arc, Mutex};

use alloy_primitives::U256;
use mint_core::{AppConfig, MintError, NetworkDescriptor, NetworkId};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use wallet_client::{
    AddChainParams, ProviderError, SubscriptionId, WalletClient, WalletEvent, WalletProvider,
};

use crate::calculator::parse_unit_price;
use crate::constants::NetworkRegistry;
use crate::state::{parse_first_account, ControllerState, MintView, Operation, SubmittedTx};
use crate::tx_builder::{build_purchase_tx, PurchaseTx};

/// Pricing and deep-link settings resolved from configuration
#[derive(Debug, Clone)]
pub struct MintSettings {
    pub unit_price_wei: U256,
    pub max_quantity: u32,
    pub default_network: NetworkId,
    pub deep_link_base: String,
}

impl MintSettings {
    pub fn from_config(config: &AppConfig) -> mint_core::Result<Self> {
        Ok(Self {
            unit_price_wei: parse_unit_price(&config.mint.unit_price_eth)?,
            max_quantity: config.mint.max_per_tx,
            default_network: config.default_network,
            deep_link_base: config.deep_link_base.clone(),
        })
    }
}

/// Wallet app deep link that reopens this page inside the wallet's browser
pub fn deep_link(base: &str, host: &str) -> String {
    let scheme = if host.contains("localhost") {
        "http"
    } else {
        "https"
    };
    format!("{base}{scheme}://{host}")
}

struct Listener {
    subscription: SubscriptionId,
    task: JoinHandle<()>,
}

pub struct MintController<W: WalletProvider> {
    wallet: WalletClient<W>,
    registry: Arc<NetworkRegistry>,
    settings: MintSettings,
    state: Arc<RwLock<ControllerState>>,
    listener: Mutex<Option<Listener>>,
}

impl<W: WalletProvider> MintController<W> {
    pub fn new(provider: Arc<W>, registry: Arc<NetworkRegistry>, settings: MintSettings) -> Self {
        let state = ControllerState::new(settings.default_network, settings.max_quantity);
        Self {
            wallet: WalletClient::new(provider),
            registry,
            settings,
            state: Arc::new(RwLock::new(state)),
            listener: Mutex::new(None),
        }
    }

    /// Subscribe to wallet notifications and read the wallet's current chain.
    ///
    /// Calling it again while active is a no-op.
    pub async fn activate(&self) {
        {
            let mut listener = self.lock_listener();
            if listener.is_some() {
                return;
            }

            let subscription = self.wallet.subscribe();
            let id = subscription.id;
            let mut events = subscription.events;
            let state = self.state.clone();

            let task = tokio::spawn(async move {
                while let Some(event) = events.recv().await {
                    tracing::debug!("Wallet notification: {:?}", event);
                    state.write().await.apply_event(&event);
                }
            });

            *listener = Some(Listener {
                subscription: id,
                task,
            });
        }

        self.sync_chain().await;
    }

    /// Read the wallet's current chain if a wallet is present; failures are ignored
    pub async fn sync_chain(&self) {
        if !self.wallet.environment().provider_present {
            return;
        }
        if let Err(e) = self.refresh_chain().await {
            tracing::debug!("Chain read failed: {}", e);
        }
    }

    /// Start over for a new page view
    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        let next = state.next_session(self.settings.default_network);
        *state = next;
        tracing::debug!("Controller reset, session {}", state.session());
    }

    /// Release the notification subscription
    pub fn deactivate(&self) {
        if let Some(listener) = self.lock_listener().take() {
            self.wallet.unsubscribe(listener.subscription);
            listener.task.abort();
            tracing::debug!("Wallet listener {} released", listener.subscription);
        }
    }

    pub async fn view(&self) -> MintView {
        self.state
            .read()
            .await
            .view(&self.registry, self.settings.unit_price_wei)
    }

    pub async fn snapshot(&self) -> ControllerState {
        self.state.read().await.clone()
    }

    /// Apply a notification directly, bypassing the subscription
    pub async fn handle_event(&self, event: WalletEvent) {
        self.state.write().await.apply_event(&event);
    }

    /// Request account access, or redirect to the wallet app on mobile
    pub async fn connect(&self) {
        let environment = self.wallet.environment();
        if !environment.provider_present {
            let mut state = self.state.write().await;
            if environment.mobile {
                let host = environment.host.as_deref().unwrap_or("localhost");
                let link = deep_link(&self.settings.deep_link_base, host);
                tracing::info!("No injected wallet on mobile, redirecting to {}", link);
                state.redirect = Some(link);
            } else {
                tracing::warn!("Connect requested without an injected wallet");
                state.last_error = Some(MintError::CapabilityAbsent);
            }
            return;
        }

        let Some(session) = self.begin(Operation::Connect).await else {
            return;
        };
        let result = self.run_connect().await;
        self.finish(Operation::Connect, session, result).await;
    }

    /// Change the required network; never contacts the wallet
    pub async fn select_network(&self, network: NetworkId) {
        let mut state = self.state.write().await;
        if state.selected != network {
            tracing::debug!("Selected network {} -> {}", state.selected, network);
            state.selected = network;
        }
    }

    /// Ask the wallet to switch to the selected network, adding it first if unknown
    pub async fn switch_network(&self) {
        let Some(session) = self.begin(Operation::Switch).await else {
            return;
        };

        let network = {
            let state = self.state.read().await;
            self.registry.network(state.selected).clone()
        };

        let result = match self.switch_or_add(&network).await {
            Ok(()) => {
                tracing::info!("Wallet switched to {}", network.display_name);
                self.reload_wallet_state().await
            }
            Err(e) => Err(e),
        };
        self.finish(Operation::Switch, session, result).await;
    }

    /// Step the quantity; stays within bounds
    pub async fn set_quantity(&self, delta: i32) {
        self.state.write().await.quantity.adjust(delta);
    }

    /// Submit a purchase for the current quantity on the selected network
    pub async fn mint(&self) {
        let (purchase, network, session) = {
            let mut state = self.state.write().await;
            if state.in_flight.any() {
                tracing::debug!("Mint ignored, another wallet request is outstanding");
                return;
            }

            let prepared = self.prepare_purchase(&state);
            match prepared {
                Ok(purchase) => {
                    state.in_flight.minting = true;
                    state.last_error = None;
                    state.last_tx = None;
                    (purchase, state.selected, state.session())
                }
                Err(e) => {
                    tracing::warn!("Mint precondition failed: {}", e);
                    state.last_error = Some(e);
                    return;
                }
            }
        };

        tracing::info!(
            "Submitting purchase of {} on {} (value {} wei)",
            purchase.quantity,
            network,
            purchase.value_wei
        );
        let result = self.wallet.send_transaction(&purchase.request).await;

        let mut state = self.state.write().await;
        if state.session() != session {
            tracing::debug!("Dropping purchase result from a previous page view");
            return;
        }
        state.in_flight.minting = false;
        match result {
            Ok(hash) => {
                tracing::info!("Purchase submitted: {}", hash);
                state.last_tx = Some(SubmittedTx {
                    hash,
                    network,
                    quantity: purchase.quantity,
                });
            }
            Err(e) => {
                let err = classify_mint_failure(&e);
                tracing::warn!("Mint failed: {} ({})", err, e);
                state.last_error = Some(err);
            }
        }
    }

    fn prepare_purchase(&self, state: &ControllerState) -> Result<PurchaseTx, MintError> {
        if !self.wallet.environment().provider_present {
            return Err(MintError::CapabilityAbsent);
        }
        let account = state.account.ok_or(MintError::NotConnected)?;
        if !state.is_correct_network() {
            return Err(MintError::NetworkMismatch {
                required: state.required_chain(),
                current: state
                    .chain_id
                    .clone()
                    .unwrap_or_else(|| "unknown".to_string()),
            });
        }
        let binding =
            self.registry
                .binding(state.selected)
                .ok_or_else(|| MintError::ContractUnavailable {
                    reason: format!("no contract binding for {}", state.selected),
                })?;

        build_purchase_tx(
            binding,
            account,
            state.quantity.get(),
            self.settings.unit_price_wei,
        )
        .map_err(|e| MintError::ContractUnavailable {
            reason: e.to_string(),
        })
    }

    async fn run_connect(&self) -> Result<(), MintError> {
        let (account_epoch, _) = self.state.read().await.epochs();

        let accounts = self
            .wallet
            .request_accounts()
            .await
            .map_err(|e| classify_failure(&e, "Failed to connect"))?;
        let account = parse_first_account(&accounts)
            .map_err(|raw| MintError::generic("Failed to connect", format!("invalid account {raw}")))?
            .ok_or(MintError::NoAccounts)?;

        tracing::info!("Wallet connected: {}", account.to_checksum(None));
        self.state
            .write()
            .await
            .record_account(Some(account), account_epoch);

        self.refresh_chain()
            .await
            .map_err(|e| classify_failure(&e, "Failed to read network"))
    }

    async fn switch_or_add(&self, network: &NetworkDescriptor) -> Result<(), MintError> {
        match self.wallet.switch_chain(network.chain_id).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_unrecognized_chain() => {
                tracing::info!(
                    "Wallet does not know {} ({}), adding it",
                    network.display_name,
                    network.chain_id
                );
                self.wallet
                    .add_chain(&AddChainParams::from(network))
                    .await
                    .map_err(|e| classify_failure(&e, "Failed to add network"))?;
                self.wallet
                    .switch_chain(network.chain_id)
                    .await
                    .map_err(|e| {
                        if e.is_unrecognized_chain() {
                            MintError::UnrecognizedChain {
                                chain_id: network.chain_id,
                            }
                        } else {
                            classify_failure(&e, "Failed to switch network")
                        }
                    })
            }
            Err(e) => Err(classify_failure(&e, "Failed to switch network")),
        }
    }

    /// Re-read chain and accounts after a switch instead of waiting for notifications
    async fn reload_wallet_state(&self) -> Result<(), MintError> {
        self.refresh_chain()
            .await
            .map_err(|e| classify_failure(&e, "Failed to read network"))?;

        let (account_epoch, _) = self.state.read().await.epochs();
        let accounts = self
            .wallet
            .accounts()
            .await
            .map_err(|e| classify_failure(&e, "Failed to read accounts"))?;
        match parse_first_account(&accounts) {
            Ok(account) => {
                self.state
                    .write()
                    .await
                    .record_account(account, account_epoch);
                Ok(())
            }
            Err(raw) => Err(MintError::generic(
                "Failed to read accounts",
                format!("invalid account {raw}"),
            )),
        }
    }

    async fn refresh_chain(&self) -> Result<(), ProviderError> {
        let (_, chain_epoch) = self.state.read().await.epochs();
        let chain_id = self.wallet.chain_id().await?;
        self.state.write().await.record_chain(chain_id, chain_epoch);
        Ok(())
    }

    /// Set the operation's in-flight flag and return the session it runs in;
    /// `None` if any wallet request is outstanding
    async fn begin(&self, op: Operation) -> Option<u64> {
        let mut state = self.state.write().await;
        if state.in_flight.any() {
            tracing::debug!("{:?} ignored, another wallet request is outstanding", op);
            return None;
        }
        state.in_flight.set(op, true);
        state.last_error = None;
        state.redirect = None;
        Some(state.session())
    }

    /// Clear the in-flight flag whatever the outcome and record any failure
    async fn finish(&self, op: Operation, session: u64, result: Result<(), MintError>) {
        let mut state = self.state.write().await;
        if state.session() != session {
            tracing::debug!("Dropping {:?} result from a previous page view", op);
            return;
        }
        state.in_flight.set(op, false);
        if let Err(e) = result {
            tracing::warn!("{:?} failed: {}", op, e);
            state.last_error = Some(e);
        }
    }

    fn lock_listener(&self) -> std::sync::MutexGuard<'_, Option<Listener>> {
        self.listener.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<W: WalletProvider> Drop for MintController<W> {
    fn drop(&mut self) {
        self.deactivate();
    }
}

fn failure_message(e: &ProviderError, context: &str) -> String {
    if e.message.is_empty() {
        context.to_string()
    } else {
        e.message.clone()
    }
}

fn classify_failure(e: &ProviderError, context: &str) -> MintError {
    if e.is_user_rejected() {
        MintError::UserRejected
    } else {
        MintError::generic(context, failure_message(e, context))
    }
}

/// Map a failed `eth_sendTransaction` onto the user-facing taxonomy
pub fn classify_mint_failure(e: &ProviderError) -> MintError {
    if e.is_user_rejected() {
        MintError::UserRejected
    } else if e.is_insufficient_funds() {
        MintError::InsufficientFunds
    } else {
        MintError::generic("Mint failed", failure_message(e, "Mint failed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Phase;
    use serde_json::json;
    use std::time::Duration;
    use wallet_client::mock::ScriptedWallet;
    use wallet_client::{codes, methods, BrowsingContext};

    const ACCOUNT: &str = "0x00000000000000000000000000000000000000aa";
    const TX_HASH: &str = "0x5c504ed432cb51138bcf09aa5e8a410dd4a1e204ef84bfed1be16dfba1b22060";

    fn controller(wallet: &Arc<ScriptedWallet>) -> MintController<ScriptedWallet> {
        let settings = MintSettings::from_config(&AppConfig::default()).unwrap();
        MintController::new(wallet.clone(), Arc::new(NetworkRegistry::load()), settings)
    }

    fn connected_wallet(chain: &str) -> Arc<ScriptedWallet> {
        let wallet = Arc::new(ScriptedWallet::with_provider());
        wallet.set_accounts(&[ACCOUNT]);
        wallet.set_chain(chain);
        wallet
    }

    async fn settle<F>(controller: &MintController<ScriptedWallet>, predicate: F)
    where
        F: Fn(&ControllerState) -> bool,
    {
        for _ in 0..1000 {
            if predicate(&controller.snapshot().await) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        panic!("controller state never settled");
    }

    #[tokio::test]
    async fn test_connect_on_matching_chain_is_ready() {
        let wallet = connected_wallet("0xa");
        let controller = controller(&wallet);

        controller.connect().await;

        let state = controller.snapshot().await;
        assert_eq!(state.phase(), Phase::Ready);
        assert_eq!(state.account.unwrap().to_checksum(None).to_lowercase(), ACCOUNT);
        assert!(!state.in_flight.connecting);
        assert_eq!(
            wallet.requests().iter().map(|(m, _)| m.as_str()).collect::<Vec<_>>(),
            vec![methods::ETH_REQUEST_ACCOUNTS, methods::ETH_CHAIN_ID]
        );
    }

    #[tokio::test]
    async fn test_connect_on_other_chain_is_wrong_network() {
        let wallet = connected_wallet("0x1");
        let controller = controller(&wallet);

        controller.connect().await;

        let view = controller.view().await;
        assert_eq!(view.phase, Phase::WrongNetwork);
        assert_eq!(view.action_label, "Switch to Optimism");
    }

    #[tokio::test]
    async fn test_connect_without_wallet_on_desktop() {
        let wallet = Arc::new(ScriptedWallet::without_provider());
        let controller = controller(&wallet);

        controller.connect().await;

        let state = controller.snapshot().await;
        assert_eq!(state.last_error, Some(MintError::CapabilityAbsent));
        assert!(state.redirect.is_none());
        assert!(wallet.requests().is_empty());
    }

    #[tokio::test]
    async fn test_connect_without_wallet_on_mobile_redirects() {
        let wallet = Arc::new(ScriptedWallet::without_provider());
        wallet.set_environment(BrowsingContext {
            provider_present: false,
            mobile: true,
            host: Some("mint.example".to_string()),
        });
        let controller = controller(&wallet);

        controller.connect().await;

        let state = controller.snapshot().await;
        assert!(state.last_error.is_none());
        assert_eq!(
            state.redirect.as_deref(),
            Some("https://metamask.app.link/dapp/https://mint.example")
        );
        assert!(wallet.requests().is_empty());
    }

    #[tokio::test]
    async fn test_connect_empty_accounts() {
        let wallet = Arc::new(ScriptedWallet::with_provider());
        wallet.respond(methods::ETH_REQUEST_ACCOUNTS, Ok(json!([])));
        let controller = controller(&wallet);

        controller.connect().await;

        let state = controller.snapshot().await;
        assert_eq!(state.last_error, Some(MintError::NoAccounts));
        assert_eq!(state.phase(), Phase::Disconnected);
    }

    #[tokio::test]
    async fn test_connect_rejected() {
        let wallet = Arc::new(ScriptedWallet::with_provider());
        wallet.respond(
            methods::ETH_REQUEST_ACCOUNTS,
            Err(ProviderError::user_rejected()),
        );
        let controller = controller(&wallet);

        controller.connect().await;

        let state = controller.snapshot().await;
        assert_eq!(state.last_error, Some(MintError::UserRejected));
        assert!(!state.in_flight.connecting);
    }

    #[tokio::test]
    async fn test_select_network_issues_no_request() {
        let wallet = connected_wallet("0xa");
        let controller = controller(&wallet);
        controller.connect().await;
        let issued = wallet.requests().len();

        controller.select_network(NetworkId::Arbitrum).await;
        assert_eq!(controller.snapshot().await.phase(), Phase::WrongNetwork);

        controller.select_network(NetworkId::Optimism).await;
        assert_eq!(controller.snapshot().await.phase(), Phase::Ready);

        assert_eq!(wallet.requests().len(), issued);
    }

    #[tokio::test]
    async fn test_switch_success_reloads_state() {
        let wallet = connected_wallet("0x1");
        let controller = controller(&wallet);
        controller.connect().await;

        wallet.set_chain("0xa");
        controller.switch_network().await;

        let state = controller.snapshot().await;
        assert_eq!(state.phase(), Phase::Ready);
        assert!(!state.in_flight.switching);
        assert_eq!(wallet.request_count(methods::WALLET_SWITCH_ETHEREUM_CHAIN), 1);
        assert_eq!(wallet.request_count(methods::ETH_ACCOUNTS), 1);
        assert_eq!(wallet.request_count(methods::WALLET_ADD_ETHEREUM_CHAIN), 0);
    }

    #[tokio::test]
    async fn test_switch_adds_unrecognized_chain_then_retries() {
        let wallet = connected_wallet("0x1");
        let controller = controller(&wallet);
        controller.select_network(NetworkId::Arbitrum).await;
        controller.connect().await;

        wallet.respond(
            methods::WALLET_SWITCH_ETHEREUM_CHAIN,
            Err(ProviderError::new(codes::UNRECOGNIZED_CHAIN, "Unrecognized chain ID")),
        );
        wallet.set_chain("0xa4b1");
        controller.switch_network().await;

        let state = controller.snapshot().await;
        assert_eq!(state.phase(), Phase::Ready);
        assert_eq!(wallet.request_count(methods::WALLET_ADD_ETHEREUM_CHAIN), 1);
        assert_eq!(wallet.request_count(methods::WALLET_SWITCH_ETHEREUM_CHAIN), 2);

        let add = wallet
            .requests()
            .into_iter()
            .find(|(m, _)| m == methods::WALLET_ADD_ETHEREUM_CHAIN)
            .unwrap();
        assert_eq!(add.1[0]["chainId"], "0xa4b1");
        assert_eq!(add.1[0]["chainName"], "Arbitrum One");
        assert_eq!(add.1[0]["rpcUrls"][0], "https://arb1.arbitrum.io/rpc");
    }

    #[tokio::test]
    async fn test_switch_retry_failure_surfaces_second_error() {
        let wallet = connected_wallet("0x1");
        let controller = controller(&wallet);
        controller.connect().await;

        wallet.respond(
            methods::WALLET_SWITCH_ETHEREUM_CHAIN,
            Err(ProviderError::new(codes::UNRECOGNIZED_CHAIN, "Unrecognized chain ID")),
        );
        wallet.respond(
            methods::WALLET_SWITCH_ETHEREUM_CHAIN,
            Err(ProviderError::new(-32603, "switch still failing")),
        );
        controller.switch_network().await;

        let state = controller.snapshot().await;
        assert_eq!(state.phase(), Phase::WrongNetwork);
        assert!(!state.in_flight.switching);
        assert_eq!(wallet.request_count(methods::WALLET_ADD_ETHEREUM_CHAIN), 1);
        assert_eq!(wallet.request_count(methods::WALLET_SWITCH_ETHEREUM_CHAIN), 2);
        assert_eq!(
            state.last_error,
            Some(MintError::generic("Failed to switch network", "switch still failing"))
        );
    }

    #[tokio::test]
    async fn test_switch_add_failure_stops_without_retry() {
        let wallet = connected_wallet("0x1");
        let controller = controller(&wallet);
        controller.connect().await;

        wallet.respond(
            methods::WALLET_SWITCH_ETHEREUM_CHAIN,
            Err(ProviderError::new(codes::UNRECOGNIZED_CHAIN, "Unrecognized chain ID")),
        );
        wallet.respond(
            methods::WALLET_ADD_ETHEREUM_CHAIN,
            Err(ProviderError::new(-32602, "invalid rpc url")),
        );
        controller.switch_network().await;

        let state = controller.snapshot().await;
        assert_eq!(state.phase(), Phase::WrongNetwork);
        assert_eq!(wallet.request_count(methods::WALLET_SWITCH_ETHEREUM_CHAIN), 1);
        assert_eq!(
            state.last_error.unwrap().user_message(),
            "Failed to add network: invalid rpc url"
        );
    }

    #[tokio::test]
    async fn test_switch_other_error_does_not_add() {
        let wallet = connected_wallet("0x1");
        let controller = controller(&wallet);
        controller.connect().await;

        wallet.respond(
            methods::WALLET_SWITCH_ETHEREUM_CHAIN,
            Err(ProviderError::user_rejected()),
        );
        controller.switch_network().await;

        let state = controller.snapshot().await;
        assert_eq!(state.last_error, Some(MintError::UserRejected));
        assert_eq!(wallet.request_count(methods::WALLET_ADD_ETHEREUM_CHAIN), 0);
        assert!(!state.in_flight.switching);
    }

    #[tokio::test]
    async fn test_mint_without_account_issues_no_request() {
        let wallet = Arc::new(ScriptedWallet::with_provider());
        let controller = controller(&wallet);

        controller.mint().await;

        let state = controller.snapshot().await;
        assert_eq!(state.last_error, Some(MintError::NotConnected));
        assert!(!state.in_flight.minting);
        assert!(wallet.requests().is_empty());
    }

    #[tokio::test]
    async fn test_mint_on_wrong_network_issues_no_request() {
        let wallet = connected_wallet("0x1");
        let controller = controller(&wallet);
        controller.connect().await;

        controller.mint().await;

        let state = controller.snapshot().await;
        assert!(matches!(
            state.last_error,
            Some(MintError::NetworkMismatch { .. })
        ));
        assert_eq!(wallet.request_count(methods::ETH_SEND_TRANSACTION), 0);
    }

    #[tokio::test]
    async fn test_mint_success_records_hash_and_exact_value() {
        let wallet = connected_wallet("0xa");
        let controller = controller(&wallet);
        controller.connect().await;
        controller.set_quantity(2).await;
        wallet.respond(methods::ETH_SEND_TRANSACTION, Ok(json!(TX_HASH)));

        controller.mint().await;

        let state = controller.snapshot().await;
        let tx = state.last_tx.unwrap();
        assert_eq!(tx.hash.as_str(), TX_HASH);
        assert_eq!(tx.quantity, 3);
        assert!(state.last_error.is_none());

        let (_, params) = wallet
            .requests()
            .into_iter()
            .find(|(m, _)| m == methods::ETH_SEND_TRANSACTION)
            .unwrap();
        assert_eq!(params[0]["value"], "0x214e8348c4f0000");
        assert_eq!(params[0]["to"], "0x24b8b90c6050dD066e595027831A863D0906c5A7");
        assert_eq!(
            params[0]["from"].as_str().unwrap().to_lowercase(),
            ACCOUNT
        );
    }

    #[tokio::test]
    async fn test_malformed_hash_is_reported_not_recorded() {
        let wallet = connected_wallet("0xa");
        let controller = controller(&wallet);
        controller.connect().await;
        wallet.respond(
            methods::ETH_SEND_TRANSACTION,
            Ok(json!("0x1234567é0123456789abcdef")),
        );

        controller.mint().await;

        let view = controller.view().await;
        assert!(view.tx.is_none());
        assert_eq!(view.error.unwrap().code, "generic_failure");
        assert!(!view.in_flight.minting);
    }

    #[tokio::test]
    async fn test_failed_precondition_keeps_previous_hash() {
        let wallet = connected_wallet("0xa");
        let controller = controller(&wallet);
        controller.connect().await;
        wallet.respond(methods::ETH_SEND_TRANSACTION, Ok(json!(TX_HASH)));
        controller.mint().await;

        controller.handle_event(WalletEvent::ChainChanged("0x1".into())).await;
        controller.mint().await;

        let state = controller.snapshot().await;
        assert!(state.last_tx.is_some());
        assert!(matches!(
            state.last_error,
            Some(MintError::NetworkMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn test_new_submission_clears_previous_hash() {
        let wallet = connected_wallet("0xa");
        let controller = controller(&wallet);
        controller.connect().await;
        controller.set_quantity(4).await;
        wallet.respond(methods::ETH_SEND_TRANSACTION, Ok(json!(TX_HASH)));
        controller.mint().await;

        wallet.respond(
            methods::ETH_SEND_TRANSACTION,
            Err(ProviderError::new(
                4001,
                "MetaMask Tx Signature: User denied transaction signature.",
            )),
        );
        controller.mint().await;

        let state = controller.snapshot().await;
        assert!(state.last_tx.is_none());
        assert_eq!(state.last_error, Some(MintError::UserRejected));
        assert_eq!(state.quantity.get(), 5);
        assert_eq!(state.phase(), Phase::Ready);
    }

    #[test]
    fn test_mint_failure_classification() {
        let insufficient = ProviderError::new(-32000, "insufficient funds for gas * price + value");
        assert_eq!(classify_mint_failure(&insufficient), MintError::InsufficientFunds);

        let reverted = ProviderError::new(-32603, "execution reverted");
        assert_eq!(
            classify_mint_failure(&reverted).user_message(),
            "Mint failed: execution reverted"
        );
    }

    #[tokio::test]
    async fn test_overlapping_mint_is_ignored() {
        let wallet = connected_wallet("0xa");
        let controller = Arc::new(controller(&wallet));
        controller.connect().await;
        let gate = wallet.hold(methods::ETH_SEND_TRANSACTION);

        let first = tokio::spawn({
            let controller = controller.clone();
            async move { controller.mint().await }
        });
        wallet.wait_for(methods::ETH_SEND_TRANSACTION, 1).await;
        assert!(!controller.view().await.action_enabled);

        controller.mint().await;
        controller.switch_network().await;
        controller.connect().await;

        gate.release();
        first.await.unwrap();

        assert_eq!(wallet.request_count(methods::ETH_SEND_TRANSACTION), 1);
        assert_eq!(wallet.request_count(methods::WALLET_SWITCH_ETHEREUM_CHAIN), 0);
        assert_eq!(wallet.request_count(methods::ETH_REQUEST_ACCOUNTS), 1);
        assert!(!controller.snapshot().await.in_flight.minting);
    }

    #[tokio::test]
    async fn test_notification_during_mint_updates_state() {
        let wallet = connected_wallet("0xa");
        let controller = Arc::new(controller(&wallet));
        controller.activate().await;
        controller.connect().await;
        wallet.respond(methods::ETH_SEND_TRANSACTION, Ok(json!(TX_HASH)));
        let gate = wallet.hold(methods::ETH_SEND_TRANSACTION);

        let pending = tokio::spawn({
            let controller = controller.clone();
            async move { controller.mint().await }
        });
        wallet.wait_for(methods::ETH_SEND_TRANSACTION, 1).await;

        wallet.emit(WalletEvent::ChainChanged("0x1".to_string()));
        settle(&controller, |s| s.chain_id.as_deref() == Some("0x1")).await;
        assert!(controller.snapshot().await.in_flight.minting);

        gate.release();
        pending.await.unwrap();

        let state = controller.snapshot().await;
        assert_eq!(state.last_tx.as_ref().unwrap().hash.as_str(), TX_HASH);
        assert_eq!(state.phase(), Phase::WrongNetwork);
    }

    #[tokio::test]
    async fn test_empty_accounts_notification_disconnects() {
        let wallet = connected_wallet("0xa4b1");
        let controller = controller(&wallet);
        controller.activate().await;
        controller.select_network(NetworkId::Arbitrum).await;
        controller.connect().await;
        controller.set_quantity(6).await;

        wallet.emit(WalletEvent::AccountsChanged(vec![]));
        settle(&controller, |s| s.account.is_none()).await;

        let state = controller.snapshot().await;
        assert_eq!(state.phase(), Phase::Disconnected);
        assert_eq!(state.quantity.get(), 7);
        assert_eq!(state.selected, NetworkId::Arbitrum);
    }

    #[tokio::test]
    async fn test_activate_reads_chain_and_deactivate_unsubscribes() {
        let wallet = connected_wallet("0xa");
        let controller = controller(&wallet);

        controller.activate().await;
        controller.activate().await;
        assert_eq!(wallet.subscriber_count(), 1);
        assert_eq!(controller.snapshot().await.chain_id.as_deref(), Some("0xa"));

        controller.deactivate();
        assert_eq!(wallet.subscriber_count(), 0);

        wallet.emit(WalletEvent::ChainChanged("0x1".to_string()));
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(controller.snapshot().await.chain_id.as_deref(), Some("0xa"));
    }

    #[tokio::test]
    async fn test_drop_releases_subscription() {
        let wallet = connected_wallet("0xa");
        {
            let controller = controller(&wallet);
            controller.activate().await;
            assert_eq!(wallet.subscriber_count(), 1);
        }
        assert_eq!(wallet.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_reset_discards_outstanding_result() {
        let wallet = connected_wallet("0xa");
        let controller = Arc::new(controller(&wallet));
        controller.connect().await;
        wallet.respond(
            methods::ETH_SEND_TRANSACTION,
            Err(ProviderError::disconnected("page closed")),
        );
        let gate = wallet.hold(methods::ETH_SEND_TRANSACTION);

        let pending = tokio::spawn({
            let controller = controller.clone();
            async move { controller.mint().await }
        });
        wallet.wait_for(methods::ETH_SEND_TRANSACTION, 1).await;

        controller.reset().await;
        gate.release();
        pending.await.unwrap();

        let state = controller.snapshot().await;
        assert_eq!(state.phase(), Phase::Disconnected);
        assert!(state.last_error.is_none());
        assert!(!state.in_flight.any());
    }

    #[test]
    fn test_deep_link_scheme() {
        let base = "https://metamask.app.link/dapp/";
        assert_eq!(
            deep_link(base, "localhost:5173"),
            "https://metamask.app.link/dapp/http://localhost:5173"
        );
        assert_eq!(
            deep_link(base, "schg.example"),
            "https://metamask.app.link/dapp/https://schg.example"
        );
    }
}
