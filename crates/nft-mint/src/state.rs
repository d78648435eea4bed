//! Controller state and the view derived from it

use std::str::FromStr;

use alloy_primitives::{Address, U256};
use mint_core::{ChainId, MintError, NetworkId, TxHash};
use serde::Serialize;
use wallet_client::WalletEvent;

use crate::calculator::{format_eth, total_cost_wei, Quantity};
use crate::constants::{network_descriptor, NetworkRegistry};
use crate::params;

/// Which primary action the page offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No account known: offer Connect
    Disconnected,
    /// Account known, wallet on another chain: offer Switch Network
    WrongNetwork,
    /// Account known, wallet on the selected chain: offer Mint
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryAction {
    Connect,
    SwitchNetwork,
    Mint,
}

/// Wallet-facing operations that suspend the primary action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Connect,
    Switch,
    Mint,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InFlight {
    pub connecting: bool,
    pub switching: bool,
    pub minting: bool,
}

impl InFlight {
    pub fn any(&self) -> bool {
        self.connecting || self.switching || self.minting
    }

    pub fn set(&mut self, op: Operation, value: bool) {
        match op {
            Operation::Connect => self.connecting = value,
            Operation::Switch => self.switching = value,
            Operation::Mint => self.minting = value,
        }
    }
}

/// A transaction the wallet accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedTx {
    pub hash: TxHash,
    pub network: NetworkId,
    pub quantity: u32,
}

/// Wallet session, network selection, and mint request state
#[derive(Debug, Clone)]
pub struct ControllerState {
    pub account: Option<Address>,
    /// Chain ID exactly as the wallet last reported it
    pub chain_id: Option<String>,
    pub selected: NetworkId,
    pub quantity: Quantity,
    pub in_flight: InFlight,
    pub last_tx: Option<SubmittedTx>,
    pub last_error: Option<MintError>,
    /// Deep link the page should navigate to
    pub redirect: Option<String>,
    account_epoch: u64,
    chain_epoch: u64,
    session: u64,
}

impl ControllerState {
    pub fn new(selected: NetworkId, max_quantity: u32) -> Self {
        Self {
            account: None,
            chain_id: None,
            selected,
            quantity: Quantity::new(max_quantity),
            in_flight: InFlight::default(),
            last_tx: None,
            last_error: None,
            redirect: None,
            account_epoch: 0,
            chain_epoch: 0,
            session: 0,
        }
    }

    /// Fresh state for a new page view; results of requests from the
    /// previous view are discarded
    pub fn next_session(&self, selected: NetworkId) -> Self {
        let mut next = Self::new(selected, self.quantity.max());
        next.session = self.session + 1;
        next.account_epoch = self.account_epoch + 1;
        next.chain_epoch = self.chain_epoch + 1;
        next
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    pub fn required_chain(&self) -> ChainId {
        network_descriptor(self.selected).chain_id
    }

    pub fn is_correct_network(&self) -> bool {
        self.chain_id
            .as_deref()
            .is_some_and(|reported| self.required_chain().matches_hex(reported))
    }

    pub fn phase(&self) -> Phase {
        match self.account {
            None => Phase::Disconnected,
            Some(_) if self.is_correct_network() => Phase::Ready,
            Some(_) => Phase::WrongNetwork,
        }
    }

    pub fn primary_action(&self) -> PrimaryAction {
        match self.phase() {
            Phase::Disconnected => PrimaryAction::Connect,
            Phase::WrongNetwork => PrimaryAction::SwitchNetwork,
            Phase::Ready => PrimaryAction::Mint,
        }
    }

    /// Counters bumped on every notification, used to tell whether a
    /// request's result is older than what the wallet has since reported
    pub fn epochs(&self) -> (u64, u64) {
        (self.account_epoch, self.chain_epoch)
    }

    /// Apply an unsolicited wallet notification
    pub fn apply_event(&mut self, event: &WalletEvent) {
        match event {
            WalletEvent::ChainChanged(chain_id) => {
                self.chain_id = Some(chain_id.clone());
                self.chain_epoch += 1;
            }
            WalletEvent::AccountsChanged(accounts) => {
                match parse_first_account(accounts) {
                    Ok(account) => self.account = account,
                    Err(raw) => {
                        tracing::warn!("Ignoring unparseable account from wallet: {}", raw);
                        return;
                    }
                }
                self.account_epoch += 1;
            }
        }
    }

    /// Record a requested chain ID unless a notification superseded it
    pub fn record_chain(&mut self, chain_id: String, observed_epoch: u64) {
        if self.chain_epoch == observed_epoch {
            self.chain_id = Some(chain_id);
        }
    }

    /// Record a requested account unless a notification superseded it
    pub fn record_account(&mut self, account: Option<Address>, observed_epoch: u64) {
        if self.account_epoch == observed_epoch {
            self.account = account;
        }
    }

    /// Snapshot for rendering
    pub fn view(&self, registry: &NetworkRegistry, unit_price_wei: U256) -> MintView {
        let selected = registry.network(self.selected);
        let action = self.primary_action();
        let busy = self.in_flight.any();
        let stepper_locked = self.in_flight.minting || self.in_flight.switching;

        let action_label = match action {
            PrimaryAction::Connect if self.in_flight.connecting => "Connecting...".to_string(),
            PrimaryAction::Connect => "Connect Wallet".to_string(),
            PrimaryAction::SwitchNetwork if self.in_flight.switching => "Switching...".to_string(),
            PrimaryAction::SwitchNetwork => format!("Switch to {}", self.selected.label()),
            PrimaryAction::Mint if self.in_flight.minting => "Minting...".to_string(),
            PrimaryAction::Mint => format!("Mint {} NFT(s)", self.quantity.get()),
        };

        let action_enabled = !busy
            && match action {
                PrimaryAction::Mint => registry.binding(self.selected).is_some(),
                _ => true,
            };

        let account = self.account.map(|a| a.to_checksum(None));
        let account_short = account
            .as_ref()
            .map(|a| format!("{}...{}", &a[..6], &a[a.len() - 4..]));

        let networks = NetworkId::ALL
            .into_iter()
            .map(|id| NetworkOption {
                id,
                label: id.label(),
                selected: id == self.selected,
                contract_url: registry.binding(id).and_then(|b| {
                    registry
                        .network(id)
                        .address_url(&b.address_checksummed())
                }),
            })
            .collect();

        let tx = self.last_tx.as_ref().map(|tx| TxView {
            hash: tx.hash.to_string(),
            short: tx.hash.short(),
            quantity: tx.quantity,
            explorer_url: registry.network(tx.network).tx_url(&tx.hash),
        });

        MintView {
            phase: self.phase(),
            action,
            action_label,
            action_enabled,
            in_flight: self.in_flight,
            account,
            account_short,
            wallet_chain_id: self.chain_id.clone(),
            wallet_network: self
                .chain_id
                .as_deref()
                .and_then(|c| registry.network_for_chain(c)),
            selected_network: self.selected,
            selected_network_name: selected.display_name.clone(),
            networks,
            quantity: self.quantity.get(),
            min_quantity: params::MIN_QUANTITY,
            max_quantity: self.quantity.max(),
            can_increment: self.quantity.can_increment() && !stepper_locked,
            can_decrement: self.quantity.can_decrement() && !stepper_locked,
            total_cost: format_eth(total_cost_wei(self.quantity.get(), unit_price_wei), 2),
            currency_symbol: selected.native_currency.symbol.clone(),
            error: self.last_error.as_ref().map(|e| ErrorView {
                code: e.error_code(),
                message: e.user_message(),
            }),
            tx,
            redirect: self.redirect.clone(),
        }
    }
}

/// First account of a wallet-reported list, checksummed; `Err` carries the raw value
pub fn parse_first_account(accounts: &[String]) -> Result<Option<Address>, String> {
    match accounts.first() {
        None => Ok(None),
        Some(raw) => Address::from_str(raw).map(Some).map_err(|_| raw.clone()),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NetworkOption {
    pub id: NetworkId,
    pub label: &'static str,
    pub selected: bool,
    pub contract_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorView {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TxView {
    pub hash: String,
    pub short: String,
    pub quantity: u32,
    pub explorer_url: Option<String>,
}

/// Everything the page needs to render the mint card
#[derive(Debug, Clone, Serialize)]
pub struct MintView {
    pub phase: Phase,
    pub action: PrimaryAction,
    pub action_label: String,
    pub action_enabled: bool,
    pub in_flight: InFlight,
    pub account: Option<String>,
    pub account_short: Option<String>,
    pub wallet_chain_id: Option<String>,
    pub wallet_network: Option<NetworkId>,
    pub selected_network: NetworkId,
    pub selected_network_name: String,
    pub networks: Vec<NetworkOption>,
    pub quantity: u32,
    pub min_quantity: u32,
    pub max_quantity: u32,
    pub can_increment: bool,
    pub can_decrement: bool,
    pub total_cost: String,
    pub currency_symbol: String,
    pub error: Option<ErrorView>,
    pub tx: Option<TxView>,
    pub redirect: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::parse_unit_price;

    const ACCOUNT: &str = "0x00000000000000000000000000000000000000aa";

    fn connected(selected: NetworkId, chain: &str) -> ControllerState {
        let mut state = ControllerState::new(selected, 20);
        state.account = Some(ACCOUNT.parse().unwrap());
        state.chain_id = Some(chain.to_string());
        state
    }

    #[test]
    fn test_phase_ready_on_matching_chain() {
        assert_eq!(connected(NetworkId::Optimism, "0xa").phase(), Phase::Ready);
        assert_eq!(connected(NetworkId::Arbitrum, "0xA4B1").phase(), Phase::Ready);
    }

    #[test]
    fn test_phase_wrong_network() {
        let state = connected(NetworkId::Optimism, "0x1");
        assert_eq!(state.phase(), Phase::WrongNetwork);
        assert_eq!(state.primary_action(), PrimaryAction::SwitchNetwork);
    }

    #[test]
    fn test_phase_disconnected_without_account() {
        let mut state = ControllerState::new(NetworkId::Optimism, 20);
        state.chain_id = Some("0xa".to_string());
        assert_eq!(state.phase(), Phase::Disconnected);
    }

    #[test]
    fn test_empty_accounts_event_disconnects() {
        let mut state = connected(NetworkId::Arbitrum, "0xa4b1");
        state.quantity.adjust(4);

        state.apply_event(&WalletEvent::AccountsChanged(vec![]));

        assert_eq!(state.phase(), Phase::Disconnected);
        assert!(state.account.is_none());
        assert_eq!(state.quantity.get(), 5);
        assert_eq!(state.selected, NetworkId::Arbitrum);
    }

    #[test]
    fn test_chain_event_reevaluates() {
        let mut state = connected(NetworkId::Optimism, "0x1");
        state.apply_event(&WalletEvent::ChainChanged("0xa".to_string()));
        assert_eq!(state.phase(), Phase::Ready);
    }

    #[test]
    fn test_stale_results_do_not_override_notifications() {
        let mut state = connected(NetworkId::Optimism, "0x1");
        let (_, chain_epoch) = state.epochs();

        state.apply_event(&WalletEvent::ChainChanged("0xa".to_string()));
        state.record_chain("0x1".to_string(), chain_epoch);

        assert_eq!(state.chain_id.as_deref(), Some("0xa"));
    }

    #[test]
    fn test_next_session_resets_wallet_state() {
        let mut state = connected(NetworkId::Arbitrum, "0xa4b1");
        state.quantity.adjust(3);

        let next = state.next_session(NetworkId::Optimism);

        assert_eq!(next.session(), state.session() + 1);
        assert_eq!(next.phase(), Phase::Disconnected);
        assert_eq!(next.quantity.get(), 1);
        assert_eq!(next.quantity.max(), 20);
        assert_eq!(next.selected, NetworkId::Optimism);
    }

    #[test]
    fn test_unparseable_account_ignored() {
        let mut state = connected(NetworkId::Optimism, "0xa");
        state.apply_event(&WalletEvent::AccountsChanged(vec!["garbage".to_string()]));
        assert!(state.account.is_some());
    }

    #[test]
    fn test_view_labels() {
        let registry = NetworkRegistry::load();
        let unit = parse_unit_price("0.05").unwrap();

        let mut state = ControllerState::new(NetworkId::Optimism, 20);
        assert_eq!(state.view(&registry, unit).action_label, "Connect Wallet");

        state.account = Some(ACCOUNT.parse().unwrap());
        state.chain_id = Some("0x1".to_string());
        assert_eq!(state.view(&registry, unit).action_label, "Switch to Optimism");

        state.in_flight.switching = true;
        let view = state.view(&registry, unit);
        assert_eq!(view.action_label, "Switching...");
        assert!(!view.action_enabled);
        assert!(!view.can_increment);

        state.in_flight.switching = false;
        state.chain_id = Some("0xa".to_string());
        state.quantity.adjust(2);
        let view = state.view(&registry, unit);
        assert_eq!(view.action_label, "Mint 3 NFT(s)");
        assert_eq!(view.total_cost, "0.15");
        let short = view.account_short.unwrap();
        assert!(short.starts_with("0x0000..."));
        assert!(short.to_lowercase().ends_with("00aa"));
    }

    #[test]
    fn test_view_tx_link_uses_submission_network() {
        let registry = NetworkRegistry::load();
        let mut state = connected(NetworkId::Arbitrum, "0xa4b1");
        state.last_tx = Some(SubmittedTx {
            hash: TxHash::new("0xfeed"),
            network: NetworkId::Arbitrum,
            quantity: 1,
        });
        state.selected = NetworkId::Optimism;

        let view = state.view(&registry, U256::ZERO);
        assert_eq!(
            view.tx.unwrap().explorer_url.as_deref(),
            Some("https://arbiscan.io/tx/0xfeed")
        );
    }

    #[test]
    fn test_mint_disabled_without_binding() {
        let registry = NetworkRegistry::with_bindings(vec![]);
        let state = connected(NetworkId::Optimism, "0xa");
        let view = state.view(&registry, U256::ZERO);
        assert_eq!(view.action, PrimaryAction::Mint);
        assert!(!view.action_enabled);
    }
}
