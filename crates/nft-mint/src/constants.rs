//! Network Configuration Registry
//!
//! Chain parameters and deployed contract for each supported network.

use std::collections::HashMap;

use mint_core::{ChainId, NativeCurrency, NetworkDescriptor, NetworkId};

use crate::binding::ContractBinding;

/// OP Mainnet
pub mod optimism {
    pub const CHAIN_ID: u64 = 10;
    pub const CHAIN_NAME: &str = "OP Mainnet";
    pub const RPC_URL: &str = "https://mainnet.optimism.io";
    pub const EXPLORER_URL: &str = "https://optimistic.etherscan.io/";
    pub const CONTRACT_ADDRESS: &str = "0x24b8b90c6050dD066e595027831A863D0906c5A7";
    pub const ABI_JSON: &str = include_str!("abi/optimism.json");
}

/// Arbitrum One
pub mod arbitrum {
    pub const CHAIN_ID: u64 = 42161;
    pub const CHAIN_NAME: &str = "Arbitrum One";
    pub const RPC_URL: &str = "https://arb1.arbitrum.io/rpc";
    pub const EXPLORER_URL: &str = "https://arbiscan.io/";
    pub const CONTRACT_ADDRESS: &str = "0x24b8b90c6050dD066e595027831A863D0906c5A7";
    pub const ABI_JSON: &str = include_str!("abi/arbitrum.json");
}

/// Mint parameters
pub mod params {
    /// Contract function that mints and pays in one call
    pub const PURCHASE_FUNCTION: &str = "purchase";

    pub const MIN_QUANTITY: u32 = 1;
    pub const MAX_QUANTITY: u32 = mint_core::MAX_PER_TX_LIMIT;
}

/// Static chain parameters for a network
pub fn network_descriptor(id: NetworkId) -> NetworkDescriptor {
    let (chain_id, name, rpc, explorer) = match id {
        NetworkId::Optimism => (
            optimism::CHAIN_ID,
            optimism::CHAIN_NAME,
            optimism::RPC_URL,
            optimism::EXPLORER_URL,
        ),
        NetworkId::Arbitrum => (
            arbitrum::CHAIN_ID,
            arbitrum::CHAIN_NAME,
            arbitrum::RPC_URL,
            arbitrum::EXPLORER_URL,
        ),
    };

    NetworkDescriptor {
        id,
        chain_id: ChainId(chain_id),
        display_name: name.to_string(),
        native_currency: NativeCurrency::ether(),
        rpc_urls: vec![rpc.to_string()],
        block_explorer_urls: vec![explorer.to_string()],
    }
}

fn contract_source(id: NetworkId) -> (&'static str, &'static str) {
    match id {
        NetworkId::Optimism => (optimism::CONTRACT_ADDRESS, optimism::ABI_JSON),
        NetworkId::Arbitrum => (arbitrum::CONTRACT_ADDRESS, arbitrum::ABI_JSON),
    }
}

/// Descriptors and contract bindings for every supported network
#[derive(Debug, Clone)]
pub struct NetworkRegistry {
    networks: HashMap<NetworkId, NetworkDescriptor>,
    bindings: HashMap<NetworkId, ContractBinding>,
}

impl NetworkRegistry {
    /// Build the registry from the bundled configuration.
    ///
    /// A network whose contract binding fails to load stays selectable;
    /// minting on it reports the contract as unavailable.
    pub fn load() -> Self {
        let mut networks = HashMap::new();
        let mut bindings = HashMap::new();

        for id in NetworkId::ALL {
            networks.insert(id, network_descriptor(id));

            let (address, abi_json) = contract_source(id);
            match ContractBinding::from_json(id, address, abi_json) {
                Ok(binding) => {
                    bindings.insert(id, binding);
                }
                Err(e) => {
                    tracing::warn!("Contract binding for {} unavailable: {}", id, e);
                }
            }
        }

        Self { networks, bindings }
    }

    /// Registry with explicitly supplied bindings
    pub fn with_bindings(bindings: Vec<ContractBinding>) -> Self {
        Self {
            networks: NetworkId::ALL
                .into_iter()
                .map(|id| (id, network_descriptor(id)))
                .collect(),
            bindings: bindings.into_iter().map(|b| (b.network(), b)).collect(),
        }
    }

    pub fn network(&self, id: NetworkId) -> &NetworkDescriptor {
        // every NetworkId is inserted at construction
        &self.networks[&id]
    }

    pub fn binding(&self, id: NetworkId) -> Option<&ContractBinding> {
        self.bindings.get(&id)
    }

    /// Supported network for a wallet-reported chain ID, if any
    pub fn network_for_chain(&self, reported: &str) -> Option<NetworkId> {
        NetworkId::ALL
            .into_iter()
            .find(|id| self.network(*id).chain_id.matches_hex(reported))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_ids() {
        assert_eq!(network_descriptor(NetworkId::Optimism).chain_id.to_hex(), "0xa");
        assert_eq!(network_descriptor(NetworkId::Arbitrum).chain_id.to_hex(), "0xa4b1");
    }

    #[test]
    fn test_registry_loads_both_bindings() {
        let registry = NetworkRegistry::load();
        for id in NetworkId::ALL {
            let binding = registry.binding(id).unwrap();
            assert_eq!(binding.network(), id);
            assert_eq!(
                binding.address_checksummed(),
                "0x24b8b90c6050dD066e595027831A863D0906c5A7"
            );
        }
    }

    #[test]
    fn test_network_for_chain() {
        let registry = NetworkRegistry::load();
        assert_eq!(registry.network_for_chain("0xA4B1"), Some(NetworkId::Arbitrum));
        assert_eq!(registry.network_for_chain("0xa"), Some(NetworkId::Optimism));
        assert_eq!(registry.network_for_chain("0x1"), None);
    }

    #[test]
    fn test_with_bindings_missing_network() {
        let registry = NetworkRegistry::with_bindings(vec![]);
        assert!(registry.binding(NetworkId::Optimism).is_none());
        assert_eq!(registry.network(NetworkId::Optimism).display_name, "OP Mainnet");
    }
}
