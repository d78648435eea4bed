//! Contract binding: deployed address plus ABI-driven call encoding

use std::str::FromStr;

use alloy_dyn_abi::{DynSolValue, JsonAbiExt};
use alloy_json_abi::JsonAbi;
use alloy_primitives::Address;
use mint_core::{Error, NetworkId, Result};

#[derive(Debug, Clone)]
pub struct ContractBinding {
    network: NetworkId,
    address: Address,
    abi: JsonAbi,
}

impl ContractBinding {
    pub fn new(network: NetworkId, address: Address, abi: JsonAbi) -> Self {
        Self {
            network,
            address,
            abi,
        }
    }

    /// Parse an address string and a JSON ABI document
    pub fn from_json(network: NetworkId, address: &str, abi_json: &str) -> Result<Self> {
        let address = Address::from_str(address)
            .map_err(|e| Error::Binding(format!("invalid contract address {address}: {e}")))?;
        let abi: JsonAbi = serde_json::from_str(abi_json)
            .map_err(|e| Error::Binding(format!("invalid ABI for {network}: {e}")))?;
        Ok(Self::new(network, address, abi))
    }

    pub fn network(&self) -> NetworkId {
        self.network
    }

    pub fn address_checksummed(&self) -> String {
        self.address.to_checksum(None)
    }

    /// Selector-prefixed call data for `name(args...)`
    ///
    /// Overloads are resolved by argument count.
    pub fn encode_call(&self, name: &str, args: &[DynSolValue]) -> Result<Vec<u8>> {
        let function = self
            .abi
            .function(name)
            .and_then(|overloads| overloads.iter().find(|f| f.inputs.len() == args.len()))
            .ok_or_else(|| {
                Error::Binding(format!(
                    "no function {name} taking {} argument(s) on {}",
                    args.len(),
                    self.network
                ))
            })?;

        function
            .abi_encode_input(args)
            .map_err(|e| Error::Binding(format!("failed to encode {name}: {e}")))
    }
}
