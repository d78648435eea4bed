//! Purchase transaction building
//!
//! Encodes `purchase(quantity)` against a contract binding and prices it.

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, U256};
use mint_core::Result;
use wallet_client::TransactionRequest;

use crate::binding::ContractBinding;
use crate::calculator::{to_rpc_quantity, total_cost_wei};
use crate::params;

/// Summary of a purchase before it is sent to the wallet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseTx {
    pub quantity: u32,
    pub value_wei: U256,
    pub request: TransactionRequest,
}

/// Call data for `purchase(quantity)`
pub fn encode_purchase(binding: &ContractBinding, quantity: u32) -> Result<Vec<u8>> {
    binding.encode_call(
        params::PURCHASE_FUNCTION,
        &[DynSolValue::Uint(U256::from(quantity), 256)],
    )
}

/// Build the `eth_sendTransaction` payload for a purchase
pub fn build_purchase_tx(
    binding: &ContractBinding,
    from: Address,
    quantity: u32,
    unit_price_wei: U256,
) -> Result<PurchaseTx> {
    let data = encode_purchase(binding, quantity)?;
    let value_wei = total_cost_wei(quantity, unit_price_wei);

    Ok(PurchaseTx {
        quantity,
        value_wei,
        request: TransactionRequest {
            from: from.to_checksum(None),
            to: binding.address_checksummed(),
            data: format!("0x{}", hex::encode(&data)),
            value: to_rpc_quantity(value_wei),
        },
    })
}
