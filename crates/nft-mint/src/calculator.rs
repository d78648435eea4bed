//! Quantity and cost arithmetic
//!
//! Pure functions, no I/O. Amounts are wei (`U256`), 1 ETH = 10^18 wei.

use alloy_primitives::{utils::parse_ether, U256};
use mint_core::{Error, Result};

use crate::params;

/// Number of tokens to mint, clamped to `[MIN_QUANTITY, max]` with `max <= MAX_QUANTITY`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantity {
    value: u32,
    max: u32,
}

impl Quantity {
    pub fn new(max: u32) -> Self {
        Self {
            value: params::MIN_QUANTITY,
            max: max.clamp(params::MIN_QUANTITY, params::MAX_QUANTITY),
        }
    }

    pub fn get(&self) -> u32 {
        self.value
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    /// Step by `delta`; out-of-range results saturate at the bounds
    pub fn adjust(&mut self, delta: i32) {
        let next = i64::from(self.value) + i64::from(delta);
        self.value = next.clamp(i64::from(params::MIN_QUANTITY), i64::from(self.max)) as u32;
    }

    pub fn can_increment(&self) -> bool {
        self.value < self.max
    }

    pub fn can_decrement(&self) -> bool {
        self.value > params::MIN_QUANTITY
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::new(params::MAX_QUANTITY)
    }
}

/// Parse a decimal ether amount ("0.05") into wei without rounding
pub fn parse_unit_price(eth: &str) -> Result<U256> {
    parse_ether(eth.trim()).map_err(|e| Error::Config(format!("invalid unit price {eth:?}: {e}")))
}

/// quantity × unit price, in wei
pub fn total_cost_wei(quantity: u32, unit_price_wei: U256) -> U256 {
    unit_price_wei * U256::from(quantity)
}

/// Render wei as ether with at least `min_decimals` fractional digits
pub fn format_eth(wei: U256, min_decimals: usize) -> String {
    let base = U256::from(10u64).pow(U256::from(18u64));
    let whole = wei / base;
    let frac = wei % base;

    let mut frac_digits = format!("{:0>18}", frac.to_string());
    while frac_digits.len() > min_decimals && frac_digits.ends_with('0') {
        frac_digits.pop();
    }

    if frac_digits.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{frac_digits}")
    }
}

/// `0x`-prefixed hex quantity as used in JSON-RPC `value` fields
pub fn to_rpc_quantity(wei: U256) -> String {
    format!("0x{wei:x}")
}
