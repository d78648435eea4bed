//! NFT Mint Flow
//!
//! Gates an ERC721A `purchase` call behind wallet connection and network
//! correctness on the two supported networks.
//!
//! # Features
//!
//! - Static network registry and per-network contract bindings
//! - Exact wei arithmetic for quantity × unit price
//! - Purchase call encoding from the bundled ABI
//! - The connect / switch / mint state machine over an injected wallet
//!
//! # Example
//!
//! ```ignore
//! let controller = MintController::new(provider, Arc::new(NetworkRegistry::load()), settings);
//! controller.activate().await;
//! controller.connect().await;
//! controller.mint().await;
//! println!("{:?}", controller.view().await.tx);
//! ```

pub mod binding;
pub mod calculator;
pub mod constants;
pub mod controller;
pub mod state;
pub mod tx_builder;

pub use binding::ContractBinding;
pub use calculator::*;
pub use constants::*;
pub use controller::{classify_mint_failure, deep_link, MintController, MintSettings};
pub use state::*;
pub use tx_builder::*;
