//! mint-api: HTTP surface for the mint dApp
//!
//! Serves the mint page and relays wallet traffic between the page's
//! injected provider and the mint controller.

pub mod bridge;
pub mod dto;
pub mod gallery;
pub mod page;
pub mod routes;
pub mod server;
pub mod state;

pub use bridge::{BridgeRequest, BridgeWallet};
pub use server::*;
pub use state::{AppState, Controller};
