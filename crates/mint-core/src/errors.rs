//! Error types for the mint dApp

use thiserror::Error;

use crate::ChainId;

/// Core errors outside the wallet interaction flow
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Contract binding error: {0}")]
    Binding(String),
}

/// Failures of a controller operation, stored for display rather than propagated
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MintError {
    /// No injected wallet in this browsing context
    #[error("Wallet not available")]
    CapabilityAbsent,

    #[error("No accounts returned by wallet")]
    NoAccounts,

    #[error("Wallet not connected")]
    NotConnected,

    #[error("Declined by user")]
    UserRejected,

    #[error("Wrong network: requires {required}, wallet is on {current}")]
    NetworkMismatch { required: ChainId, current: String },

    /// Wallet does not have the chain configured; add-then-switch follows
    #[error("Wallet does not recognize chain {chain_id}")]
    UnrecognizedChain { chain_id: ChainId },

    #[error("Insufficient funds")]
    InsufficientFunds,

    #[error("Contract unavailable: {reason}")]
    ContractUnavailable { reason: String },

    #[error("{context}: {message}")]
    GenericFailure { context: String, message: String },
}

/// Result type alias for mint-core operations
pub type Result<T> = std::result::Result<T, Error>;

impl MintError {
    pub fn generic(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::GenericFailure {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Stable machine-readable code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::CapabilityAbsent => "capability_absent",
            Self::NoAccounts => "no_accounts",
            Self::NotConnected => "not_connected",
            Self::UserRejected => "user_rejected",
            Self::NetworkMismatch { .. } => "network_mismatch",
            Self::UnrecognizedChain { .. } => "unrecognized_chain",
            Self::InsufficientFunds => "insufficient_funds",
            Self::ContractUnavailable { .. } => "contract_unavailable",
            Self::GenericFailure { .. } => "generic_failure",
        }
    }

    /// Short text shown inline under the action button
    pub fn user_message(&self) -> String {
        match self {
            Self::CapabilityAbsent => "MetaMask is not installed".to_string(),
            Self::NoAccounts => "No accounts available in wallet".to_string(),
            Self::NotConnected => "System not ready. Check connection.".to_string(),
            Self::UserRejected => "Transaction denied by user".to_string(),
            Self::NetworkMismatch { .. } => "Wrong network detected.".to_string(),
            Self::UnrecognizedChain { .. } => "Network is not configured in wallet".to_string(),
            Self::InsufficientFunds => "Insufficient funds for this mint".to_string(),
            Self::ContractUnavailable { .. } => "System not ready. Check connection.".to_string(),
            Self::GenericFailure { .. } => self.to_string(),
        }
    }
}
