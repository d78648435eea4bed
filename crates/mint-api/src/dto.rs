//! Request and response types for the HTTP surface

use mint_core::NetworkId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use wallet_client::ProviderError;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkRequest {
    pub network: NetworkId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuantityRequest {
    pub delta: i32,
}

/// Outcome of one wallet request as reported by the page
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BridgeReply {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<ProviderError>,
}

impl BridgeReply {
    pub fn into_outcome(self) -> Result<Value, ProviderError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HelloResponse {
    pub session: u64,
    pub dropped_requests: usize,
}

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("not_found", message)
    }
}
