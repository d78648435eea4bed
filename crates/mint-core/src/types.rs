//! Core type definitions for the mint dApp

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported network identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkId {
    Optimism,
    Arbitrum,
}

impl NetworkId {
    /// All supported networks, in selector order
    pub const ALL: [NetworkId; 2] = [NetworkId::Optimism, NetworkId::Arbitrum];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Optimism => "optimism",
            Self::Arbitrum => "arbitrum",
        }
    }

    /// Label used on the network selector and switch button
    pub fn label(&self) -> &'static str {
        match self {
            Self::Optimism => "Optimism",
            Self::Arbitrum => "Arbitrum",
        }
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NetworkId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "optimism" => Ok(Self::Optimism),
            "arbitrum" => Ok(Self::Arbitrum),
            other => Err(format!("unsupported network: {other}")),
        }
    }
}

/// EIP-155 chain ID, carried on the wire as a `0x`-prefixed hex string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChainId(pub u64);

impl ChainId {
    /// Parse a hex chain ID as reported by a wallet (`0xa`, `0xA4B1`, ...)
    pub fn from_hex(s: &str) -> Option<Self> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))?;
        if digits.is_empty() {
            return None;
        }
        u64::from_str_radix(digits, 16).ok().map(Self)
    }

    pub fn to_hex(&self) -> String {
        format!("{:#x}", self.0)
    }

    /// Case-insensitive comparison against a wallet-reported hex value
    pub fn matches_hex(&self, reported: &str) -> bool {
        reported.eq_ignore_ascii_case(&self.to_hex())
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl TryFrom<String> for ChainId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value).ok_or_else(|| format!("invalid hex chain id: {value}"))
    }
}

impl From<ChainId> for String {
    fn from(id: ChainId) -> Self {
        id.to_hex()
    }
}

/// Transaction hash (32 bytes, hex-encoded)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(pub String);

impl TxHash {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `0x1234abcd...89abcdef` form for compact display
    pub fn short(&self) -> String {
        let chars = self.0.chars().count();
        if chars <= 18 {
            return self.0.clone();
        }
        let head: String = self.0.chars().take(10).collect();
        let tail: String = self.0.chars().skip(chars - 8).collect();
        format!("{head}...{tail}")
    }

    /// `0x` followed by 64 hex digits
    pub fn is_well_formed(hash: &str) -> bool {
        hash.strip_prefix("0x")
            .is_some_and(|digits| digits.len() == 64 && digits.bytes().all(|b| b.is_ascii_hexdigit()))
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Native currency descriptor (EIP-3085)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl NativeCurrency {
    pub fn ether() -> Self {
        Self {
            name: "Ether".to_string(),
            symbol: "ETH".to_string(),
            decimals: 18,
        }
    }
}

/// Chain parameters for a supported network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDescriptor {
    pub id: NetworkId,
    pub chain_id: ChainId,
    pub display_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
}

impl NetworkDescriptor {
    /// Primary block explorer base URL, always ending in `/`
    pub fn explorer_base(&self) -> Option<String> {
        self.block_explorer_urls.first().map(|url| {
            if url.ends_with('/') {
                url.clone()
            } else {
                format!("{url}/")
            }
        })
    }

    pub fn tx_url(&self, hash: &TxHash) -> Option<String> {
        self.explorer_base().map(|base| format!("{base}tx/{hash}"))
    }

    pub fn address_url(&self, address: &str) -> Option<String> {
        self.explorer_base()
            .map(|base| format!("{base}address/{address}"))
    }
}
