//! Core type definitions for Carnival Wallet

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Transaction ID as returned by the wallet API
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxId(pub String);

impl TxId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Wallet address (hex, `0x`-prefixed on EVM chains).
///
/// No format validation happens here; the wallet API owns that.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(pub String);

impl Address {
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// EVM chain ID
pub type ChainId = u64;

/// Independent transfer lane (one state machine per asset kind)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lane {
    /// Chain-native currency (ETH, MATIC, ...)
    Native,
    /// Secondary ERC-20 token (CAR)
    Token,
}

impl Lane {
    pub const ALL: [Lane; 2] = [Lane::Native, Lane::Token];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Token => "token",
        }
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Lane {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "native" => Ok(Self::Native),
            "token" => Ok(Self::Token),
            other => Err(format!("unknown lane '{}'", other)),
        }
    }
}

/// Raw balance value used for change detection.
///
/// Compared for equality only. The API's raw value is an opaque token here,
/// never parsed as a number. A response without a value yields no snapshot
/// at all, so "nothing observed" can never look like a change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BalanceSnapshot(pub String);

impl BalanceSnapshot {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

/// Supported network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Chain {
    pub chain_id: ChainId,
    pub name: &'static str,
    pub symbol: &'static str,
    pub is_testnet: bool,
}

impl Chain {
    const fn new(chain_id: ChainId, name: &'static str, symbol: &'static str, is_testnet: bool) -> Self {
        Self {
            chain_id,
            name,
            symbol,
            is_testnet,
        }
    }

    /// Look up a chain from the catalog
    pub fn by_id(chain_id: ChainId) -> Option<&'static Chain> {
        SUPPORTED_CHAINS.iter().find(|c| c.chain_id == chain_id)
    }
}

/// Chains the wallet can operate on
pub const SUPPORTED_CHAINS: &[Chain] = &[
    Chain::new(1, "Ethereum Mainnet", "ETH", false),
    Chain::new(constants::SEPOLIA_CHAIN_ID, "Sepolia Testnet", "ETH", true),
    Chain::new(8453, "Base", "ETH", false),
    Chain::new(84532, "Base Sepolia", "ETH", true),
    Chain::new(137, "Polygon", "MATIC", false),
    Chain::new(56, "BSC", "BNB", false),
    Chain::new(42161, "Arbitrum", "ETH", false),
    Chain::new(10, "Optimism", "ETH", false),
];

/// Constants
pub mod constants {
    use super::ChainId;

    /// Decimal places of native currencies and most ERC-20 tokens
    pub const DEFAULT_DECIMALS: u8 = 18;

    /// Sepolia testnet, the default chain and home of the CAR token
    pub const SEPOLIA_CHAIN_ID: ChainId = 11_155_111;

    /// CAR token contract on Sepolia
    pub const CAR_TOKEN_ADDRESS: &str = "0x72f5dE906CccE499278525C6D4222378a6AEe368";

    /// Advisory shown when confirmation polling gives up
    pub const VERIFICATION_TIMEOUT_ADVISORY: &str =
        "Transaction verification timed out - check transaction status manually";
}
