//! Configuration types for Carnival Wallet

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{CAR_TOKEN_ADDRESS, DEFAULT_DECIMALS, SEPOLIA_CHAIN_ID};
use crate::{ChainId, Error};

/// Wallet API connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL including the version prefix (e.g., "http://127.0.0.1:3000/v1")
    pub base_url: String,

    /// Per-request timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000/v1".to_string(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Confirmation polling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Balance checks before giving up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before each check
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

fn default_max_attempts() -> u32 {
    60
}

fn default_interval_ms() -> u64 {
    1000
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            interval_ms: default_interval_ms(),
        }
    }
}

/// Secondary token served by the token lane
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// ERC-20 contract address
    pub address: String,

    pub symbol: String,

    #[serde(default = "default_decimals")]
    pub decimals: u8,

    /// The only chain the token lane operates on
    #[serde(default = "default_chain_id")]
    pub chain_id: ChainId,
}

fn default_decimals() -> u8 {
    DEFAULT_DECIMALS
}

fn default_chain_id() -> ChainId {
    SEPOLIA_CHAIN_ID
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            address: CAR_TOKEN_ADDRESS.to_string(),
            symbol: "CAR".to_string(),
            decimals: default_decimals(),
            chain_id: default_chain_id(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub poll: PollConfig,

    #[serde(default)]
    pub token: TokenConfig,

    /// Chain selected when a session does not name one
    #[serde(default = "default_chain_id")]
    pub default_chain_id: ChainId,

    /// HTTP server port
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Treasury receiving NFT purchase payments
    #[serde(default)]
    pub shop_address: Option<String>,
}

fn default_api_port() -> u16 {
    19080
}

impl AppConfig {
    /// Load from a JSON file. Missing sections fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&raw).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Apply `CARNIVAL_*` environment overrides
    pub fn apply_env(&mut self) -> Result<(), Error> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), Error> {
        if let Some(url) = lookup("CARNIVAL_API_URL") {
            self.api.base_url = url;
        }
        if let Some(port) = lookup("CARNIVAL_API_PORT") {
            self.api_port = port
                .parse()
                .map_err(|_| Error::Config(format!("invalid CARNIVAL_API_PORT '{}'", port)))?;
        }
        if let Some(shop) = lookup("CARNIVAL_SHOP_ADDRESS") {
            self.shop_address = Some(shop);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.api.base_url, "http://127.0.0.1:3000/v1");
        assert_eq!(config.poll.max_attempts, 60);
        assert_eq!(config.poll.interval(), Duration::from_secs(1));
        assert_eq!(config.token.symbol, "CAR");
        assert_eq!(config.default_chain_id, SEPOLIA_CHAIN_ID);
        assert_eq!(config.api_port, 19080);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let json = r#"{"api": {"base_url": "https://wallet.example/v1"}, "poll": {"max_attempts": 5}}"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.api.base_url, "https://wallet.example/v1");
        assert_eq!(config.api.request_timeout_secs, 30);
        assert_eq!(config.poll.max_attempts, 5);
        assert_eq!(config.poll.interval_ms, 1000);
        assert_eq!(config.token.address, CAR_TOKEN_ADDRESS);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_overrides(|key| match key {
                "CARNIVAL_API_URL" => Some("http://proxy:8080/v1".to_string()),
                "CARNIVAL_API_PORT" => Some("8081".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.api.base_url, "http://proxy:8080/v1");
        assert_eq!(config.api_port, 8081);
        assert!(config.shop_address.is_none());

        let err = config
            .apply_overrides(|key| (key == "CARNIVAL_API_PORT").then(|| "abc".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
