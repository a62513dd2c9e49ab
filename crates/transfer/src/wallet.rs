//! Cached wallet balances for the session
//!
//! Each lane keeps its latest balance, and the session keeps the wallet's
//! token holdings. Both are refreshed on demand and after every confirmed
//! transfer. A failed fetch keeps the previous value.

use std::time::{SystemTime, UNIX_EPOCH};

use carnival_core::{Address, ChainId, Lane};
use serde::Serialize;
use wallet_api_client::{TokenHolding, WalletBalance};

use crate::TransferCoordinator;

/// Wallet overview shown by the UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletData {
    pub address: Address,
    pub chain_id: ChainId,
    pub native: Option<WalletBalance>,
    /// `None` when the token is not deployed on this chain
    pub token: Option<WalletBalance>,
    /// Every ERC-20 the wallet holds on this chain
    pub tokens: Vec<TokenHolding>,
    /// Unix seconds of the last refresh
    pub refreshed_at: Option<u64>,
}

/// Session-wide part of [`WalletData`]; lane balances live on the lanes
#[derive(Debug, Default)]
pub(crate) struct WalletCache {
    pub(crate) tokens: Vec<TokenHolding>,
    pub(crate) refreshed_at: Option<u64>,
}

impl TransferCoordinator {
    pub fn wallet_data(&self) -> WalletData {
        let session = self.session();
        let cache = self.wallet_cache();
        WalletData {
            address: session.wallet_address.clone(),
            chain_id: session.chain_id,
            native: self.balance(Lane::Native),
            token: self.balance(Lane::Token),
            tokens: cache.tokens.clone(),
            refreshed_at: cache.refreshed_at,
        }
    }

    /// Re-fetch both lane balances and the token holdings
    pub async fn refresh_wallet_data(&self) -> WalletData {
        let session = self.session();

        for lane in Lane::ALL {
            let slot = self.slot(lane);
            let spec = slot.spec();
            if !spec.is_available_on(session.chain_id) {
                slot.store_balance(None);
                continue;
            }

            match self
                .api()
                .get_balance(
                    session.wallet_address.as_str(),
                    session.chain_id,
                    spec.token_address(),
                )
                .await
            {
                Ok(balances) => slot.store_balance(balances.into_iter().next()),
                Err(e) => {
                    tracing::warn!(%lane, error = %e, "Failed to refresh balance, keeping previous value");
                }
            }
        }

        let tokens = match self
            .api()
            .get_tokens(session.wallet_address.as_str(), session.chain_id)
            .await
        {
            Ok(tokens) => Some(tokens),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to refresh token holdings, keeping previous list");
                None
            }
        };

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        {
            let mut cache = self.wallet_cache();
            if let Some(tokens) = tokens {
                cache.tokens = tokens;
            }
            cache.refreshed_at = Some(now);
        }

        self.wallet_data()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use carnival_core::constants::SEPOLIA_CHAIN_ID;
    use carnival_core::{PollConfig, TokenConfig};

    use crate::testing::{network_error, FakeWalletApi};
    use crate::Session;

    use super::*;

    fn coordinator(api: &Arc<FakeWalletApi>, chain_id: ChainId) -> TransferCoordinator {
        TransferCoordinator::new(
            api.clone(),
            Session::new("0xA", "token", chain_id),
            PollConfig::default(),
            TokenConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_refresh_reads_both_lanes() {
        let api = Arc::new(
            FakeWalletApi::new()
                .with_native_balances([Ok(Some("5".to_string()))])
                .with_token_balances([Ok(Some("7".to_string()))]),
        );
        let coordinator = coordinator(&api, SEPOLIA_CHAIN_ID);
        assert_eq!(coordinator.wallet_data().refreshed_at, None);

        let data = coordinator.refresh_wallet_data().await;
        assert_eq!(data.native.and_then(|b| b.value), Some("5".to_string()));
        assert_eq!(data.token.and_then(|b| b.value), Some("7".to_string()));
        assert!(data.refreshed_at.is_some());
        assert!(data.tokens.is_empty());
        assert_eq!(api.calls().balance, 2);
        assert_eq!(api.calls().tokens, 1);
    }

    #[tokio::test]
    async fn test_refresh_lists_tokens_and_keeps_them_on_error() {
        let holding = TokenHolding {
            chain_id: Some(SEPOLIA_CHAIN_ID),
            token_address: Some("0xToken".to_string()),
            balance: Some("2500".to_string()),
            symbol: Some("CAR".to_string()),
            ..Default::default()
        };
        let api = Arc::new(FakeWalletApi::new().with_tokens([Ok(vec![holding.clone()])]));
        let coordinator = coordinator(&api, SEPOLIA_CHAIN_ID);

        let data = coordinator.refresh_wallet_data().await;
        assert_eq!(data.tokens, vec![holding.clone()]);

        api.set_tokens([Err(network_error())]);
        let data = coordinator.refresh_wallet_data().await;
        assert_eq!(data.tokens, vec![holding]);
        assert_eq!(api.calls().tokens, 2);

        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["tokens"][0]["tokenAddress"], "0xToken");
        assert_eq!(json["tokens"][0]["symbol"], "CAR");
    }

    #[tokio::test]
    async fn test_refresh_keeps_previous_on_error() {
        let api = Arc::new(FakeWalletApi::new().with_native_balances([Ok(Some("5".to_string()))]));
        let coordinator = coordinator(&api, SEPOLIA_CHAIN_ID);
        coordinator.refresh_wallet_data().await;

        api.set_native_balances([Err(network_error())]);
        let data = coordinator.refresh_wallet_data().await;
        assert_eq!(data.native.and_then(|b| b.value), Some("5".to_string()));
    }

    #[tokio::test]
    async fn test_token_skipped_off_chain() {
        let api = Arc::new(FakeWalletApi::new());
        let coordinator = coordinator(&api, 1);

        let data = coordinator.refresh_wallet_data().await;
        assert!(data.native.is_some());
        assert_eq!(data.token, None);
        assert_eq!(api.calls().balance, 1);
    }

    #[test]
    fn test_wallet_data_json_shape() {
        let api = Arc::new(FakeWalletApi::new());
        let coordinator = coordinator(&api, 1);
        let json = serde_json::to_value(coordinator.wallet_data()).unwrap();
        assert_eq!(json["address"], "0xA");
        assert_eq!(json["chainId"], 1);
        assert_eq!(json["tokens"], serde_json::json!([]));
        assert!(json["refreshedAt"].is_null());
    }
}
