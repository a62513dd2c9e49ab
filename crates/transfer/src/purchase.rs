//! NFT purchases
//!
//! Buying a game NFT is a transfer from the session wallet to the shop
//! treasury, on whichever lane matches the price currency.

use carnival_core::{Address, Lane, SubmitError, TxId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::TransferCoordinator;

/// Currency marker for native-currency prices
pub const NATIVE_CURRENCY: &str = "ETH";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftPrice {
    /// Human decimal amount, e.g. "0.01"
    pub amount: String,
    /// "ETH" or a token contract address
    pub currency: String,
    pub display_amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftListing {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_minted: bool,
    #[serde(default)]
    pub is_owned: bool,
    #[serde(default)]
    pub price: Option<NftPrice>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurchaseError {
    #[error("NFT {id} is not for sale")]
    NotForSale { id: String },

    #[error("NFT {id} is already owned")]
    AlreadyOwned { id: String },

    #[error("Unsupported price currency: {0}")]
    UnsupportedCurrency(String),

    #[error(transparent)]
    Submit(#[from] SubmitError),
}

impl PurchaseError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotForSale { .. } => "not_for_sale",
            Self::AlreadyOwned { .. } => "already_owned",
            Self::UnsupportedCurrency(_) => "unsupported_currency",
            Self::Submit(e) => e.error_code(),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotForSale { .. } | Self::AlreadyOwned { .. } => 409,
            Self::UnsupportedCurrency(_) => 422,
            Self::Submit(e) => e.status_code(),
        }
    }
}

impl TransferCoordinator {
    /// Lane that pays in `currency`
    pub fn lane_for_currency(&self, currency: &str) -> Option<Lane> {
        let native_symbol = carnival_core::Chain::by_id(self.session().chain_id).map(|c| c.symbol);
        if currency.eq_ignore_ascii_case(NATIVE_CURRENCY)
            || native_symbol.is_some_and(|s| currency.eq_ignore_ascii_case(s))
        {
            return Some(Lane::Native);
        }
        self.lane_spec(Lane::Token)
            .token_address()
            .filter(|address| currency.eq_ignore_ascii_case(address))
            .map(|_| Lane::Token)
    }

    /// Pay for `listing` into `shop`. Confirmation follows the normal
    /// transfer events for the chosen lane.
    pub async fn purchase_nft(
        &self,
        listing: &NftListing,
        shop: &Address,
    ) -> Result<TxId, PurchaseError> {
        if listing.is_owned {
            return Err(PurchaseError::AlreadyOwned {
                id: listing.id.clone(),
            });
        }
        let price = listing
            .price
            .as_ref()
            .filter(|_| listing.is_minted)
            .ok_or_else(|| PurchaseError::NotForSale {
                id: listing.id.clone(),
            })?;
        let lane = self
            .lane_for_currency(&price.currency)
            .ok_or_else(|| PurchaseError::UnsupportedCurrency(price.currency.clone()))?;

        tracing::info!(
            nft = %listing.id,
            %lane,
            price = %price.display_amount,
            "Purchasing NFT"
        );
        let request = self.request(lane, shop.as_str(), price.amount.as_str());
        Ok(self.submit_transfer(lane, request).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use carnival_core::constants::{CAR_TOKEN_ADDRESS, SEPOLIA_CHAIN_ID};
    use carnival_core::{PollConfig, TokenConfig};

    use crate::testing::FakeWalletApi;
    use crate::{Session, TransferState};

    use super::*;

    fn coordinator(api: &Arc<FakeWalletApi>) -> TransferCoordinator {
        TransferCoordinator::new(
            api.clone(),
            Session::new("0xBuyer", "token", SEPOLIA_CHAIN_ID),
            PollConfig::default(),
            TokenConfig::default(),
        )
    }

    fn listing(currency: &str) -> NftListing {
        NftListing {
            id: "ticket-7".into(),
            name: "Ferris Wheel Ticket".into(),
            is_minted: true,
            is_owned: false,
            price: Some(NftPrice {
                amount: "0.5".into(),
                currency: currency.into(),
                display_amount: "0.5".into(),
            }),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_eth_price_pays_on_native_lane() {
        let api = Arc::new(FakeWalletApi::new());
        let coordinator = coordinator(&api);

        let tx_id = coordinator
            .purchase_nft(&listing("ETH"), &Address::new("0xShop"))
            .await
            .unwrap();
        assert_eq!(tx_id, TxId::new("0xtx"));

        let sent = api.sent();
        assert_eq!(sent[0].from, "0xBuyer");
        assert_eq!(sent[0].recipients[0].address, "0xShop");
        assert_eq!(sent[0].recipients[0].quantity, "500000000000000000");
        assert!(matches!(
            coordinator.state(Lane::Native),
            TransferState::Verifying { .. }
        ));
        coordinator.close_all();
    }

    #[tokio::test(start_paused = true)]
    async fn test_token_price_pays_on_token_lane() {
        let api = Arc::new(FakeWalletApi::new());
        let coordinator = coordinator(&api);

        let currency = CAR_TOKEN_ADDRESS.to_lowercase();
        coordinator
            .purchase_nft(&listing(&currency), &Address::new("0xShop"))
            .await
            .unwrap();
        assert_eq!(api.calls().send, 0);
        assert_eq!(api.token_sent()[0].to_address, "0xShop");
        assert_eq!(coordinator.state(Lane::Native), TransferState::Idle);
        coordinator.close_all();
    }

    #[tokio::test]
    async fn test_rejected_listings_make_no_calls() {
        let api = Arc::new(FakeWalletApi::new());
        let coordinator = coordinator(&api);
        let shop = Address::new("0xShop");

        let mut owned = listing("ETH");
        owned.is_owned = true;
        assert!(matches!(
            coordinator.purchase_nft(&owned, &shop).await,
            Err(PurchaseError::AlreadyOwned { .. })
        ));

        let mut unpriced = listing("ETH");
        unpriced.price = None;
        assert!(matches!(
            coordinator.purchase_nft(&unpriced, &shop).await,
            Err(PurchaseError::NotForSale { .. })
        ));

        let err = coordinator
            .purchase_nft(&listing("0xdeadbeef"), &shop)
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "unsupported_currency");
        assert_eq!(api.calls().total(), 0);
    }

    #[test]
    fn test_listing_from_json() {
        let listing: NftListing = serde_json::from_str(
            r#"{"id": "1", "name": "Badge", "isMinted": true,
                "price": {"amount": "1", "currency": "ETH", "displayAmount": "1 ETH"}}"#,
        )
        .unwrap();
        assert!(!listing.is_owned);
        assert_eq!(listing.price.unwrap().display_amount, "1 ETH");
    }
}
