//! Wire types for the wallet API
//!
//! Field names follow the API's camelCase JSON except where noted.

use carnival_core::{BalanceSnapshot, ChainId, TxId};
use serde::{Deserialize, Serialize};

/// Envelope used by every wallet API response
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub result: T,
}

/// Payment recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub address: String,
    /// Smallest-unit amount as a base-10 string
    pub quantity: String,
}

/// Body of `POST /wallets/send`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTokenRequest {
    pub from: String,
    pub chain_id: ChainId,
    pub recipients: Vec<Recipient>,
}

/// Result of `POST /wallets/send`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTransactionResponse {
    #[serde(default)]
    pub transaction_ids: Vec<String>,
}

impl SendTransactionResponse {
    pub fn first_tx_id(&self) -> Option<TxId> {
        self.transaction_ids
            .iter()
            .find(|id| !id.trim().is_empty())
            .map(TxId::new)
    }
}

/// Body of `POST /contracts/car-token/transfer`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenTransferRequest {
    pub to_address: String,
    /// Smallest-unit amount as a base-10 string
    pub amount: String,
    pub from_address: String,
}

/// Result of `POST /contracts/car-token/transfer`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenTransferResponse {
    pub transaction_hash: Option<String>,
    pub transaction_id: Option<String>,
    pub message: Option<String>,
}

impl TokenTransferResponse {
    /// Queue/transaction id, falling back to the transaction hash
    pub fn tx_id(&self) -> Option<TxId> {
        [&self.transaction_id, &self.transaction_hash]
            .into_iter()
            .flatten()
            .find(|id| !id.trim().is_empty())
            .map(TxId::new)
    }
}

/// One entry of `GET /wallets/{address}/balance`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletBalance {
    pub chain_id: Option<ChainId>,
    pub decimals: Option<u8>,
    pub display_value: Option<String>,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub token_address: Option<String>,
    /// Raw smallest-unit balance
    pub value: Option<String>,
}

/// Snapshot of the first balance entry's value.
///
/// `None` when the list is empty or the entry has no value.
pub fn first_snapshot(balances: &[WalletBalance]) -> Option<BalanceSnapshot> {
    balances
        .first()
        .and_then(|b| b.value.as_deref())
        .map(BalanceSnapshot::new)
}

/// One entry of `GET /wallets/{address}/tokens`.
///
/// This endpoint answers in snake_case; the UI receives camelCase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase", deserialize = "snake_case"))]
pub struct TokenHolding {
    pub chain_id: Option<ChainId>,
    pub token_address: Option<String>,
    pub owner_address: Option<String>,
    /// Raw smallest-unit balance
    pub balance: Option<String>,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub decimals: Option<u8>,
}

/// Result of `GET /wallets/{address}/tokens`; pagination is ignored
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokensPage {
    #[serde(default)]
    pub tokens: Vec<TokenHolding>,
}

/// Body of `POST /verify-balance-change`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyBalanceChangeRequest {
    pub wallet_address: String,
    pub chain_id: ChainId,
    /// Signed human amount, e.g. "-0.001" for an outgoing transfer
    pub expected_change: String,
    pub token_address: Option<String>,
}

/// Result of `POST /verify-balance-change`.
///
/// A body without a boolean `result` counts as "not verified".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyBalanceChangeResponse {
    #[serde(default)]
    pub result: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_request_wire_format() {
        let request = SendTokenRequest {
            from: "0xA".into(),
            chain_id: 11155111,
            recipients: vec![Recipient {
                address: "0xB".into(),
                quantity: "1000000000000000".into(),
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "from": "0xA",
                "chainId": 11155111,
                "recipients": [{"address": "0xB", "quantity": "1000000000000000"}]
            })
        );
    }

    #[test]
    fn test_send_response_without_ids() {
        let parsed: ApiResponse<SendTransactionResponse> =
            serde_json::from_str(r#"{"result": {}}"#).unwrap();
        assert!(parsed.result.first_tx_id().is_none());

        let parsed: ApiResponse<SendTransactionResponse> =
            serde_json::from_str(r#"{"result": {"transactionIds": ["", "0xabc"]}}"#).unwrap();
        assert_eq!(parsed.result.first_tx_id(), Some(TxId::new("0xabc")));
    }

    #[test]
    fn test_token_transfer_id_fallback() {
        let response: TokenTransferResponse =
            serde_json::from_str(r#"{"transactionHash": "0xhash"}"#).unwrap();
        assert_eq!(response.tx_id(), Some(TxId::new("0xhash")));

        let response: TokenTransferResponse =
            serde_json::from_str(r#"{"transactionHash": "0xhash", "transactionId": "queue-1"}"#)
                .unwrap();
        assert_eq!(response.tx_id(), Some(TxId::new("queue-1")));

        assert!(TokenTransferResponse::default().tx_id().is_none());
    }

    #[test]
    fn test_balance_snapshot_from_entries() {
        let parsed: ApiResponse<Vec<WalletBalance>> = serde_json::from_str(
            r#"{"result": [{"chainId": 11155111, "decimals": 18, "displayValue": "0.5",
                "name": "Sepolia Ether", "symbol": "ETH", "value": "500000000000000000"}]}"#,
        )
        .unwrap();
        let snapshot = first_snapshot(&parsed.result).unwrap();
        assert_eq!(snapshot.value(), "500000000000000000");
        assert_eq!(first_snapshot(&[]), None);
        assert_eq!(first_snapshot(&[WalletBalance::default()]), None);
    }

    #[test]
    fn test_token_holding_wire_names() {
        let parsed: ApiResponse<TokensPage> = serde_json::from_str(
            r#"{"result": {"tokens": [{"token_address": "0xT", "balance": "1", "decimals": 6}]}}"#,
        )
        .unwrap();
        let holding = &parsed.result.tokens[0];
        assert_eq!(holding.token_address.as_deref(), Some("0xT"));
        assert_eq!(holding.decimals, Some(6));

        let json = serde_json::to_value(holding).unwrap();
        assert_eq!(json["tokenAddress"], "0xT");

        let empty: ApiResponse<TokensPage> = serde_json::from_str(r#"{"result": {}}"#).unwrap();
        assert!(empty.result.tokens.is_empty());
    }

    #[test]
    fn test_verify_response_lenient() {
        let parsed: VerifyBalanceChangeResponse =
            serde_json::from_str(r#"{"result": true}"#).unwrap();
        assert_eq!(parsed.result, Some(true));

        let parsed: VerifyBalanceChangeResponse =
            serde_json::from_str(r#"{"success": true, "currentBalance": "0.1"}"#).unwrap();
        assert_eq!(parsed.result, None);
    }
}
