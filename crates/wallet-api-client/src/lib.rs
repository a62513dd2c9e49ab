//! wallet-api-client: Client for the wallet-as-a-service HTTP API
//!
//! [`WalletApi`] is the seam the transfer coordinator depends on;
//! [`WalletApiClient`] implements it over `reqwest`.

pub mod models;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use carnival_core::{ApiConfig, ApiError, ChainId};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub use models::*;

/// Result type for wallet API operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// Operations the transfer flow needs from the wallet API
#[async_trait]
pub trait WalletApi: Send + Sync {
    /// `POST /wallets/send` (bearer-authenticated)
    async fn send_tokens(
        &self,
        auth_token: &str,
        request: &SendTokenRequest,
    ) -> Result<SendTransactionResponse>;

    /// `POST /contracts/car-token/transfer` (bearer-authenticated)
    async fn transfer_token(
        &self,
        auth_token: &str,
        request: &TokenTransferRequest,
    ) -> Result<TokenTransferResponse>;

    /// `GET /wallets/{address}/balance`, optionally scoped to one ERC-20
    async fn get_balance(
        &self,
        address: &str,
        chain_id: ChainId,
        token_address: Option<&str>,
    ) -> Result<Vec<WalletBalance>>;

    /// `POST /verify-balance-change`
    async fn verify_balance_change(&self, request: &VerifyBalanceChangeRequest) -> Result<bool>;

    /// `GET /wallets/{address}/tokens`, every ERC-20 the wallet holds
    async fn get_tokens(&self, address: &str, chain_id: ChainId) -> Result<Vec<TokenHolding>>;
}

/// HTTP implementation of [`WalletApi`]
#[derive(Clone)]
pub struct WalletApiClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl WalletApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("carnival-wallet")
            .build()
            .map_err(|e| ApiError::Unreachable {
                url: config.base_url.clone(),
                message: e.to_string(),
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.request_timeout(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Append path segments to the base URL, percent-encoding each one
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let invalid = |message: String| ApiError::Unreachable {
            url: self.base_url.clone(),
            message,
        };
        let mut url = Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, query: &[(&str, String)]) -> Result<T> {
        tracing::debug!(%url, "GET");
        let request = self.http.get(url.clone()).query(query);
        timed_request(self.timeout, async {
            let response = request
                .send()
                .await
                .map_err(|e| unreachable(url.as_str(), e))?;
            decode(response).await
        })
        .await
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
        auth_token: Option<&str>,
    ) -> Result<T> {
        tracing::debug!(%url, "POST");
        let mut request = self.http.post(url.clone()).json(body);
        if let Some(token) = auth_token {
            request = request.bearer_auth(token);
        }
        timed_request(self.timeout, async {
            let response = request
                .send()
                .await
                .map_err(|e| unreachable(url.as_str(), e))?;
            decode(response).await
        })
        .await
    }
}

#[async_trait]
impl WalletApi for WalletApiClient {
    async fn send_tokens(
        &self,
        auth_token: &str,
        request: &SendTokenRequest,
    ) -> Result<SendTransactionResponse> {
        let response: ApiResponse<SendTransactionResponse> = self
            .post_json(self.url(&["wallets", "send"])?, request, Some(auth_token))
            .await?;
        Ok(response.result)
    }

    async fn transfer_token(
        &self,
        auth_token: &str,
        request: &TokenTransferRequest,
    ) -> Result<TokenTransferResponse> {
        let response: ApiResponse<TokenTransferResponse> = self
            .post_json(
                self.url(&["contracts", "car-token", "transfer"])?,
                request,
                Some(auth_token),
            )
            .await?;
        Ok(response.result)
    }

    async fn get_balance(
        &self,
        address: &str,
        chain_id: ChainId,
        token_address: Option<&str>,
    ) -> Result<Vec<WalletBalance>> {
        let mut query = vec![("chainId", chain_id.to_string())];
        if let Some(token) = token_address {
            query.push(("tokenAddress", token.to_string()));
        }
        let response: ApiResponse<Vec<WalletBalance>> = self
            .get_json(self.url(&["wallets", address, "balance"])?, &query)
            .await?;
        Ok(response.result)
    }

    async fn verify_balance_change(&self, request: &VerifyBalanceChangeRequest) -> Result<bool> {
        let response: VerifyBalanceChangeResponse = self
            .post_json(self.url(&["verify-balance-change"])?, request, None)
            .await?;
        Ok(response.result.unwrap_or(false))
    }

    async fn get_tokens(&self, address: &str, chain_id: ChainId) -> Result<Vec<TokenHolding>> {
        let query = [("chainId", chain_id.to_string())];
        let response: ApiResponse<TokensPage> = self
            .get_json(self.url(&["wallets", address, "tokens"])?, &query)
            .await?;
        Ok(response.result.tokens)
    }
}

/// Map a non-2xx status to `ApiError::Http`, otherwise parse the JSON body.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = if body.trim().is_empty() {
            status.canonical_reason().unwrap_or("request failed").to_string()
        } else {
            body
        };
        return Err(ApiError::Http {
            status: status.as_u16(),
            message,
        });
    }

    response
        .json()
        .await
        .map_err(|e| ApiError::ParseError(e.to_string()))
}

fn unreachable(url: &str, err: reqwest::Error) -> ApiError {
    ApiError::Unreachable {
        url: url.to_string(),
        message: err.to_string(),
    }
}

/// Wrap a wallet API call with a timeout.
async fn timed_request<T>(timeout: Duration, fut: impl Future<Output = Result<T>>) -> Result<T> {
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| ApiError::Timeout {
            secs: timeout.as_secs(),
        })?
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::extract::{Path, Query};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use std::collections::HashMap;

    async fn spawn_fake_api(router: Router) -> WalletApiClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        WalletApiClient::new(&ApiConfig {
            base_url: format!("http://{}/v1/", addr),
            request_timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_url_joining() {
        let client = WalletApiClient::new(&ApiConfig {
            base_url: "http://localhost:3000/v1/".into(),
            request_timeout_secs: 1,
        })
        .unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000/v1");
        assert_eq!(
            client.url(&["wallets", "send"]).unwrap().as_str(),
            "http://localhost:3000/v1/wallets/send"
        );
        assert_eq!(
            client.url(&["wallets", "0xA/b?c#d", "balance"]).unwrap().as_str(),
            "http://localhost:3000/v1/wallets/0xA%2Fb%3Fc%23d/balance"
        );
    }

    #[test]
    fn test_url_on_bare_host() {
        let client = WalletApiClient::new(&ApiConfig {
            base_url: "http://localhost:3000".into(),
            request_timeout_secs: 1,
        })
        .unwrap();
        assert_eq!(
            client.url(&["verify-balance-change"]).unwrap().as_str(),
            "http://localhost:3000/verify-balance-change"
        );

        let client = WalletApiClient::new(&ApiConfig {
            base_url: "not a url".into(),
            request_timeout_secs: 1,
        })
        .unwrap();
        assert!(matches!(
            client.url(&["wallets", "send"]),
            Err(ApiError::Unreachable { .. })
        ));
    }

    #[tokio::test]
    async fn test_send_tokens_carries_bearer_and_body() {
        let router = Router::new().route(
            "/v1/wallets/send",
            post(|headers: HeaderMap, Json(body): Json<serde_json::Value>| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                if auth != "Bearer secret" {
                    return (StatusCode::UNAUTHORIZED, Json(serde_json::json!({})));
                }
                let quantity = body["recipients"][0]["quantity"].as_str().unwrap_or_default();
                (
                    StatusCode::OK,
                    Json(serde_json::json!({"result": {"transactionIds": [format!("tx-{}", quantity)]}})),
                )
            }),
        );
        let client = spawn_fake_api(router).await;

        let request = SendTokenRequest {
            from: "0xA".into(),
            chain_id: 11155111,
            recipients: vec![Recipient {
                address: "0xB".into(),
                quantity: "1000".into(),
            }],
        };
        let response = client.send_tokens("secret", &request).await.unwrap();
        assert_eq!(response.transaction_ids, vec!["tx-1000".to_string()]);

        let err = client.send_tokens("wrong", &request).await.unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_get_balance_passes_query() {
        let router = Router::new().route(
            "/v1/wallets/:address/balance",
            get(
                |Path(address): Path<String>, Query(query): Query<HashMap<String, String>>| async move {
                    Json(serde_json::json!({"result": [{
                        "chainId": query.get("chainId").and_then(|c| c.parse::<u64>().ok()),
                        "tokenAddress": query.get("tokenAddress"),
                        "value": format!("{}-balance", address),
                    }]}))
                },
            ),
        );
        let client = spawn_fake_api(router).await;

        let balances = client
            .get_balance("0xA", 11155111, Some("0xToken"))
            .await
            .unwrap();
        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].chain_id, Some(11155111));
        assert_eq!(balances[0].token_address.as_deref(), Some("0xToken"));
        assert_eq!(balances[0].value.as_deref(), Some("0xA-balance"));

        let balances = client.get_balance("0xA/b?c", 1, None).await.unwrap();
        assert_eq!(balances[0].value.as_deref(), Some("0xA/b?c-balance"));
        assert_eq!(balances[0].token_address, None);
    }

    #[tokio::test]
    async fn test_get_tokens_reads_page() {
        let router = Router::new().route(
            "/v1/wallets/:address/tokens",
            get(
                |Path(address): Path<String>, Query(query): Query<HashMap<String, String>>| async move {
                    Json(serde_json::json!({"result": {
                        "tokens": [{
                            "chain_id": query.get("chainId").and_then(|c| c.parse::<u64>().ok()),
                            "token_address": "0xToken",
                            "owner_address": address,
                            "balance": "2500",
                            "name": "Carnival Token",
                            "symbol": "CAR",
                            "decimals": 18
                        }],
                        "pagination": {"hasMore": false, "limit": 50, "page": 1}
                    }}))
                },
            ),
        );
        let client = spawn_fake_api(router).await;

        let tokens = client.get_tokens("0xA", 11155111).await.unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].chain_id, Some(11155111));
        assert_eq!(tokens[0].owner_address.as_deref(), Some("0xA"));
        assert_eq!(tokens[0].symbol.as_deref(), Some("CAR"));
        assert_eq!(tokens[0].balance.as_deref(), Some("2500"));
    }

    #[tokio::test]
    async fn test_verify_balance_change_defaults_to_false() {
        let router = Router::new().route(
            "/v1/verify-balance-change",
            post(|Json(body): Json<serde_json::Value>| async move {
                if body["expectedChange"] == "-0.001" {
                    Json(serde_json::json!({"result": true}))
                } else {
                    Json(serde_json::json!({"success": true}))
                }
            }),
        );
        let client = spawn_fake_api(router).await;

        let mut request = VerifyBalanceChangeRequest {
            wallet_address: "0xA".into(),
            chain_id: 1,
            expected_change: "-0.001".into(),
            token_address: None,
        };
        assert!(client.verify_balance_change(&request).await.unwrap());

        request.expected_change = "-5".into();
        assert!(!client.verify_balance_change(&request).await.unwrap());
    }

    #[tokio::test]
    async fn test_unreachable_api() {
        let client = WalletApiClient::new(&ApiConfig {
            base_url: "http://127.0.0.1:1/v1".into(),
            request_timeout_secs: 5,
        })
        .unwrap();
        let err = client.get_balance("0xA", 1, None).await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::Unreachable { .. } | ApiError::Timeout { .. }
        ));
    }
}
