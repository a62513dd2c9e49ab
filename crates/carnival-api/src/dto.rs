//! Data Transfer Objects for API requests and responses

use axum::http::StatusCode;
use axum::Json;
use carnival_core::{ChainId, Lane, SubmitError, TxId};
use serde::{Deserialize, Serialize};
use transfer::{NftListing, PurchaseError, TransferState};
use wallet_api_client::WalletBalance;

use crate::StateError;

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

/// POST /session body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenSessionRequest {
    /// Bearer token issued by the auth provider
    pub token: String,
    pub wallet_address: String,
    #[serde(default)]
    pub chain_id: Option<ChainId>,
}

/// POST /transfers/{lane} body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferBody {
    pub to_address: String,
    /// Human decimal amount
    pub amount: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxResponse {
    pub tx_id: TxId,
}

/// GET /transfers/{lane} response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaneStatusResponse {
    pub lane: Lane,
    pub state: TransferState,
    /// A send or confirmation poll is running
    pub in_flight: bool,
    /// Nothing more happens on this lane until the next submission
    pub settled: bool,
    pub balance: Option<WalletBalance>,
}

impl LaneStatusResponse {
    pub fn new(lane: Lane, state: TransferState, balance: Option<WalletBalance>) -> Self {
        Self {
            lane,
            in_flight: state.is_in_flight(),
            settled: state.is_terminal(),
            state,
            balance,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseRequest {
    pub listing: NftListing,
}

/// Error body returned by every failing route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    /// For transfer submissions: `validation` (nothing was sent) or
    /// `submission` (the send call failed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            kind: None,
        }
    }
}

/// Rejection type shared by the handlers
pub type ApiFailure = (StatusCode, Json<ErrorResponse>);

fn failure(status: u16, code: &str, message: String) -> ApiFailure {
    (
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(ErrorResponse::new(code, message)),
    )
}

pub fn submit_failure(e: SubmitError) -> ApiFailure {
    let (status, Json(mut body)) = failure(e.status_code(), e.error_code(), e.to_string());
    body.kind = Some(e.kind().as_str().to_string());
    (status, Json(body))
}

pub fn purchase_failure(e: PurchaseError) -> ApiFailure {
    failure(e.status_code(), e.error_code(), e.to_string())
}

pub fn state_failure(e: StateError) -> ApiFailure {
    failure(e.status_code(), e.error_code(), e.to_string())
}
