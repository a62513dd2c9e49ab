//! Wallet session endpoints

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use transfer::WalletData;

use crate::dto::{state_failure, ApiFailure, OpenSessionRequest};
use crate::{AppState, StateError};

/// Create session routes
pub fn router() -> Router<AppState> {
    Router::new().route("/session", post(open_session).delete(close_session))
}

/// POST /session - Open a wallet session and load its balances
pub async fn open_session(
    State(state): State<AppState>,
    Json(request): Json<OpenSessionRequest>,
) -> Result<Json<WalletData>, ApiFailure> {
    let coordinator = state
        .open_session(&request.token, &request.wallet_address, request.chain_id)
        .await
        .map_err(state_failure)?;

    Ok(Json(coordinator.refresh_wallet_data().await))
}

/// DELETE /session - Close the session, cancelling both lanes
pub async fn close_session(State(state): State<AppState>) -> Result<StatusCode, ApiFailure> {
    if state.close_session().await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(state_failure(StateError::NoSession))
    }
}
