//! Wallet balance endpoints

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use transfer::WalletData;

use crate::dto::{state_failure, ApiFailure};
use crate::AppState;

/// Create wallet routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_wallet))
        .route("/refresh", post(refresh_wallet))
}

/// GET /wallet - Cached balances
pub async fn get_wallet(State(state): State<AppState>) -> Result<Json<WalletData>, ApiFailure> {
    let coordinator = state.coordinator().await.map_err(state_failure)?;
    Ok(Json(coordinator.wallet_data()))
}

/// POST /wallet/refresh - Re-fetch balances from the wallet API
pub async fn refresh_wallet(
    State(state): State<AppState>,
) -> Result<Json<WalletData>, ApiFailure> {
    let coordinator = state.coordinator().await.map_err(state_failure)?;
    Ok(Json(coordinator.refresh_wallet_data().await))
}
