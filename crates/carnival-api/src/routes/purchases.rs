//! NFT purchase endpoint

use axum::{extract::State, routing::post, Json, Router};

use crate::dto::{purchase_failure, state_failure, ApiFailure, PurchaseRequest, TxResponse};
use crate::AppState;

/// Create purchase routes
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(purchase))
}

/// POST /purchases - Pay for an NFT listing
pub async fn purchase(
    State(state): State<AppState>,
    Json(request): Json<PurchaseRequest>,
) -> Result<Json<TxResponse>, ApiFailure> {
    let coordinator = state.coordinator().await.map_err(state_failure)?;
    let shop = state.shop_address().map_err(state_failure)?;

    let tx_id = coordinator
        .purchase_nft(&request.listing, &shop)
        .await
        .map_err(purchase_failure)?;
    Ok(Json(TxResponse { tx_id }))
}
