//! Transfer endpoints, one set per lane

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use carnival_core::Lane;

use crate::dto::{
    state_failure, submit_failure, ApiFailure, LaneStatusResponse, TransferBody, TxResponse,
};
use crate::AppState;

/// Create transfer routes
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/:lane",
        post(submit_transfer).get(get_status).delete(close_transfer),
    )
}

/// POST /transfers/{lane} - Submit a transfer; confirmation continues in the background
pub async fn submit_transfer(
    State(state): State<AppState>,
    Path(lane): Path<Lane>,
    Json(body): Json<TransferBody>,
) -> Result<Json<TxResponse>, ApiFailure> {
    let coordinator = state.coordinator().await.map_err(state_failure)?;
    let request = coordinator.request(lane, body.to_address, body.amount);

    let tx_id = coordinator
        .submit_transfer(lane, request)
        .await
        .map_err(submit_failure)?;
    Ok(Json(TxResponse { tx_id }))
}

/// GET /transfers/{lane} - Current state of a lane
pub async fn get_status(
    State(state): State<AppState>,
    Path(lane): Path<Lane>,
) -> Result<Json<LaneStatusResponse>, ApiFailure> {
    let coordinator = state.coordinator().await.map_err(state_failure)?;
    Ok(Json(LaneStatusResponse::new(
        lane,
        coordinator.state(lane),
        coordinator.balance(lane),
    )))
}

/// DELETE /transfers/{lane} - Dismiss the transfer: stop polling, back to idle
pub async fn close_transfer(
    State(state): State<AppState>,
    Path(lane): Path<Lane>,
) -> Result<StatusCode, ApiFailure> {
    let coordinator = state.coordinator().await.map_err(state_failure)?;
    coordinator.close(lane);
    Ok(StatusCode::NO_CONTENT)
}
