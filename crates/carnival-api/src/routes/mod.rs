//! API route handlers

pub mod chains;
pub mod events;
pub mod health;
pub mod purchases;
pub mod session;
pub mod transfers;
pub mod wallet;

use axum::{routing::get, Router};

use crate::AppState;

/// Create the API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/chains", get(chains::list_chains))
        .merge(session::router())
        .nest("/transfers", transfers::router())
        .nest("/events", events::router())
        .nest("/wallet", wallet::router())
        .nest("/purchases", purchases::router())
        .with_state(state)
}
