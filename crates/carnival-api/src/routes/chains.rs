//! Chain catalog endpoint

use axum::Json;
use carnival_core::{Chain, SUPPORTED_CHAINS};

/// GET /chains - Networks the wallet can operate on
pub async fn list_chains() -> Json<&'static [Chain]> {
    Json(SUPPORTED_CHAINS)
}
