use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Response,
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::webserver::{
    state::AppState,
    utils::{error_response, holder_world_error_response, parse_min, success_response},
};

#[derive(Debug, Deserialize)]
pub struct HoldersQuery {
    pub mint: Option<String>,
    pub min: Option<String>,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/holders", get(get_holders))
}

/// GET /api/holders?mint=&min=
///
/// Raw holder list, no test wallet and no assignments.
async fn get_holders(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HoldersQuery>,
) -> Response {
    let world = state.world.config();

    let mint = query
        .mint
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| world.token_mint.trim());
    if mint.is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "INVALID_PARAMETERS",
            "Mint address is required",
            None,
        );
    }

    let min = match parse_min(query.min.as_deref(), world.min_hold) {
        Ok(min) => min,
        Err(response) => return response,
    };

    match state.world.fetcher().fetch_holders(mint, min).await {
        Ok(holders) => success_response(holders),
        Err(e) => holder_world_error_response("Failed to fetch holders", &e),
    }
}
