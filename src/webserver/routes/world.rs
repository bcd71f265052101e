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
    utils::{error_response, holder_world_error_response, parse_min, parse_param, success_response},
};

#[derive(Debug, Deserialize)]
pub struct WorldQuery {
    pub mint: Option<String>,
    pub min: Option<String>,
    #[serde(rename = "charCount")]
    pub char_count: Option<String>,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/world", get(get_world))
}

/// GET /api/world?mint=&min=&charCount=
///
/// Also the refresh path for the external scheduler: each call persists
/// newly seen wallets and current balances.
async fn get_world(State(state): State<Arc<AppState>>, Query(query): Query<WorldQuery>) -> Response {
    let config = state.world.config();

    let mint = match state.world.resolve_mint(query.mint.as_deref()).await {
        Ok(Some(mint)) => mint,
        Ok(None) => {
            return error_response(StatusCode::NOT_FOUND, "NO_TOKEN", "No token yet", None)
        }
        Err(e) => return holder_world_error_response("Failed to resolve token mint", &e),
    };

    let min = match parse_min(query.min.as_deref(), config.min_hold) {
        Ok(min) => min,
        Err(response) => return response,
    };
    let char_count = match parse_param("charCount", query.char_count.as_deref(), config.char_count) {
        Ok(count) => count,
        Err(response) => return response,
    };

    match state.world.build(&mint, min, char_count).await {
        Ok(snapshot) => success_response(snapshot),
        Err(e) => holder_world_error_response("Failed to build world", &e),
    }
}
