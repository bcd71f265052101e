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
pub struct AssignmentsQuery {
    pub mint: Option<String>,
    pub min: Option<String>,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/assignments", get(get_assignments))
}

/// GET /api/assignments?mint=&min=
async fn get_assignments(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AssignmentsQuery>,
) -> Response {
    let mint = match state.world.resolve_mint(query.mint.as_deref()).await {
        Ok(Some(mint)) => mint,
        Ok(None) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "INVALID_PARAMETERS",
                "Mint address is required",
                None,
            )
        }
        Err(e) => return holder_world_error_response("Failed to resolve token mint", &e),
    };

    let min = match parse_min(query.min.as_deref(), state.world.config().min_hold) {
        Ok(min) => min,
        Err(response) => return response,
    };

    match state.world.assignments(&mint, min).await {
        Ok(characters) => success_response(characters),
        Err(e) => holder_world_error_response("Failed to load assignments", &e),
    }
}
