use axum::{extract::State, response::Response, routing::delete, Router};
use serde::Serialize;
use std::sync::Arc;

use crate::webserver::{
    state::AppState,
    utils::{holder_world_error_response, success_response},
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetResponse {
    pub success: bool,
    pub deleted_count: usize,
    pub message: String,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/reset", delete(reset_assignments))
}

/// DELETE /api/reset
async fn reset_assignments(State(state): State<Arc<AppState>>) -> Response {
    match state.store().clone().run_blocking(|store| store.reset()).await {
        Ok(deleted_count) => success_response(ResetResponse {
            success: true,
            deleted_count,
            message: "All character assignments have been reset".to_string(),
        }),
        Err(e) => holder_world_error_response("Failed to reset assignments", &e),
    }
}
