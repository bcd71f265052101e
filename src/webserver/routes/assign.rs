use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Response,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::{
    assignments::HolderBalance,
    logger::{self, LogTag},
    webserver::{
        state::AppState,
        utils::{error_response, holder_world_error_response, success_response},
    },
};

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub mint: String,
    pub holders: Vec<HolderBalance>,
    #[serde(rename = "charCount")]
    pub char_count: i64,
}

#[derive(Debug, Serialize)]
pub struct AssignResponse {
    pub success: bool,
    pub matched: usize,
    pub modified: usize,
    pub upserted: usize,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/assign", post(assign_characters))
}

fn invalid_body(message: &str, details: serde_json::Value) -> Response {
    error_response(StatusCode::BAD_REQUEST, "INVALID_REQUEST_BODY", message, Some(details))
}

/// POST /api/assign
async fn assign_characters(
    State(state): State<Arc<AppState>>,
    body: Result<Json<AssignRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return invalid_body("Invalid request body", json!({ "reason": rejection.body_text() }))
        }
    };

    let mint = request.mint.trim();
    if mint.is_empty() {
        return invalid_body("Invalid request body", json!({ "field": "mint", "reason": "must not be empty" }));
    }
    if request.char_count < 1 {
        return invalid_body(
            "Invalid request body",
            json!({ "field": "charCount", "reason": "must be at least 1" }),
        );
    }
    if let Some(index) = request
        .holders
        .iter()
        .position(|h| h.owner.trim().is_empty() || !h.ui_amount.is_finite())
    {
        return invalid_body(
            "Invalid request body",
            json!({ "field": format!("holders[{}]", index), "reason": "owner and numeric uiAmount required" }),
        );
    }

    let char_count = u32::try_from(request.char_count).unwrap_or(u32::MAX);
    let mint = mint.to_string();
    let holders = request.holders;
    let holder_count = holders.len();
    let upsert_mint = mint.clone();
    let outcome = state
        .store()
        .clone()
        .run_blocking(move |store| store.upsert_batch(&upsert_mint, &holders, char_count))
        .await;

    match outcome {
        Ok(result) => {
            logger::debug(
                LogTag::Webserver,
                &format!("Assigned {} holders for {}", holder_count, mint),
            );
            success_response(AssignResponse {
                success: true,
                matched: result.matched,
                modified: result.modified,
                upserted: result.upserted,
            })
        }
        Err(e) => holder_world_error_response("Failed to assign characters", &e),
    }
}
