use axum::{extract::State, response::Response, routing::get, Router};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

use crate::{
    logger::{self, LogTag},
    webserver::{state::AppState, utils::success_response},
};

/// Simple health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: String,
    /// Assignment store mode: "sqlite" or "hashed"
    pub store: String,
    pub uptime_seconds: u64,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health_check))
}

/// GET /api/health
async fn health_check(State(state): State<Arc<AppState>>) -> Response {
    logger::debug(LogTag::Webserver, "Health check endpoint called");

    success_response(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: state.store().mode().to_string(),
        uptime_seconds: state.uptime_seconds(),
    })
}
