/// API route definitions
///
/// Every endpoint lives under `/api`.
use axum::Router;
use std::sync::Arc;

use crate::webserver::state::AppState;

pub mod assign;
pub mod assignments;
pub mod holders;
pub mod reset;
pub mod status;
pub mod world;

/// Create the main router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .with_state(state)
}

/// API routes under /api prefix
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(status::routes())
        .merge(holders::routes())
        .merge(assign::routes())
        .merge(world::routes())
        .merge(assignments::routes())
        .merge(reset::routes())
}
