/// Axum webserver implementation
///
/// Stops gracefully on Ctrl-C
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::{
    errors::ConfigurationError,
    logger::{self, LogTag},
    webserver::{routes, state::AppState},
};

/// Start the webserver
///
/// Blocks until Ctrl-C.
pub async fn start_server(state: Arc<AppState>) -> Result<(), String> {
    state
        .config
        .validate()
        .map_err(|e: ConfigurationError| e.to_string())?;

    let addr: SocketAddr = state
        .config
        .bind_address()
        .parse()
        .map_err(|e| format!("Invalid bind address: {}", e))?;

    let app = build_app(state.clone());

    let listener = TcpListener::bind(&addr).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::AddrInUse => format!(
            "Failed to bind to {}: Address already in use (is another holderworld running?)",
            addr
        ),
        std::io::ErrorKind::PermissionDenied => format!(
            "Failed to bind to {}: Permission denied, use a port above 1024",
            addr
        ),
        _ => format!("Failed to bind to {}: {}", addr, e),
    })?;

    logger::info(
        LogTag::Webserver,
        &format!("Webserver listening on http://{} (API at /api)", addr),
    );

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            logger::error(LogTag::Webserver, &format!("Failed to listen for Ctrl-C: {}", e));
        }
        logger::info(LogTag::Webserver, "Received shutdown signal, stopping webserver...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| format!("Server error: {}", e))?;

    logger::info(LogTag::Webserver, "Webserver stopped gracefully");

    Ok(())
}

/// Build the Axum application with all routes and middleware
pub fn build_app(state: Arc<AppState>) -> Router {
    let cors = state.config.cors_allow_any_origin;
    let app = routes::create_router(state);

    if cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}
