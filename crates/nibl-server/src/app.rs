//! Router construction.

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::get;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::live_reload::{ReloadHub, ws_handler};
use crate::middleware::inject::inject_reload_client;

/// Create the dev server router.
///
/// `/ws` accepts live reload clients; every other path is served from
/// `output_dir` with the reload client injected into pages.
///
/// # Arguments
///
/// * `hub` - Hub the websocket handler registers clients with
/// * `output_dir` - Generated site to serve
pub fn create_router(hub: Arc<ReloadHub>, output_dir: &Path) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .fallback_service(ServeDir::new(output_dir))
        .layer(middleware::from_fn(inject_reload_client))
        .layer(TraceLayer::new_for_http())
        .with_state(hub)
}
