//! Web transport: health check and the viewer WebSocket.

mod routes;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::relay::Transport;
use crate::viewers::ViewerRegistry;

/// Shared app state.
#[derive(Clone)]
pub struct AppState {
    pub viewers: Arc<ViewerRegistry>,
    pub transport: Transport,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/ws", get(routes::ws_handler))
        .layer(cors)
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
