use crate::registry::RoomRegistry;
use crate::signaling::ws_handler;
use axum::Router;
use axum::extract::State;
use axum::routing::get;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

/// Shared state handed to every request handler.
#[derive(Clone, Default)]
pub struct AppState {
    pub registry: RoomRegistry,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .layer(cors)
        .with_state(Arc::new(state))
}

async fn health(State(state): State<Arc<AppState>>) -> String {
    format!("OK rooms={}", state.registry.room_count())
}

/// Serve the signaling endpoints on an already bound listener until the server stops.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    axum::serve(listener, router(state)).await
}
