use crate::{RelayConfig, RoomRegistry, SignalingService, ws_handler};
use axum::Router;
use axum::routing::get;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Everything a connection task needs, built once per process.
pub struct AppState {
    pub registry: Arc<RoomRegistry>,
    pub signaling: SignalingService,
    pub config: RelayConfig,
}

impl AppState {
    pub fn new(config: RelayConfig) -> Self {
        Self {
            registry: Arc::new(RoomRegistry::new()),
            signaling: SignalingService::new(config.ice_servers.clone()),
            config,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws", get(ws_handler))
        .layer(cors)
        .with_state(state)
}
