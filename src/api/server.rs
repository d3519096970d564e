//! API Server Module
//!
//! Provides the Axum application builder and server startup logic.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::common::{Result, ZDropError};
use crate::distributor::DistributorService;

use super::routes;

/// Combined application state for all API endpoints
pub struct AppState {
    /// The one distribution this deployment serves
    pub service: Arc<DistributorService>,
}

/// Shared application state type
pub type SharedAppState = Arc<AppState>;

impl AppState {
    pub fn new(service: Arc<DistributorService>) -> SharedAppState {
        Arc::new(Self { service })
    }
}

/// Build the application router
pub fn build_router(state: SharedAppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/status", get(routes::status))
        .route("/claims/:identity", get(routes::claim_status))
        .route("/preview", post(routes::preview))
        .route("/claim", post(routes::claim))
        .route("/open", post(routes::open))
        .route("/withdraw", post(routes::withdraw))
        .route("/pause", post(routes::pause))
        .route("/unpause", post(routes::unpause))
        .route("/ownership/transfer", post(routes::transfer_ownership))
        .route("/ownership/accept", post(routes::accept_ownership))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve the API
pub async fn serve(state: SharedAppState, port: u16) -> Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(target: "zdrop::api", port, "API server listening");
    axum::serve(listener, app)
        .await
        .map_err(|e| ZDropError::api(e.to_string()))
}
