//! Health HTTP Routes
//!
//! Unauthenticated liveness endpoint.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;

use super::state::ApiState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Number of resources the API serves
    pub resources: usize,
}

/// Health check route at `/health`
pub fn health_routes(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(state)
}

async fn health_handler(State(state): State<ApiState>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        resources: state.registry.len(),
    };

    (StatusCode::OK, Json(response))
}
