//! API Key HTTP Routes
//!
//! Self-service key requests and email activation. Neither route needs a key.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::task::{self, JoinError};

use super::errors::{ApiError, ApiResult};
use super::state::ApiState;
use crate::keys::{ActivationOutcome, ApiKey, KeyError, KeyRequest, KeyStatus};

/// Key routes
pub fn key_routes(state: ApiState) -> Router {
    Router::new()
        .route("/api_keys", post(request_key_handler))
        .route("/api_keys/activate/:token", get(activate_handler))
        .with_state(state)
}

/// Public view of a key record; never carries the activation token
#[derive(Debug, Serialize)]
pub struct KeyView {
    pub key: String,
    pub owner_name: String,
    pub email: String,
    pub status: KeyStatus,
    pub created_at: DateTime<Utc>,
}

impl From<&ApiKey> for KeyView {
    fn from(record: &ApiKey) -> Self {
        Self {
            key: record.key.clone(),
            owner_name: record.owner_name.clone(),
            email: record.email.clone(),
            status: record.status,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct KeyResponse {
    pub status: u16,
    pub details: String,
    pub api_key: KeyView,
}

/// Lifecycle calls touch key storage and run on the blocking pool
fn join_failed(e: JoinError) -> ApiError {
    ApiError::Key(KeyError::StorageError(format!("Key task failed: {}", e)))
}

/// `POST /api_keys`
async fn request_key_handler(
    State(state): State<ApiState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(fields) = body.map_err(|e| ApiError::InvalidBody(e.body_text()))?;
    let request: KeyRequest = serde_json::from_value(fields.clone())
        .map_err(|e| ApiError::InvalidBody(e.to_string()))?;

    let lifecycle = state.lifecycle.clone();
    let issued = task::spawn_blocking(move || lifecycle.request_key(&request))
        .await
        .map_err(join_failed)?
        .map_err(|source| ApiError::KeyRequest { source, fields })?;

    let response = KeyResponse {
        status: StatusCode::CREATED.as_u16(),
        details: format!(
            "An activation link has been sent to {}",
            issued.key.email
        ),
        api_key: KeyView::from(&issued.key),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// `GET /api_keys/activate/:token`
async fn activate_handler(
    State(state): State<ApiState>,
    Path(token): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let lifecycle = state.lifecycle.clone();
    let activation = task::spawn_blocking(move || lifecycle.activate(&token))
        .await
        .map_err(join_failed)??;

    let details = match activation.outcome {
        ActivationOutcome::Activated => "API key activated",
        ActivationOutcome::AlreadyActive => "API key is already active",
    };
    let response = KeyResponse {
        status: StatusCode::OK.as_u16(),
        details: details.to_string(),
        api_key: KeyView::from(&activation.key),
    };
    Ok((StatusCode::OK, Json(response)))
}
