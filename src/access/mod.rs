//! # Access Gate
//!
//! Front-door API key check run before any resource query is compiled.
//!
//! Unknown keys and keys that are not active produce the same
//! [`KeyError::InvalidKey`], so callers cannot probe which keys exist.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Query, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use chrono::{DateTime, Utc};
use tokio::task;
use tracing::debug;

use crate::http_server::errors::ApiError;
use crate::keys::{ApiKey, ApiKeyRepository, KeyError, KeyResult};

/// Query parameter carrying the key
pub const API_KEY_PARAM: &str = "api_key";

/// Resolves and checks API keys
#[derive(Clone)]
pub struct AccessGate {
    repo: Arc<dyn ApiKeyRepository>,
}

impl AccessGate {
    pub fn new(repo: Arc<dyn ApiKeyRepository>) -> Self {
        Self { repo }
    }

    /// Admit an active key and stamp its last request time
    ///
    /// The timestamp write is best-effort; its failure does not fail the
    /// request.
    pub fn authorize(&self, raw: Option<&str>) -> KeyResult<ApiKey> {
        let record = self.admit(raw)?;
        let now = Utc::now();
        self.record_request(&record.key, now);

        Ok(ApiKey {
            last_request_at: Some(now),
            ..record
        })
    }

    /// Resolve an active key without touching storage timestamps
    pub fn admit(&self, raw: Option<&str>) -> KeyResult<ApiKey> {
        let key = raw
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(KeyError::MissingKey)?;

        match self.repo.find_by_key(key)? {
            Some(record) if record.is_active() => Ok(record),
            Some(record) => {
                debug!(key = %key, status = %record.status, "inactive key rejected");
                Err(KeyError::InvalidKey)
            }
            None => {
                debug!(key = %key, "unknown key rejected");
                Err(KeyError::InvalidKey)
            }
        }
    }

    /// Store the latest request time; failures are logged and dropped
    pub fn record_request(&self, key: &str, at: DateTime<Utc>) {
        if let Err(e) = self.repo.touch(key, at) {
            debug!(key = %key, error = %e, "last request time not recorded");
        }
    }
}

/// Axum middleware: reject requests without an active `api_key`
///
/// The key lookup runs on the blocking pool. The last request stamp is
/// detached and never delays the response.
/// On success the resolved [`ApiKey`] is placed in request extensions.
pub async fn require_api_key(
    State(gate): State<AccessGate>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let raw: Option<String> = Query::<HashMap<String, String>>::try_from_uri(req.uri())
        .ok()
        .and_then(|Query(mut params)| params.remove(API_KEY_PARAM));

    let lookup = gate.clone();
    let record = task::spawn_blocking(move || lookup.admit(raw.as_deref()))
        .await
        .map_err(|e| KeyError::StorageError(format!("Key lookup task failed: {}", e)))??;

    let now = Utc::now();
    let stamp_key = record.key.clone();
    task::spawn_blocking(move || gate.record_request(&stamp_key, now));

    req.extensions_mut().insert(ApiKey {
        last_request_at: Some(now),
        ..record
    });
    Ok(next.run(req).await)
}
