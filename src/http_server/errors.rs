//! # API Errors
//!
//! Error type returned by HTTP handlers, with the status mapping clients
//! depend on.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, warn};

use crate::keys::KeyError;
use crate::store::StoreError;
use crate::validation::ValidationError;

/// Result type for HTTP handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// HTTP boundary errors
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Unknown version, resource, format or record
    #[error("{0}")]
    NotFound(String),

    /// Request body could not be decoded
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    // ==================
    // Domain Errors
    // ==================
    /// Parameter or identifier validation
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Key access or lifecycle
    #[error("{0}")]
    Key(#[from] KeyError),

    /// Key request failure, echoing the submitted fields
    #[error("{source}")]
    KeyRequest { source: KeyError, fields: Value },

    // ==================
    // Server Errors (5xx)
    // ==================
    /// Data store failure
    #[error("{0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn not_found(what: impl Into<String>) -> Self {
        ApiError::NotFound(what.into())
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        let code = match self {
            ApiError::NotFound(_) => 404,
            ApiError::InvalidBody(_) => 400,
            ApiError::Validation(e) => e.status_code(),
            ApiError::Key(e) => e.status_code(),
            ApiError::KeyRequest { source, .. } => source.status_code(),
            ApiError::Store(e) => e.status_code(),
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Internal failures whose text must not reach the client
    fn is_internal(&self) -> bool {
        match self {
            ApiError::Store(_) => true,
            ApiError::Key(e) | ApiError::KeyRequest { source: e, .. } => matches!(
                e,
                KeyError::StorageError(_) | KeyError::NotificationError(_)
            ),
            _ => false,
        }
    }

    fn missing(&self) -> Option<&[String]> {
        let names = match self {
            ApiError::Validation(e) => e.missing_names(),
            ApiError::Key(KeyError::Validation(e))
            | ApiError::KeyRequest {
                source: KeyError::Validation(e),
                ..
            } => e.missing_names(),
            _ => &[],
        };
        (!names.is_empty()).then_some(names)
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub details: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Value>,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        let details = if err.is_internal() {
            "Internal server error".to_string()
        } else {
            err.to_string()
        };
        let fields = match err {
            ApiError::KeyRequest { fields, .. } => Some(fields.clone()),
            _ => None,
        };
        Self {
            status: err.status_code().as_u16(),
            details,
            missing: err.missing().map(<[String]>::to_vec),
            fields,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if self.is_internal() {
            error!(error = %self, "request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "request rejected");
        }
        let body = Json(ErrorResponse::from(&self));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::from(KeyError::MissingKey).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::from(KeyError::InvalidKey).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::from(ValidationError::InvalidRange { value: "2-1".into() }).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(ValidationError::RetiredParameter { name: "x".into() }).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::not_found("nope").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(KeyError::AlreadySuspended).status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_body_lists_missing_and_fields() {
        let err = ApiError::KeyRequest {
            source: ValidationError::MissingRequired {
                names: vec!["usage".into()],
            }
            .into(),
            fields: json!({"name": "Jo", "email": "jo@example.org"}),
        };
        let body = serde_json::to_value(ErrorResponse::from(&err)).unwrap();
        assert_eq!(body["status"], json!(400));
        assert_eq!(body["missing"], json!(["usage"]));
        assert_eq!(body["fields"]["name"], json!("Jo"));
    }

    #[test]
    fn test_internal_details_hidden() {
        let err = ApiError::from(StoreError::Io("/secret/path: denied".into()));
        let body = ErrorResponse::from(&err);
        assert_eq!(body.status, 500);
        assert!(!body.details.contains("secret"));
    }
}
