//! # Key Errors
//!
//! Error types for API key requests, activation and access checks.

use thiserror::Error;

use crate::validation::ValidationError;

/// Result type for key operations
pub type KeyResult<T> = Result<T, KeyError>;

/// API key lifecycle and access errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KeyError {
    // ==================
    // Access Errors
    // ==================
    /// No key supplied with the request
    #[error("An API key is required to access this resource")]
    MissingKey,

    /// Unknown or inactive key (identical on purpose)
    #[error("The API key is invalid or has not been activated")]
    InvalidKey,

    // ==================
    // Lifecycle Errors
    // ==================
    /// No pending key holds this activation token
    #[error("Activation token not found")]
    TokenNotFound,

    /// Key was suspended and cannot be activated
    #[error("This API key has been suspended")]
    AlreadySuspended,

    /// Administrative lookup on a key that does not exist
    #[error("API key not found: {0}")]
    KeyNotFound(String),

    /// Key request failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    // ==================
    // Internal Errors
    // ==================
    /// Storage operation failed
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Activation notice could not be delivered
    #[error("Notification error: {0}")]
    NotificationError(String),
}

impl KeyError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            // 401 Unauthorized
            KeyError::MissingKey => 401,
            KeyError::InvalidKey => 401,

            // 403 Forbidden
            KeyError::AlreadySuspended => 403,

            // 404 Not Found
            KeyError::TokenNotFound => 404,
            KeyError::KeyNotFound(_) => 404,

            KeyError::Validation(e) => e.status_code(),

            // 500 Internal Server Error
            KeyError::StorageError(_) => 500,
            KeyError::NotificationError(_) => 500,
        }
    }

    /// Returns whether this error should be logged at warn level
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(KeyError::MissingKey.status_code(), 401);
        assert_eq!(KeyError::InvalidKey.status_code(), 401);
        assert_eq!(KeyError::AlreadySuspended.status_code(), 403);
        assert_eq!(KeyError::TokenNotFound.status_code(), 404);
        assert_eq!(KeyError::StorageError("x".into()).status_code(), 500);
    }

    #[test]
    fn test_validation_status_passes_through() {
        let err: KeyError = ValidationError::MissingRequired {
            names: vec!["usage".into()],
        }
        .into();
        assert_eq!(err.status_code(), 400);

        let err: KeyError = ValidationError::InvalidEnum { value: "x".into() }.into();
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_invalid_key_does_not_leak_existence() {
        let msg = KeyError::InvalidKey.to_string();
        assert!(!msg.contains("not found"));
        assert!(!msg.contains("suspended"));
    }
}
