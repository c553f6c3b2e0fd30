//! # Validation Errors
//!
//! Error kinds raised by the validator and the filter compiler.

use thiserror::Error;

/// Result type for validation and compilation
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validation failures
///
/// Each kind is distinguishable so the HTTP boundary can map it to a stable
/// status code.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// One or more required parameters are missing or empty
    #[error("Missing required fields: {}", names.join(", "))]
    MissingRequired { names: Vec<String> },

    /// A value is not in the allowed list
    #[error("Invalid value: {value}")]
    InvalidEnum { value: String },

    /// A value does not have the required length
    #[error("The value {value} must be {required_len} characters long")]
    WrongLength { value: String, required_len: usize },

    /// A number is outside its bounds or is a reserved value
    #[error("The value {value} must be a number between {min} and {max}")]
    OutOfRange { value: String, min: i64, max: i64 },

    /// A flag is not one of the accepted tokens
    #[error("Invalid boolean value: {value}")]
    InvalidBoolean { value: String },

    /// A range is malformed or has min greater than max
    #[error("Invalid range: {value}")]
    InvalidRange { value: String },

    /// A parameter that has been withdrawn from the API
    #[error("The parameter {name} is no longer supported")]
    RetiredParameter { name: String },

    /// A record identifier of the wrong shape
    #[error("Invalid identifier: {value}")]
    BadIdentifier { value: String },

    /// An email address that is not well formed
    #[error("Invalid email address: {value}")]
    InvalidEmail { value: String },
}

impl ValidationError {
    /// Returns the HTTP status code for this error
    ///
    /// Several client mistakes surface as 500. Existing clients depend on
    /// these codes, so they are kept.
    pub fn status_code(&self) -> u16 {
        match self {
            ValidationError::MissingRequired { .. } => 400,
            ValidationError::InvalidRange { .. } => 400,
            ValidationError::BadIdentifier { .. } => 400,
            ValidationError::InvalidEmail { .. } => 400,

            ValidationError::RetiredParameter { .. } => 500,
            ValidationError::InvalidEnum { .. } => 500,
            ValidationError::WrongLength { .. } => 500,
            ValidationError::OutOfRange { .. } => 500,
            ValidationError::InvalidBoolean { .. } => 500,
        }
    }

    /// Names of missing fields, empty for every other kind
    pub fn missing_names(&self) -> &[String] {
        match self {
            ValidationError::MissingRequired { names } => names,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ValidationError::MissingRequired { names: vec!["email".into()] }.status_code(),
            400
        );
        assert_eq!(ValidationError::InvalidRange { value: "9-1".into() }.status_code(), 400);
        assert_eq!(ValidationError::InvalidEnum { value: "x".into() }.status_code(), 500);
        assert_eq!(
            ValidationError::RetiredParameter { name: "pc_adherent".into() }.status_code(),
            500
        );
    }

    #[test]
    fn test_missing_required_message_lists_all_names() {
        let err = ValidationError::MissingRequired {
            names: vec!["name".into(), "email".into(), "usage".into()],
        };
        assert_eq!(err.to_string(), "Missing required fields: name, email, usage");
        assert_eq!(err.missing_names().len(), 3);
    }
}
