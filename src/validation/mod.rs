//! # Validation Module
//!
//! Sanitizing and rule checks for untrusted request input.

pub mod errors;
pub mod sanitizer;
pub mod validator;

pub use errors::{ValidationError, ValidationResult};
pub use sanitizer::clean;
pub use validator::ParamSource;
