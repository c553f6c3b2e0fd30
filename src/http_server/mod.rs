//! # HTTP Server Module
//!
//! Axum server exposing the people groups API.
//!
//! # Endpoints
//!
//! - `GET /health` - Health check
//! - `POST /api_keys` - Request an API key
//! - `GET /api_keys/activate/:token` - Activate a requested key
//! - `GET /:version/:resource.:format` - Filtered list (key required)
//! - `GET /:version/:resource/:id.:format` - Single record (key required)
//! - `GET /:version/people_groups/daily_unreached.:format` - Daily list (key required)

pub mod config;
pub mod errors;
pub mod format;
pub mod health_routes;
pub mod key_routes;
pub mod resource_routes;
pub mod server;
pub mod state;

pub use config::HttpServerConfig;
pub use errors::{ApiError, ApiResult, ErrorResponse};
pub use format::{split_format, Format, JsonFormat, ResponseFormat, XmlFormat};
pub use server::HttpServer;
pub use state::ApiState;
