//! Tracing subscriber setup

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::errors::{CliError, CliResult};

/// Install the global subscriber once
///
/// `RUST_LOG` wins over the configured level.
pub fn init_logging(level: &str) -> CliResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| CliError::config_error(format!("Invalid log level '{}': {}", level, e)))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| CliError::io_error(format!("Failed to install logger: {}", e)))
}
