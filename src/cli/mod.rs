//! CLI module for the people groups API
//!
//! Provides command-line interface for:
//! - serve: Load config and dataset, then serve HTTP
//! - check-config: Validate config and dataset
//! - keys: List, suspend or delete API keys

mod args;
mod commands;
mod errors;
mod logging;

pub use args::{Cli, Command, KeyAction};
pub use commands::{build_state, check_config, key_repository, keys, run, run_command, serve};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use logging::init_logging;
