//! CLI argument definitions using clap
//!
//! Commands:
//! - peoplegroups-api serve --config <path> [--port <port>]
//! - peoplegroups-api check-config --config <path>
//! - peoplegroups-api keys --config <path> list|suspend|delete

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// People groups data API server
#[derive(Parser, Debug)]
#[command(name = "peoplegroups-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP API server
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./config.json")]
        config: PathBuf,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Load and validate the configuration and dataset, then exit
    CheckConfig {
        /// Path to configuration file
        #[arg(long, default_value = "./config.json")]
        config: PathBuf,
    },

    /// Administer API keys in the configured key store
    Keys {
        /// Path to configuration file
        #[arg(long, default_value = "./config.json")]
        config: PathBuf,

        #[command(subcommand)]
        action: KeyAction,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// Print every key as JSON
    List,

    /// Suspend a key; activation links stop working
    Suspend {
        /// The API key
        key: String,
    },

    /// Delete a key
    Delete {
        /// The API key
        key: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
