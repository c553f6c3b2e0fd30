//! # Application Configuration
//!
//! JSON configuration file. Every field has a default, so a missing file
//! or an empty object yields a runnable development setup: in-memory keys,
//! the mock notifier and the bundled sample dataset.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::compat::LinkConfig;
use crate::http_server::HttpServerConfig;
use crate::keys::EmailConfig;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Log levels accepted by `log_level`
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: HttpServerConfig,

    /// Default tracing level; `RUST_LOG` takes precedence
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// JSON dataset of resource tables
    #[serde(default = "default_dataset_path")]
    pub dataset_path: PathBuf,

    /// JSON key store; keys live in memory when absent
    #[serde(default)]
    pub key_store_path: Option<PathBuf>,

    #[serde(default)]
    pub links: LinkConfig,

    /// SMTP settings; activation notices are only recorded when absent
    #[serde(default)]
    pub email: Option<EmailConfig>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from("data/dataset.json")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: HttpServerConfig::default(),
            log_level: default_log_level(),
            dataset_path: default_dataset_path(),
            key_store_path: None,
            links: LinkConfig::default(),
            email: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from file; a missing file means defaults
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let config = match fs::read_to_string(path) {
            Ok(content) => {
                debug!(path = %path.display(), "loading config");
                serde_json::from_str(&content)?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "config file not found, using defaults");
                AppConfig::default()
            }
            Err(e) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot
    pub fn validate(&self) -> ConfigResult<()> {
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "log_level must be one of {}, got '{}'",
                LOG_LEVELS.join(", "),
                self.log_level
            )));
        }

        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must be > 0".to_string()));
        }

        for (name, url) in [
            ("links.site_base_url", &self.links.site_base_url),
            ("links.media_base_url", &self.links.media_base_url),
            ("links.activation_base_url", &self.links.activation_base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be an http(s) URL, got '{}'",
                    name, url
                )));
            }
        }

        if let Some(email) = &self.email {
            if email.smtp_host.trim().is_empty() {
                return Err(ConfigError::Invalid("email.smtp_host is empty".to_string()));
            }
            if !email.from_email.contains('@') {
                return Err(ConfigError::Invalid(format!(
                    "email.from_email is not an address: '{}'",
                    email.from_email
                )));
            }
        }

        Ok(())
    }
}
