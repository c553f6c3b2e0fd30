//! CLI command implementations

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::compat::FieldCompatibility;
use crate::config::AppConfig;
use crate::http_server::key_routes::KeyView;
use crate::http_server::{ApiState, HttpServer};
use crate::keys::{
    create_notifier, ApiKeyRepository, FileApiKeyRepository, InMemoryApiKeyRepository,
    LifecycleManager,
};
use crate::store::{DataStore, InMemoryDataStore};

use super::args::{Command, KeyAction};
use super::errors::{CliError, CliResult};
use super::logging::init_logging;

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, port } => serve(&config, port),
        Command::CheckConfig { config } => check_config(&config),
        Command::Keys { config, action } => keys(&config, action),
    }
}

/// Key repository named by the configuration
pub fn key_repository(config: &AppConfig) -> Arc<dyn ApiKeyRepository> {
    match &config.key_store_path {
        Some(path) => Arc::new(FileApiKeyRepository::new(path)),
        None => Arc::new(InMemoryApiKeyRepository::new()),
    }
}

/// Load the dataset and wire handler state from configuration
pub fn build_state(config: &AppConfig) -> CliResult<ApiState> {
    let store: Arc<dyn DataStore> = Arc::new(InMemoryDataStore::from_json_file(&config.dataset_path)?);
    let notifier = create_notifier(config.email.clone())?;
    let lifecycle = LifecycleManager::new(
        key_repository(config),
        notifier,
        config.links.activation_base_url.clone(),
    );

    Ok(ApiState::new(
        store,
        FieldCompatibility::standard(config.links.clone()),
        lifecycle,
    ))
}

/// Start the HTTP server
pub fn serve(config_path: &Path, port: Option<u16>) -> CliResult<()> {
    let mut config = AppConfig::load(config_path)?;
    if let Some(port) = port {
        config.server.port = port;
    }
    init_logging(&config.log_level)?;

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::serve_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        let state = build_state(&config)?;
        if config.key_store_path.is_none() {
            info!("no key_store_path configured, API keys are kept in memory");
        }
        let server = HttpServer::with_state(config.server.clone(), state);
        server
            .start()
            .await
            .map_err(|e| CliError::serve_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Validate configuration and dataset without serving
pub fn check_config(config_path: &Path) -> CliResult<()> {
    let config = AppConfig::load(config_path)?;
    let store = InMemoryDataStore::from_json_file(&config.dataset_path)?;

    println!("config: {}", config_path.display());
    println!("listen: {}", config.server.socket_addr());
    println!("dataset: {}", config.dataset_path.display());
    for table in store.table_names() {
        println!("  {}: {} rows", table, store.row_count(table).unwrap_or(0));
    }
    match &config.key_store_path {
        Some(path) => println!("key store: {}", path.display()),
        None => println!("key store: in-memory"),
    }
    match &config.email {
        Some(email) => println!("email: {}:{}", email.smtp_host, email.smtp_port),
        None => println!("email: disabled (notices are not sent)"),
    }
    Ok(())
}

/// Administer keys in the configured file store
pub fn keys(config_path: &Path, action: KeyAction) -> CliResult<()> {
    let config = AppConfig::load(config_path)?;
    if config.key_store_path.is_none() {
        return Err(CliError::config_error(
            "key administration needs key_store_path in the config",
        ));
    }
    let lifecycle = LifecycleManager::new(
        key_repository(&config),
        create_notifier(None)?,
        config.links.activation_base_url.clone(),
    );
    run_key_action(&lifecycle, action)
}

/// Apply one administrative action and print the outcome
pub fn run_key_action(lifecycle: &LifecycleManager, action: KeyAction) -> CliResult<()> {
    match action {
        KeyAction::List => {
            let keys: Vec<KeyView> = lifecycle.list()?.iter().map(KeyView::from).collect();
            println!("{}", serde_json::to_string_pretty(&keys)?);
            for (status, count) in lifecycle.status_counts()? {
                eprintln!("{}: {}", status, count);
            }
        }
        KeyAction::Suspend { key } => {
            let record = lifecycle.suspend(&key)?;
            println!("{} is {}", record.key, record.status);
        }
        KeyAction::Delete { key } => {
            lifecycle.delete(&key)?;
            println!("{} deleted", key);
        }
    }
    Ok(())
}
