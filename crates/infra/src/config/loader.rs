//! Configuration loader
//!
//! Loads engine configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Reads a `.env` file into the process environment when one exists
//! 2. Attempts to load from `PROCURA_*` environment variables
//! 3. If `PROCURA_DB_PATH` is missing, falls back to a config file
//! 4. Probes multiple paths for config files (JSON or TOML)
//! 5. Validates the result
//!
//! ## Environment Variables
//! - `PROCURA_DB_PATH`: Database file path (required for env loading)
//! - `PROCURA_DB_POOL_SIZE`: Connection pool size
//! - `PROCURA_ERP_ENABLED`: Whether ERP sync is enabled (true/false)
//! - `PROCURA_ERP_BASE_URL`: ERP API base URL
//! - `PROCURA_ERP_TOKEN_URL`: ERP OAuth token endpoint
//! - `PROCURA_ERP_CLIENT_ID` / `PROCURA_ERP_CLIENT_SECRET`: OAuth client
//! - `PROCURA_ERP_MAX_RETRIES`: Rate-limit retries per status push
//! - `PROCURA_PUBLIC_ORDER_BASE_URL`: Base of public order links
//! - `PROCURA_LOG_LEVEL`: Fallback log level when `RUST_LOG` is unset
//! - `PROCURA_LOG_JSON`: JSON log output (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./procura.toml`, `./procura.json`, `./config.toml`, `./config.json`
//! 2. The same names in the parent and grandparent directories
//! 3. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use procura_domain::{
    Config, DatabaseConfig, ErpConfig, LoggingConfig, NegotiationConfig, ProcuraError, Result,
};

const CONFIG_FILE_NAMES: [&str; 4] = ["procura.toml", "procura.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `ProcuraError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - The loaded configuration fails validation
pub fn load() -> Result<Config> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    let config = match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            config
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)?
        }
    };

    config.validate()?;
    Ok(config)
}

/// Load configuration from environment variables
///
/// Only `PROCURA_DB_PATH` is required; everything else falls back to the
/// defaults.
///
/// # Errors
/// Returns `ProcuraError::Config` if the database path is missing or a
/// numeric variable cannot be parsed.
pub fn load_from_env() -> Result<Config> {
    let database_defaults = DatabaseConfig::default();
    let erp_defaults = ErpConfig::default();
    let negotiation_defaults = NegotiationConfig::default();
    let logging_defaults = LoggingConfig::default();

    let database = DatabaseConfig {
        path: env_var("PROCURA_DB_PATH")?,
        pool_size: env_parse("PROCURA_DB_POOL_SIZE")?.unwrap_or(database_defaults.pool_size),
        busy_timeout_ms: database_defaults.busy_timeout_ms,
    };

    let erp = ErpConfig {
        enabled: env_bool("PROCURA_ERP_ENABLED", erp_defaults.enabled),
        base_url: env_opt("PROCURA_ERP_BASE_URL").unwrap_or(erp_defaults.base_url),
        token_url: env_opt("PROCURA_ERP_TOKEN_URL").unwrap_or(erp_defaults.token_url),
        client_id: env_opt("PROCURA_ERP_CLIENT_ID").unwrap_or(erp_defaults.client_id),
        client_secret: env_opt("PROCURA_ERP_CLIENT_SECRET").or(erp_defaults.client_secret),
        max_rate_limit_retries: env_parse("PROCURA_ERP_MAX_RETRIES")?
            .unwrap_or(erp_defaults.max_rate_limit_retries),
        ..erp_defaults
    };

    let negotiation = NegotiationConfig {
        public_order_base_url: env_opt("PROCURA_PUBLIC_ORDER_BASE_URL")
            .unwrap_or(negotiation_defaults.public_order_base_url),
        ..negotiation_defaults
    };

    let logging = LoggingConfig {
        level: env_opt("PROCURA_LOG_LEVEL").unwrap_or(logging_defaults.level),
        json: env_bool("PROCURA_LOG_JSON", logging_defaults.json),
    };

    Ok(Config { database, erp, negotiation, logging })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `ProcuraError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ProcuraError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ProcuraError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ProcuraError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content, format chosen by extension.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ProcuraError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ProcuraError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(ProcuraError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.extend([exe_dir.to_path_buf(), exe_dir.join(".."), exe_dir.join("../..")]);
        }
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| ProcuraError::Config(format!("Missing required environment variable: {key}")))
}

/// Optional, non-empty environment variable
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Parse an optional numeric environment variable
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ProcuraError::Config(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
