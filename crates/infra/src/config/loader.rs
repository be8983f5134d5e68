//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If the owner-store variables are missing, falls back to a config file,
//!    or to the defaults when none exists
//! 3. Probes multiple paths for config files (JSON or TOML)
//! 4. Environment variables always override values read from a file
//!
//! ## Environment Variables
//! Required for environment-only loading:
//! - `STOCKSYNC_OWNER_SHOP`: Owner store domain
//! - `STOCKSYNC_OWNER_ACCESS_TOKEN`: Owner store access token
//! - `STOCKSYNC_OWNER_LOCATION_ID`: Location that receives quantities
//!
//! Optional:
//! - `STOCKSYNC_DB_PATH`, `STOCKSYNC_DB_POOL_SIZE`
//! - `STOCKSYNC_API_VERSION`
//! - `STOCKSYNC_FETCH_BATCH_SIZE`, `STOCKSYNC_WRITE_BATCH_SIZE`,
//!   `STOCKSYNC_BATCH_DELAY_MS`, `STOCKSYNC_MAX_RETRIES`
//! - `STOCKSYNC_ALERTS_ENABLED`, `STOCKSYNC_ALERT_ENDPOINT`,
//!   `STOCKSYNC_ALERT_API_KEY`, `STOCKSYNC_ALERT_FROM`, `STOCKSYNC_ALERT_TO`
//!   (comma separated)
//! - `STOCKSYNC_LOG_LEVEL`, `STOCKSYNC_LOG_JSON`
//!
//! ## File Locations
//! The loader probes the following names in the working directory, its
//! parent and grandparent, then next to the executable:
//! `stocksync.toml`, `stocksync.json`, `config.toml`, `config.json`.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use stocksync_domain::{Config, Result, StockSyncError};

const OWNER_ENV_VARS: [&str; 3] =
    ["STOCKSYNC_OWNER_SHOP", "STOCKSYNC_OWNER_ACCESS_TOKEN", "STOCKSYNC_OWNER_LOCATION_ID"];
const CONFIG_FILE_NAMES: [&str; 4] =
    ["stocksync.toml", "stocksync.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the owner-store
/// variables are missing, falls back to a probed config file, or to the
/// defaults when no file exists, with the environment applied on top.
///
/// # Errors
/// Returns `StockSyncError::Config` if a probed file is malformed or a
/// variable cannot be parsed.
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("config.loaded_from_env");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "config.env_incomplete");
            let mut config = match probe_config_paths() {
                Some(path) => load_from_file(Some(path))?,
                None => {
                    tracing::warn!("config.no_file_found_using_defaults");
                    Config::default()
                }
            };
            apply_env_overrides(&mut config)?;
            Ok(config)
        }
    }
}

/// Load configuration from environment variables alone.
///
/// # Errors
/// Returns `StockSyncError::Config` if an owner-store variable is missing
/// or any variable has an invalid value.
pub fn load_from_env() -> Result<Config> {
    load_from_lookup(&|key| std::env::var(key).ok())
}

/// Apply every `STOCKSYNC_*` variable that is set onto `config`.
pub fn apply_env_overrides(config: &mut Config) -> Result<()> {
    overlay(config, &|key| std::env::var(key).ok())
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. Format is detected
/// by file extension.
///
/// # Errors
/// Returns `StockSyncError::Config` if the file is missing, unreadable or
/// malformed.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(StockSyncError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            StockSyncError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "config.loading_file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| StockSyncError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Probe the standard locations for a config file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidate_paths(&cwd));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(CONFIG_FILE_NAMES.iter().map(|name| exe_dir.join(name)));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Candidate files under `base`, its parent and grandparent, in probe order.
fn candidate_paths(base: &Path) -> Vec<PathBuf> {
    let dirs = [base.to_path_buf(), base.join(".."), base.join("../..")];
    dirs.iter().flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name))).collect()
}

fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| StockSyncError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| StockSyncError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(StockSyncError::Config(format!("Unsupported config format: {extension}"))),
    }
}

fn load_from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Config> {
    for key in OWNER_ENV_VARS {
        required(lookup, key)?;
    }
    let mut config = Config::default();
    overlay(&mut config, lookup)?;
    Ok(config)
}

fn overlay(config: &mut Config, lookup: &dyn Fn(&str) -> Option<String>) -> Result<()> {
    if let Some(shop) = lookup("STOCKSYNC_OWNER_SHOP") {
        config.owner_store.shop = Some(shop);
    }
    if let Some(token) = lookup("STOCKSYNC_OWNER_ACCESS_TOKEN") {
        config.owner_store.access_token = Some(token);
    }
    if let Some(location) = lookup("STOCKSYNC_OWNER_LOCATION_ID") {
        config.owner_store.location_id = Some(location);
    }

    if let Some(path) = lookup("STOCKSYNC_DB_PATH") {
        config.database.path = path;
    }
    if let Some(size) = parsed(lookup, "STOCKSYNC_DB_POOL_SIZE")? {
        config.database.pool_size = size;
    }
    if let Some(version) = lookup("STOCKSYNC_API_VERSION") {
        config.commerce.api_version = version;
    }

    if let Some(size) = parsed(lookup, "STOCKSYNC_FETCH_BATCH_SIZE")? {
        config.sync.fetch_batch_size = size;
    }
    if let Some(size) = parsed(lookup, "STOCKSYNC_WRITE_BATCH_SIZE")? {
        config.sync.write_batch_size = size;
    }
    if let Some(delay) = parsed(lookup, "STOCKSYNC_BATCH_DELAY_MS")? {
        config.sync.batch_delay_ms = delay;
    }
    if let Some(retries) = parsed(lookup, "STOCKSYNC_MAX_RETRIES")? {
        config.sync.max_retries = retries;
    }

    if let Some(enabled) = lookup("STOCKSYNC_ALERTS_ENABLED") {
        config.alerts.enabled = parse_bool(&enabled);
    }
    if let Some(endpoint) = lookup("STOCKSYNC_ALERT_ENDPOINT") {
        config.alerts.endpoint = endpoint;
    }
    if let Some(key) = lookup("STOCKSYNC_ALERT_API_KEY") {
        config.alerts.api_key = Some(key);
    }
    if let Some(from) = lookup("STOCKSYNC_ALERT_FROM") {
        config.alerts.from = from;
    }
    if let Some(to) = lookup("STOCKSYNC_ALERT_TO") {
        config.alerts.to = to
            .split(',')
            .map(str::trim)
            .filter(|address| !address.is_empty())
            .map(str::to_string)
            .collect();
    }

    if let Some(level) = lookup("STOCKSYNC_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = lookup("STOCKSYNC_LOG_JSON") {
        config.logging.json = parse_bool(&json);
    }

    Ok(())
}

fn required(lookup: &dyn Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    lookup(key).filter(|value| !value.trim().is_empty()).ok_or_else(|| {
        StockSyncError::Config(format!("Missing required environment variable: {key}"))
    })
}

fn parsed<T>(lookup: &dyn Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| StockSyncError::Config(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
}

/// Accepts `1`/`true`/`yes`/`on` (case-insensitive); anything else is false.
fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
