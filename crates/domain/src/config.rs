//! Configuration management

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    BATCH_DELAY_MS, CONSECUTIVE_FAILURE_THRESHOLD, DEFAULT_API_VERSION, DEFAULT_MAX_RETRIES,
    FETCH_BATCH_SIZE, HIGH_FAILURE_RATE_THRESHOLD, LOG_ERROR_LIMIT, RETRY_DELAYS_MS,
    WRITE_BATCH_SIZE,
};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sync: SyncConfig,
    pub commerce: CommerceConfig,
    pub owner_store: OwnerStoreConfig,
    pub alerts: AlertConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

/// Sync engine tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub fetch_batch_size: usize,
    pub write_batch_size: usize,
    pub batch_delay_ms: u64,
    pub max_retries: u32,
    pub retry_delays_ms: Vec<u64>,
    pub high_failure_rate_threshold: f64,
    pub consecutive_failure_threshold: u32,
    /// Number of partner errors copied into the run log message.
    pub log_error_limit: usize,
}

impl SyncConfig {
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    pub fn retry_delays(&self) -> Vec<Duration> {
        self.retry_delays_ms.iter().copied().map(Duration::from_millis).collect()
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            fetch_batch_size: FETCH_BATCH_SIZE,
            write_batch_size: WRITE_BATCH_SIZE,
            batch_delay_ms: BATCH_DELAY_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delays_ms: RETRY_DELAYS_MS.to_vec(),
            high_failure_rate_threshold: HIGH_FAILURE_RATE_THRESHOLD,
            consecutive_failure_threshold: CONSECUTIVE_FAILURE_THRESHOLD,
            log_error_limit: LOG_ERROR_LIMIT,
        }
    }
}

/// Remote commerce API settings shared by partner and owner stores
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommerceConfig {
    pub api_version: String,
    /// `https` in production; tests point shops at a local `http` server.
    pub scheme: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for CommerceConfig {
    fn default() -> Self {
        Self {
            api_version: DEFAULT_API_VERSION.to_string(),
            scheme: "https".to_string(),
            timeout_secs: 30,
            user_agent: concat!("stocksync/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Operator storefront credential
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OwnerStoreConfig {
    pub shop: Option<String>,
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
    pub location_id: Option<String>,
}

/// Critical-failure alert delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub enabled: bool,
    pub endpoint: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub from: String,
    pub to: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: "https://api.resend.com/emails".to_string(),
            api_key: None,
            from: "StockSync <alerts@stocksync.local>".to_string(),
            to: Vec::new(),
            timeout_secs: 10,
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: "stocksync.db".to_string(), pool_size: 4 }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}
