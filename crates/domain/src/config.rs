//! Configuration structures
//!
//! Loading lives in `procura-infra::config`; these are the plain data types
//! plus validation.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ERP_BACKOFF_MS, DEFAULT_ERP_TIMEOUT_SECS, DEFAULT_LEAD_TIME_DAYS,
    DEFAULT_MAX_RATE_LIMIT_RETRIES, TOKEN_REFRESH_BUFFER_SECS,
};
use crate::{ProcuraError, Result};

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub erp: ErpConfig,
    #[serde(default)]
    pub negotiation: NegotiationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Reject configurations that cannot produce a working engine.
    pub fn validate(&self) -> Result<()> {
        if self.database.path.trim().is_empty() {
            return Err(ProcuraError::Config("database.path must not be empty".into()));
        }
        if self.database.pool_size == 0 {
            return Err(ProcuraError::Config("database.pool_size must be at least 1".into()));
        }
        if self.erp.enabled {
            if self.erp.base_url.trim().is_empty() || self.erp.token_url.trim().is_empty() {
                return Err(ProcuraError::Config(
                    "erp.base_url and erp.token_url are required when ERP sync is enabled".into(),
                ));
            }
            if self.erp.client_id.trim().is_empty() {
                return Err(ProcuraError::Config(
                    "erp.client_id is required when ERP sync is enabled".into(),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "procura.db".to_string(),
            pool_size: default_pool_size(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

/// External ERP connection settings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErpConfig {
    pub enabled: bool,
    pub base_url: String,
    pub token_url: String,
    pub client_id: String,
    pub client_secret: Option<String>,
    pub request_timeout_secs: u64,
    pub max_rate_limit_retries: u32,
    pub base_backoff_ms: u64,
    pub refresh_buffer_secs: i64,
}

impl Default for ErpConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: String::new(),
            token_url: String::new(),
            client_id: String::new(),
            client_secret: None,
            request_timeout_secs: DEFAULT_ERP_TIMEOUT_SECS,
            max_rate_limit_retries: DEFAULT_MAX_RATE_LIMIT_RETRIES,
            base_backoff_ms: DEFAULT_ERP_BACKOFF_MS,
            refresh_buffer_secs: TOKEN_REFRESH_BUFFER_SECS,
        }
    }
}

impl std::fmt::Debug for ErpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErpConfig")
            .field("enabled", &self.enabled)
            .field("base_url", &self.base_url)
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_rate_limit_retries", &self.max_rate_limit_retries)
            .field("base_backoff_ms", &self.base_backoff_ms)
            .field("refresh_buffer_secs", &self.refresh_buffer_secs)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NegotiationConfig {
    /// Base URL of the public order page sent to counterparts without an
    /// account.
    pub public_order_base_url: String,
    pub default_lead_time_days: u32,
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            public_order_base_url: "http://localhost:3000".to_string(),
            default_lead_time_days: DEFAULT_LEAD_TIME_DAYS,
        }
    }
}

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

fn default_pool_size() -> u32 {
    8
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}
