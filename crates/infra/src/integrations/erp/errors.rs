//! ERP-specific error types and classification
//!
//! These never cross the negotiation port: the sync adapter collapses them
//! into a [`procura_domain::SyncReport`].

use std::fmt;
use std::time::Duration;

use procura_domain::ProcuraError;
use reqwest::StatusCode;
use thiserror::Error;

/// ERP error category used for retry decisions and log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErpErrorCategory {
    /// Credentials rejected (401, 403) or token refresh refused
    Auth,

    /// Rate limit exceeded (429)
    RateLimit,

    /// ERP server failure (5xx)
    Server,

    /// Request rejected (4xx except 401, 403, 429)
    Client,

    /// Unreachable or timed out
    Network,

    /// Missing or unusable local configuration
    Config,

    /// Token record could not be read or written
    Storage,
}

impl ErpErrorCategory {
    /// Only rate limiting is retried by the status client. Every other
    /// non-2xx answer is terminal for the attempt.
    pub fn should_retry(self) -> bool {
        matches!(self, Self::RateLimit)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::RateLimit => "rate_limit",
            Self::Server => "server",
            Self::Client => "client",
            Self::Network => "network",
            Self::Config => "config",
            Self::Storage => "storage",
        }
    }
}

impl fmt::Display for ErpErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ErpError {
    #[error("ERP integration misconfigured: {0}")]
    Config(String),

    #[error("ERP authorization failed: {0}")]
    Auth(String),

    #[error("ERP rate limited the request")]
    RateLimited {
        /// Server-provided `Retry-After`, when present and parseable.
        retry_after: Option<Duration>,
    },

    #[error("ERP server error (HTTP {status})")]
    Server { status: u16 },

    #[error("ERP rejected the request (HTTP {status}): {body}")]
    Client { status: u16, body: String },

    #[error("ERP unreachable: {0}")]
    Network(String),

    #[error("ERP token store failed: {0}")]
    Storage(String),
}

impl ErpError {
    pub fn category(&self) -> ErpErrorCategory {
        match self {
            Self::Config(_) => ErpErrorCategory::Config,
            Self::Auth(_) => ErpErrorCategory::Auth,
            Self::RateLimited { .. } => ErpErrorCategory::RateLimit,
            Self::Server { .. } => ErpErrorCategory::Server,
            Self::Client { .. } => ErpErrorCategory::Client,
            Self::Network(_) => ErpErrorCategory::Network,
            Self::Storage(_) => ErpErrorCategory::Storage,
        }
    }

    pub fn should_retry(&self) -> bool {
        self.category().should_retry()
    }

    /// Classify a non-success HTTP status.
    pub fn from_status(status: StatusCode, retry_after: Option<Duration>, body: String) -> Self {
        match status.as_u16() {
            401 | 403 => Self::Auth(format!("HTTP {}", status.as_u16())),
            429 => Self::RateLimited { retry_after },
            500..=599 => Self::Server { status: status.as_u16() },
            code => Self::Client { status: code, body },
        }
    }

    /// Convert to the domain error type.
    pub fn into_domain_error(self) -> ProcuraError {
        let message = self.to_string();
        match self.category() {
            ErpErrorCategory::Config => ProcuraError::Config(message),
            ErpErrorCategory::Auth => ProcuraError::Auth(message),
            ErpErrorCategory::RateLimit => ProcuraError::RateLimited(message),
            ErpErrorCategory::Client => ProcuraError::InvalidInput(message),
            ErpErrorCategory::Server | ErpErrorCategory::Network => ProcuraError::Network(message),
            ErpErrorCategory::Storage => ProcuraError::Database(message),
        }
    }
}

/// Transport failures surfaced by [`crate::http::HttpClient`].
impl From<ProcuraError> for ErpError {
    fn from(err: ProcuraError) -> Self {
        match err {
            ProcuraError::Auth(message) => Self::Auth(message),
            ProcuraError::Config(message) => Self::Config(message),
            ProcuraError::RateLimited(_) => Self::RateLimited { retry_after: None },
            other => Self::Network(other.to_string()),
        }
    }
}
