//! Error types used throughout the engine

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Procura
///
/// Sync failures against the external ERP are deliberately absent from the
/// negotiation surface: they travel as [`crate::SyncReport`] values next to a
/// successful local commit. `RateLimited` only escapes from the ERP adapter
/// layer itself.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum ProcuraError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Illegal transition or unmet precondition. Nothing was written.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Optimistic-concurrency loss. The caller must re-fetch and retry.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The actor is outside the order's tenant/role scope.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProcuraError {
    /// Stable label suitable for structured logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Database(_) => "database",
            Self::Config(_) => "config",
            Self::Network(_) => "network",
            Self::Auth(_) => "auth",
            Self::NotFound(_) => "not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::Validation(_) => "validation",
            Self::Conflict(_) => "conflict",
            Self::Forbidden(_) => "forbidden",
            Self::RateLimited(_) => "rate_limited",
            Self::Internal(_) => "internal",
        }
    }

    /// Whether repeating the same call may succeed without changing input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_) | Self::Network(_) | Self::RateLimited(_))
    }

    /// True for errors caused by the request itself rather than the system.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::InvalidInput(_) | Self::Forbidden(_) | Self::NotFound(_)
        )
    }
}

/// Result type alias for Procura operations
pub type Result<T> = std::result::Result<T, ProcuraError>;
