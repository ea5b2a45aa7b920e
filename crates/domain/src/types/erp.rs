//! External ERP token and synchronisation outcome types

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::TenantId;

/// Token pair returned by the ERP authorization server.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

impl std::fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSet")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Persisted per-tenant OAuth credentials for the ERP.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErpTokenRecord {
    pub tenant_id: TenantId,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ErpTokenRecord {
    /// Build a record from a freshly issued token set.
    pub fn from_token_set(tenant_id: impl Into<String>, tokens: TokenSet, now: DateTime<Utc>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_at: now + Duration::seconds(tokens.expires_in.max(0)),
            updated_at: now,
        }
    }

    /// True when the access token expires within `buffer_secs` of `now`.
    pub fn needs_refresh(&self, now: DateTime<Utc>, buffer_secs: i64) -> bool {
        self.expires_at <= now + Duration::seconds(buffer_secs)
    }
}

impl std::fmt::Debug for ErpTokenRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErpTokenRecord")
            .field("tenant_id", &self.tenant_id)
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Why no ERP call was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The order was never registered in the ERP.
    NoExternalRef,
    /// The internal status has no external counterpart (drafts).
    NotMirrored,
    /// ERP integration is disabled for this deployment.
    Disabled,
}

/// Result of a best-effort status push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum SyncOutcome {
    Synced,
    Skipped(SkipReason),
    /// No usable token (missing record or refresh failed).
    Unavailable(String),
    /// Still rate limited after the configured retries.
    RateLimited,
    Failed(String),
}

/// Sync outcome plus retry bookkeeping, reported alongside a local commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub outcome: SyncOutcome,
    pub retries_used: u32,
}

impl SyncReport {
    pub fn synced(retries_used: u32) -> Self {
        Self { outcome: SyncOutcome::Synced, retries_used }
    }

    pub fn skipped(reason: SkipReason) -> Self {
        Self { outcome: SyncOutcome::Skipped(reason), retries_used: 0 }
    }

    pub fn unavailable(detail: impl Into<String>) -> Self {
        Self { outcome: SyncOutcome::Unavailable(detail.into()), retries_used: 0 }
    }

    pub fn rate_limited(retries_used: u32) -> Self {
        Self { outcome: SyncOutcome::RateLimited, retries_used }
    }

    pub fn failed(detail: impl Into<String>, retries_used: u32) -> Self {
        Self { outcome: SyncOutcome::Failed(detail.into()), retries_used }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == SyncOutcome::Synced
    }

    pub fn is_rate_limited(&self) -> bool {
        self.outcome == SyncOutcome::RateLimited
    }

    /// Human-readable warning when the mirror is now behind, `None` otherwise.
    pub fn warning(&self) -> Option<String> {
        match &self.outcome {
            SyncOutcome::Synced | SyncOutcome::Skipped(_) => None,
            SyncOutcome::Unavailable(detail) => Some(format!("ERP sync unavailable: {detail}")),
            SyncOutcome::RateLimited => Some(format!(
                "ERP sync rate limited after {} retries",
                self.retries_used
            )),
            SyncOutcome::Failed(detail) => Some(format!("ERP sync failed: {detail}")),
        }
    }
}
