//! Domain constants
//!
//! Centralized location for all domain-level constants used throughout the
//! engine.

// Coverage engine
pub const TRAILING_SALES_WINDOW_DAYS: u32 = 90;
pub const DEFAULT_LEAD_TIME_DAYS: u32 = 15;
pub const OK_COVERAGE_FACTOR: f64 = 1.5;

// Negotiation
pub const MIN_CANCEL_REASON_LEN: usize = 5;

// ERP synchronisation
pub const TOKEN_REFRESH_BUFFER_SECS: i64 = 300;
pub const DEFAULT_MAX_RATE_LIMIT_RETRIES: u32 = 3;
pub const DEFAULT_ERP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_ERP_BACKOFF_MS: u64 = 500;
pub const MAX_RETRY_AFTER_SECS: u64 = 30;

// Timeline actor used for engine-authored events
pub const SYSTEM_ACTOR_NAME: &str = "procura";
