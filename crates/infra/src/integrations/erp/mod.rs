//! External ERP integration
//!
//! # Architecture
//!
//! - **Auth**: `ErpAuthClient` - OAuth refresh-token grant
//! - **Tokens**: `ErpTokenManager` - per-tenant refresh serialization and
//!   persistence through `ErpTokenStore`
//! - **Client**: `ErpStatusClient` - status push with rate-limit backoff,
//!   health probe
//! - **Sync**: `ErpStatusSyncAdapter` - implements the core `ErpStatusSync`
//!   port

pub mod auth;
pub mod client;
pub mod errors;
pub mod sync;
pub mod token_manager;

pub use auth::ErpAuthClient;
pub use client::ErpStatusClient;
pub use errors::{ErpError, ErpErrorCategory};
pub use sync::ErpStatusSyncAdapter;
pub use token_manager::{ErpTokenManager, ErpTokenStore};
