//! # Procura Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - SQLite persistence (r2d2 pool, repositories)
//! - HTTP client with retry
//! - External ERP integration (token lifecycle, status push)
//! - Configuration loading and logging setup
//! - `AppContext` wiring everything into a `NegotiationService`
//!
//! ## Architecture
//! - Implements traits defined in `procura-core`
//! - Contains all "impure" code (I/O, network)

pub mod config;
pub mod context;
pub mod database;
pub mod errors;
pub mod http;
pub mod integrations;
pub mod observability;

// Re-export commonly used items
pub use context::{AppContext, HealthReport};
pub use database::*;
pub use errors::InfraError;
pub use http::*;
pub use integrations::erp::{
    ErpAuthClient, ErpError, ErpErrorCategory, ErpStatusClient, ErpStatusSyncAdapter,
    ErpTokenManager, ErpTokenStore,
};
