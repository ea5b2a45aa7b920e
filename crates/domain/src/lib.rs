//! # Procura Domain
//!
//! Business domain types and models for the purchase-order negotiation
//! engine.
//!
//! This crate contains:
//! - Order, proposal, timeline and ERP token data types
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other Procura crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
