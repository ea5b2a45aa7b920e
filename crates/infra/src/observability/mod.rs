//! Observability infrastructure
//!
//! Structured logging through `tracing`; the subscriber is installed once by
//! [`logging::init`].

pub mod logging;
