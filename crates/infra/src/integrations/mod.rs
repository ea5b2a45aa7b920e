//! External service integrations

pub mod erp;
