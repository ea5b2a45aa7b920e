//! Order lifecycle
//!
//! The state machine is the only place that decides which status an order
//! may move to next.

pub mod state_machine;

pub use state_machine::{OrderEvent, OrderStateMachine};
