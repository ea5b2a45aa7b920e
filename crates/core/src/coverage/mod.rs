//! Stock coverage domain
//!
//! Turns trailing sales velocity, stock on hand, supplier lead time and ABC
//! class into an urgency tier and a suggested purchase quantity.

pub mod engine;

pub use engine::{assess, CoverageEngine};
