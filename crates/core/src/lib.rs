//! # Procura Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Coverage engine (stock coverage and urgency scoring)
//! - Order state machine (legal lifecycle transitions)
//! - Proposal ledger (single-active-proposal bookkeeping and pricing)
//! - Port/adapter interfaces (traits)
//! - The negotiation orchestrator (`NegotiationService`)
//!
//! ## Architecture Principles
//! - Only depends on `procura-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod coverage;
pub mod negotiation;
pub mod order;

// Re-export specific items to avoid ambiguity
pub use coverage::{assess, CoverageEngine};
pub use negotiation::ledger::{ProposalDraft, ProposalLedger, ProposalWrite};
pub use negotiation::ports::{
    ErpStatusSync, OrderRepository, PartyDirectory, ProposalRepository, TimelineRecorder,
    TransitionCommit,
};
pub use negotiation::service::{NegotiationOutcome, NegotiationPorts, NegotiationService, OrderView};
pub use order::state_machine::{OrderEvent, OrderStateMachine};
