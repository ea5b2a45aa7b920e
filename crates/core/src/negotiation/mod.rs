//! Negotiation use cases
//!
//! `NegotiationService` wires the state machine, the proposal ledger and the
//! ports together. Local state is committed first; the ERP mirror is updated
//! afterwards on a best-effort basis.

pub mod ledger;
pub mod ports;
pub mod pricing;
pub mod service;

pub use ledger::{ProposalDraft, ProposalLedger, ProposalWrite};
pub use service::{NegotiationOutcome, NegotiationPorts, NegotiationService, OrderView};
