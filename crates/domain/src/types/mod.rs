//! Domain types and models

pub mod coverage;
pub mod erp;
pub mod order;
pub mod party;
pub mod proposal;
pub mod timeline;

pub use coverage::{AbcClass, CoverageAssessment, ProductSnapshot, UrgencyTier};
pub use erp::{ErpTokenRecord, SkipReason, SyncOutcome, SyncReport, TokenSet};
pub use order::{ExternalStatus, OrderLine, OrderStatus, OrderTotals, PurchaseOrder};
pub use party::{Actor, ActorRole, NotificationPayload, Party, PartyKind};
pub use proposal::{
    AuthorRole, NegotiationProposal, ProposalLine, ProposalStatus, ProposalTerms,
};
pub use timeline::{TimelineEvent, TimelineEventType};

/// Owning buyer company identifier. Every read and write is scoped by it.
pub type TenantId = String;

/// Purchase order identifier (UUIDv7 string).
pub type OrderId = String;

/// Negotiation proposal identifier (UUIDv7 string).
pub type ProposalId = String;

/// Generate a new time-ordered identifier.
pub fn new_id() -> String {
    uuid::Uuid::now_v7().to_string()
}
