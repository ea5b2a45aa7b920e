//! Append-only negotiation audit trail

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::party::ActorRole;
use super::{OrderId, TenantId};
use crate::impl_domain_status_conversions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineEventType {
    DraftCreated,
    LinesUpdated,
    SentToSupplier,
    ProposalSubmitted,
    CounterProposalSubmitted,
    CounterProposalAccepted,
    CounterProposalRejected,
    Finalized,
    Canceled,
    Declined,
    ErpLinked,
    ErpResynced,
}

impl_domain_status_conversions!(TimelineEventType {
    DraftCreated => "draft_created",
    LinesUpdated => "lines_updated",
    SentToSupplier => "sent_to_supplier",
    ProposalSubmitted => "proposal_submitted",
    CounterProposalSubmitted => "counter_proposal_submitted",
    CounterProposalAccepted => "counter_proposal_accepted",
    CounterProposalRejected => "counter_proposal_rejected",
    Finalized => "finalized",
    Canceled => "canceled",
    Declined => "declined",
    ErpLinked => "erp_linked",
    ErpResynced => "erp_resynced",
});

/// Immutable timeline entry. Never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub id: String,
    pub tenant_id: TenantId,
    pub order_id: OrderId,
    pub event_type: TimelineEventType,
    pub description: String,
    pub actor_role: ActorRole,
    pub actor_name: String,
    /// Present when the ERP mirror could not be updated for this transition.
    pub sync_warning: Option<String>,
    pub created_at: DateTime<Utc>,
}
