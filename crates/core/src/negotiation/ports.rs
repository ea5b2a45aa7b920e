//! Port interfaces for negotiation
//!
//! These traits define the boundaries between the negotiation orchestrator
//! and infrastructure implementations.

use async_trait::async_trait;
use procura_domain::{
    ExternalStatus, NegotiationProposal, OrderStatus, Party, PurchaseOrder, Result, SyncReport,
    TimelineEvent,
};

use super::ledger::ProposalWrite;

/// Everything one transition writes, applied atomically.
#[derive(Debug, Clone)]
pub struct TransitionCommit {
    /// Status the order must still have for the write to apply.
    pub expected_status: OrderStatus,
    /// Version the order must still have for the write to apply.
    pub expected_version: i64,
    /// Next state of the order. Its `version` is `expected_version + 1`.
    pub order: PurchaseOrder,
    /// Whether `order.lines` must replace the stored lines.
    pub lines_changed: bool,
    pub proposal_writes: Vec<ProposalWrite>,
}

/// Purchase order persistence
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert a new order with its lines
    async fn insert_order(&self, order: &PurchaseOrder) -> Result<()>;

    /// Load an order visible to `tenant_id`
    async fn find_order(&self, tenant_id: &str, order_id: &str) -> Result<Option<PurchaseOrder>>;

    /// Compare-and-swap on `(status, version)`.
    ///
    /// Returns `ProcuraError::Conflict` without writing anything when the
    /// stored order moved on since it was read.
    async fn commit_transition(&self, commit: TransitionCommit) -> Result<PurchaseOrder>;

    /// Record the status the ERP confirmed. Does not touch `version`.
    ///
    /// Only applied while the stored order is still at `version`; returns
    /// `false` when a later transition superseded the push.
    async fn record_external_status(
        &self,
        tenant_id: &str,
        order_id: &str,
        version: i64,
        status: ExternalStatus,
    ) -> Result<bool>;

    /// Orders with an external ref whose mirrored status lags the local one
    async fn list_stale_mirrors(&self, tenant_id: &str, limit: usize) -> Result<Vec<PurchaseOrder>>;
}

/// Read side of the proposal ledger. Writes go through
/// [`OrderRepository::commit_transition`].
#[async_trait]
pub trait ProposalRepository: Send + Sync {
    /// Proposal history for an order, newest first
    async fn list_for_order(
        &self,
        tenant_id: &str,
        order_id: &str,
    ) -> Result<Vec<NegotiationProposal>>;
}

/// Append-only audit trail
#[async_trait]
pub trait TimelineRecorder: Send + Sync {
    async fn append(&self, event: &TimelineEvent) -> Result<()>;

    /// Events for an order, oldest first
    async fn list_for_order(&self, tenant_id: &str, order_id: &str) -> Result<Vec<TimelineEvent>>;
}

/// Best-effort status push to the external ERP.
///
/// Never fails: every problem is folded into the returned report.
#[async_trait]
pub trait ErpStatusSync: Send + Sync {
    async fn push_status(
        &self,
        tenant_id: &str,
        external_order_ref: &str,
        status: ExternalStatus,
    ) -> SyncReport;
}

/// Counterpart directory lookups
#[async_trait]
pub trait PartyDirectory: Send + Sync {
    async fn find_party(&self, tenant_id: &str, party_id: &str) -> Result<Option<Party>>;
}
