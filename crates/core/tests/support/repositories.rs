//! Mock repository implementations for testing
//!
//! In-memory versions of the negotiation ports, sharing one store so that a
//! commit made through the order repository is visible to the proposal and
//! timeline repositories.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use procura_core::{
    OrderRepository, PartyDirectory, ProposalRepository, ProposalWrite, TimelineRecorder,
    TransitionCommit,
};
use procura_domain::{
    ExternalStatus, NegotiationProposal, Party, ProcuraError, PurchaseOrder, Result as DomainResult,
    TimelineEvent,
};
use tokio::sync::Barrier;

#[derive(Default)]
struct StoreState {
    orders: HashMap<(String, String), PurchaseOrder>,
    proposals: Vec<NegotiationProposal>,
    timeline: Vec<TimelineEvent>,
}

/// Shared in-memory store behind every mock port.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
    read_gate: Arc<Mutex<Option<(Arc<Barrier>, usize)>>>,
    fail_timeline: Arc<AtomicBool>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `parties` order reads wait for each other, so that
    /// concurrent operations all observe the same version.
    pub fn gate_next_reads(&self, parties: usize) {
        *self.read_gate.lock().expect("gate lock") = Some((Arc::new(Barrier::new(parties)), parties));
    }

    /// Make every timeline append fail.
    pub fn fail_timeline_appends(&self) {
        self.fail_timeline.store(true, Ordering::SeqCst);
    }

    pub fn order(&self, tenant_id: &str, order_id: &str) -> Option<PurchaseOrder> {
        let state = self.state.lock().expect("state lock");
        state.orders.get(&(tenant_id.to_string(), order_id.to_string())).cloned()
    }

    pub fn proposals(&self, order_id: &str) -> Vec<NegotiationProposal> {
        let state = self.state.lock().expect("state lock");
        state.proposals.iter().filter(|p| p.order_id == order_id).cloned().collect()
    }

    pub fn timeline(&self, order_id: &str) -> Vec<TimelineEvent> {
        let state = self.state.lock().expect("state lock");
        state.timeline.iter().filter(|e| e.order_id == order_id).cloned().collect()
    }

    fn take_read_gate(&self) -> Option<Arc<Barrier>> {
        let mut gate = self.read_gate.lock().expect("gate lock");
        let (barrier, remaining) = gate.as_mut()?;
        let barrier = Arc::clone(barrier);
        *remaining -= 1;
        if *remaining == 0 {
            *gate = None;
        }
        Some(barrier)
    }
}

#[async_trait]
impl OrderRepository for InMemoryStore {
    async fn insert_order(&self, order: &PurchaseOrder) -> DomainResult<()> {
        let mut state = self.state.lock().expect("state lock");
        state.orders.insert((order.tenant_id.clone(), order.id.clone()), order.clone());
        Ok(())
    }

    async fn find_order(
        &self,
        tenant_id: &str,
        order_id: &str,
    ) -> DomainResult<Option<PurchaseOrder>> {
        let found = self.order(tenant_id, order_id);
        if let Some(barrier) = self.take_read_gate() {
            barrier.wait().await;
        }
        Ok(found)
    }

    async fn commit_transition(&self, commit: TransitionCommit) -> DomainResult<PurchaseOrder> {
        let mut state = self.state.lock().expect("state lock");
        let key = (commit.order.tenant_id.clone(), commit.order.id.clone());
        let stored = state
            .orders
            .get(&key)
            .ok_or_else(|| ProcuraError::NotFound(format!("order {}", commit.order.id)))?;
        if stored.status != commit.expected_status || stored.version != commit.expected_version {
            return Err(ProcuraError::Conflict(format!(
                "order {} changed since it was read",
                commit.order.id
            )));
        }

        for write in commit.proposal_writes {
            match write {
                ProposalWrite::Insert(proposal) => state.proposals.push(proposal),
                ProposalWrite::SetStatus { proposal_id, status, resolved_at } => {
                    if let Some(proposal) =
                        state.proposals.iter_mut().find(|p| p.id == proposal_id)
                    {
                        proposal.status = status;
                        proposal.resolved_at = resolved_at;
                    }
                }
            }
        }
        state.orders.insert(key, commit.order.clone());
        Ok(commit.order)
    }

    async fn record_external_status(
        &self,
        tenant_id: &str,
        order_id: &str,
        version: i64,
        status: ExternalStatus,
    ) -> DomainResult<bool> {
        let mut state = self.state.lock().expect("state lock");
        let order = state
            .orders
            .get_mut(&(tenant_id.to_string(), order_id.to_string()))
            .ok_or_else(|| ProcuraError::NotFound(format!("order {order_id}")))?;
        if order.version != version {
            return Ok(false);
        }
        order.external_status = Some(status);
        Ok(true)
    }

    async fn list_stale_mirrors(
        &self,
        tenant_id: &str,
        limit: usize,
    ) -> DomainResult<Vec<PurchaseOrder>> {
        let state = self.state.lock().expect("state lock");
        let mut stale: Vec<PurchaseOrder> = state
            .orders
            .values()
            .filter(|o| o.tenant_id == tenant_id && o.mirror_is_stale())
            .cloned()
            .collect();
        stale.sort_by(|a, b| a.updated_at.cmp(&b.updated_at));
        stale.truncate(limit);
        Ok(stale)
    }
}

#[async_trait]
impl ProposalRepository for InMemoryStore {
    async fn list_for_order(
        &self,
        tenant_id: &str,
        order_id: &str,
    ) -> DomainResult<Vec<NegotiationProposal>> {
        let state = self.state.lock().expect("state lock");
        let mut proposals: Vec<NegotiationProposal> = state
            .proposals
            .iter()
            .filter(|p| p.tenant_id == tenant_id && p.order_id == order_id)
            .cloned()
            .collect();
        proposals.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(proposals)
    }
}

#[async_trait]
impl TimelineRecorder for InMemoryStore {
    async fn append(&self, event: &TimelineEvent) -> DomainResult<()> {
        if self.fail_timeline.load(Ordering::SeqCst) {
            return Err(ProcuraError::Database("timeline table is locked".into()));
        }
        self.state.lock().expect("state lock").timeline.push(event.clone());
        Ok(())
    }

    async fn list_for_order(
        &self,
        tenant_id: &str,
        order_id: &str,
    ) -> DomainResult<Vec<TimelineEvent>> {
        let state = self.state.lock().expect("state lock");
        Ok(state
            .timeline
            .iter()
            .filter(|e| e.tenant_id == tenant_id && e.order_id == order_id)
            .cloned()
            .collect())
    }
}

/// Fixed counterpart directory.
#[derive(Default, Clone)]
pub struct MockPartyDirectory {
    parties: Arc<Vec<Party>>,
}

impl MockPartyDirectory {
    pub fn with_party(mut self, party: Party) -> Self {
        Arc::make_mut(&mut self.parties).push(party);
        self
    }
}

#[async_trait]
impl PartyDirectory for MockPartyDirectory {
    async fn find_party(&self, tenant_id: &str, party_id: &str) -> DomainResult<Option<Party>> {
        Ok(self.parties.iter().find(|p| p.tenant_id == tenant_id && p.id == party_id).cloned())
    }
}
