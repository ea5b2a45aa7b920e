//! Proposal ledger
//!
//! Works on an in-memory copy of an order's proposal history and records
//! every mutation as a [`ProposalWrite`]. The writes are committed together
//! with the order's status change, so either both land or neither does.

use chrono::{DateTime, Utc};
use procura_domain::{
    new_id, AuthorRole, NegotiationProposal, ProcuraError, ProposalLine, ProposalStatus,
    ProposalTerms, Result,
};

/// Input for a new proposal.
#[derive(Debug, Clone, PartialEq)]
pub struct ProposalDraft {
    pub author_role: AuthorRole,
    pub author_name: String,
    pub terms: ProposalTerms,
    pub lines: Vec<ProposalLine>,
}

/// A single pending persistence step produced by the ledger.
#[derive(Debug, Clone, PartialEq)]
pub enum ProposalWrite {
    Insert(NegotiationProposal),
    SetStatus {
        proposal_id: String,
        status: ProposalStatus,
        resolved_at: Option<DateTime<Utc>>,
    },
}

#[derive(Debug, Clone)]
pub struct ProposalLedger {
    tenant_id: String,
    order_id: String,
    proposals: Vec<NegotiationProposal>,
    writes: Vec<ProposalWrite>,
}

impl ProposalLedger {
    pub fn new(
        tenant_id: impl Into<String>,
        order_id: impl Into<String>,
        mut proposals: Vec<NegotiationProposal>,
    ) -> Self {
        // newest first; UUIDv7 ids break timestamp ties
        proposals.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Self { tenant_id: tenant_id.into(), order_id: order_id.into(), proposals, writes: Vec::new() }
    }

    /// Proposal history, newest first.
    pub fn proposals(&self) -> &[NegotiationProposal] {
        &self.proposals
    }

    pub fn pending(&self) -> Option<&NegotiationProposal> {
        self.proposals.iter().find(|p| p.is_pending())
    }

    pub fn pending_from(&self, role: AuthorRole) -> Option<&NegotiationProposal> {
        self.pending().filter(|p| p.author_role == role)
    }

    pub fn latest(&self) -> Option<&NegotiationProposal> {
        self.proposals.first()
    }

    /// True once the supplier has turned down a buyer counter proposal.
    pub fn has_rejected_counter(&self) -> bool {
        self.proposals
            .iter()
            .any(|p| p.author_role == AuthorRole::Buyer && p.status == ProposalStatus::Rejected)
    }

    /// Resolve any pending proposal as rejected, then insert the new one as
    /// pending.
    pub fn submit(&mut self, draft: ProposalDraft, now: DateTime<Utc>) -> Result<NegotiationProposal> {
        let pending_ids: Vec<String> =
            self.proposals.iter().filter(|p| p.is_pending()).map(|p| p.id.clone()).collect();
        for id in pending_ids {
            self.set_status(&id, ProposalStatus::Rejected, Some(now))?;
        }

        let proposal = NegotiationProposal {
            id: new_id(),
            order_id: self.order_id.clone(),
            tenant_id: self.tenant_id.clone(),
            author_role: draft.author_role,
            author_name: draft.author_name,
            status: ProposalStatus::Pending,
            terms: draft.terms,
            lines: draft.lines,
            created_at: now,
            resolved_at: None,
        };
        self.proposals.insert(0, proposal.clone());
        self.writes.push(ProposalWrite::Insert(proposal.clone()));

        self.check_single_pending()?;
        Ok(proposal)
    }

    /// Mark a pending proposal as accepted.
    pub fn accept(&mut self, proposal_id: &str, now: DateTime<Utc>) -> Result<NegotiationProposal> {
        self.require_pending(proposal_id)?;
        self.set_status(proposal_id, ProposalStatus::Accepted, Some(now))
    }

    /// Mark a pending proposal as rejected.
    pub fn reject(&mut self, proposal_id: &str, now: DateTime<Utc>) -> Result<NegotiationProposal> {
        self.require_pending(proposal_id)?;
        self.set_status(proposal_id, ProposalStatus::Rejected, Some(now))
    }

    /// Put the most recent rejected proposal of `role` back to pending.
    pub fn reactivate_latest_rejected(&mut self, role: AuthorRole) -> Result<NegotiationProposal> {
        let id = self
            .proposals
            .iter()
            .find(|p| p.author_role == role && p.status == ProposalStatus::Rejected)
            .map(|p| p.id.clone())
            .ok_or_else(|| {
                ProcuraError::Validation(format!("no rejected {role} proposal to reactivate"))
            })?;

        let reactivated = self.set_status(&id, ProposalStatus::Pending, None)?;
        self.check_single_pending()?;
        Ok(reactivated)
    }

    /// Reject whatever is still pending. Used when the order closes.
    pub fn resolve_all_pending(&mut self, now: DateTime<Utc>) -> Result<()> {
        let pending_ids: Vec<String> =
            self.proposals.iter().filter(|p| p.is_pending()).map(|p| p.id.clone()).collect();
        for id in pending_ids {
            self.set_status(&id, ProposalStatus::Rejected, Some(now))?;
        }
        Ok(())
    }

    pub fn check_single_pending(&self) -> Result<()> {
        let pending = self.proposals.iter().filter(|p| p.is_pending()).count();
        if pending > 1 {
            return Err(ProcuraError::Internal(format!(
                "order {} has {pending} pending proposals",
                self.order_id
            )));
        }
        Ok(())
    }

    pub fn into_writes(self) -> Vec<ProposalWrite> {
        self.writes
    }

    fn require_pending(&self, proposal_id: &str) -> Result<()> {
        let proposal = self
            .proposals
            .iter()
            .find(|p| p.id == proposal_id)
            .ok_or_else(|| ProcuraError::NotFound(format!("proposal {proposal_id}")))?;
        if !proposal.is_pending() {
            return Err(ProcuraError::Validation(format!(
                "proposal {proposal_id} is {} and can no longer be resolved",
                proposal.status
            )));
        }
        Ok(())
    }

    fn set_status(
        &mut self,
        proposal_id: &str,
        status: ProposalStatus,
        resolved_at: Option<DateTime<Utc>>,
    ) -> Result<NegotiationProposal> {
        let proposal = self
            .proposals
            .iter_mut()
            .find(|p| p.id == proposal_id)
            .ok_or_else(|| ProcuraError::NotFound(format!("proposal {proposal_id}")))?;
        proposal.status = status;
        proposal.resolved_at = resolved_at;

        self.writes.push(ProposalWrite::SetStatus {
            proposal_id: proposal_id.to_string(),
            status,
            resolved_at,
        });
        Ok(proposal.clone())
    }
}
