//! Negotiation orchestrator - core business logic
//!
//! Every status-changing operation follows the same steps:
//!
//! 1. load the order scoped by tenant and check the actor is a party to it
//! 2. authorize the event for the actor's role and resolve the next status
//! 3. mutate ledger and lines in memory
//! 4. commit everything with a compare-and-swap on `(status, version)`
//! 5. push the implied external status to the ERP (best effort)
//! 6. append a timeline event carrying any sync warning
//!
//! Steps 5 and 6 never fail the operation.

use std::sync::Arc;

use chrono::Utc;
use procura_domain::constants::MIN_CANCEL_REASON_LEN;
use procura_domain::{
    new_id, Actor, ActorRole, AuthorRole, NegotiationConfig, NegotiationProposal,
    NotificationPayload, OrderId, OrderLine, OrderStatus, OrderTotals, ProcuraError,
    ProductSnapshot, ProposalLine, ProposalTerms, PurchaseOrder, Result, SkipReason, SyncReport,
    TimelineEvent, TimelineEventType,
};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::ledger::{ProposalDraft, ProposalLedger, ProposalWrite};
use super::ports::{
    ErpStatusSync, OrderRepository, PartyDirectory, ProposalRepository, TimelineRecorder,
    TransitionCommit,
};
use super::pricing::{apply_proposal_lines, validate_order_lines, validate_proposal_lines};
use crate::coverage::CoverageEngine;
use crate::order::{OrderEvent, OrderStateMachine};

/// Collaborators the orchestrator depends on.
#[derive(Clone)]
pub struct NegotiationPorts {
    pub orders: Arc<dyn OrderRepository>,
    pub proposals: Arc<dyn ProposalRepository>,
    pub timeline: Arc<dyn TimelineRecorder>,
    pub erp: Arc<dyn ErpStatusSync>,
    pub parties: Arc<dyn PartyDirectory>,
}

/// Result of a successful negotiation operation.
///
/// `sync` tells whether the ERP mirror caught up; a failed sync never turns
/// the local commit into an error.
#[derive(Debug, Clone, Serialize)]
pub struct NegotiationOutcome {
    pub order: PurchaseOrder,
    pub sync: SyncReport,
    /// Proposal created, accepted or reactivated by the operation.
    pub proposal: Option<NegotiationProposal>,
}

/// Order with its full negotiation history.
#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    pub order: PurchaseOrder,
    /// Newest first
    pub proposals: Vec<NegotiationProposal>,
    /// Oldest first
    pub timeline: Vec<TimelineEvent>,
    /// Events the viewing actor could raise right now.
    pub allowed_events: Vec<OrderEvent>,
}

struct Transition {
    event_type: TimelineEventType,
    description: String,
    next: PurchaseOrder,
    lines_changed: bool,
    writes: Vec<ProposalWrite>,
    proposal: Option<NegotiationProposal>,
}

/// Negotiation orchestrator
pub struct NegotiationService {
    orders: Arc<dyn OrderRepository>,
    proposals: Arc<dyn ProposalRepository>,
    timeline: Arc<dyn TimelineRecorder>,
    erp: Arc<dyn ErpStatusSync>,
    parties: Arc<dyn PartyDirectory>,
    coverage: CoverageEngine,
    config: NegotiationConfig,
}

impl NegotiationService {
    pub fn new(ports: NegotiationPorts, config: NegotiationConfig) -> Self {
        Self {
            orders: ports.orders,
            proposals: ports.proposals,
            timeline: ports.timeline,
            erp: ports.erp,
            parties: ports.parties,
            coverage: CoverageEngine::new(config.default_lead_time_days),
            config,
        }
    }

    /// Create a draft order seeded with every product that needs stock.
    #[instrument(skip(self, actor, products), fields(tenant_id = %actor.tenant_id))]
    pub async fn create_draft(
        &self,
        actor: &Actor,
        supplier_id: &str,
        representative_id: Option<&str>,
        products: &[ProductSnapshot],
    ) -> Result<NegotiationOutcome> {
        require_role(actor, &[ActorRole::Buyer], "create a draft order")?;
        if supplier_id.trim().is_empty() {
            return Err(ProcuraError::InvalidInput("supplier_id must not be empty".into()));
        }

        let now = Utc::now();
        let mut order = PurchaseOrder {
            id: new_id(),
            tenant_id: actor.tenant_id.clone(),
            supplier_id: supplier_id.to_string(),
            representative_id: representative_id.map(str::to_string),
            status: OrderStatus::Draft,
            external_status: None,
            external_order_ref: None,
            lines: self.coverage.seed_lines(products),
            totals: OrderTotals::default(),
            close_reason: None,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        order.recompute_totals();

        self.orders.insert_order(&order).await?;
        info!(order_id = %order.id, lines = order.lines.len(), "Draft order created");

        let description = format!("Draft created with {} line(s)", order.lines.len());
        self.record(actor, &order, TimelineEventType::DraftCreated, description, None).await;

        Ok(NegotiationOutcome {
            order,
            sync: SyncReport::skipped(SkipReason::NotMirrored),
            proposal: None,
        })
    }

    /// Replace every line of a draft order.
    #[instrument(skip(self, actor, lines), fields(tenant_id = %actor.tenant_id))]
    pub async fn replace_draft_lines(
        &self,
        actor: &Actor,
        order_id: &str,
        lines: Vec<OrderLine>,
    ) -> Result<NegotiationOutcome> {
        require_role(actor, &[ActorRole::Buyer], "edit order lines")?;
        validate_order_lines(&lines)?;

        let current = self.load_scoped(actor, order_id).await?;
        if current.status != OrderStatus::Draft {
            return Err(ProcuraError::Validation(format!(
                "lines can only be edited on a draft order, order is {}",
                current.status
            )));
        }

        let mut next = next_version(&current);
        next.lines = lines
            .into_iter()
            .map(|mut line| {
                if line.id.is_empty() {
                    line.id = new_id();
                }
                line
            })
            .collect();
        next.recompute_totals();

        let description = format!(
            "Lines updated: {} line(s), total {}",
            next.lines.len(),
            next.totals.grand_total
        );
        self.commit(
            actor,
            &current,
            Transition {
                event_type: TimelineEventType::LinesUpdated,
                description,
                next,
                lines_changed: true,
                writes: Vec::new(),
                proposal: None,
            },
        )
        .await
    }

    /// Record the identifier the ERP assigned to this order and push the
    /// current status to it.
    #[instrument(skip(self, actor), fields(tenant_id = %actor.tenant_id))]
    pub async fn attach_external_ref(
        &self,
        actor: &Actor,
        order_id: &str,
        external_order_ref: &str,
    ) -> Result<NegotiationOutcome> {
        require_role(actor, &[ActorRole::Buyer, ActorRole::System], "link an order to the ERP")?;
        let external_order_ref = external_order_ref.trim();
        if external_order_ref.is_empty() {
            return Err(ProcuraError::InvalidInput("external order ref must not be empty".into()));
        }

        let current = self.load_scoped(actor, order_id).await?;
        if let Some(existing) = &current.external_order_ref {
            return Err(ProcuraError::Validation(format!(
                "order {} is already linked to ERP order {existing}",
                current.id
            )));
        }

        let mut next = next_version(&current);
        next.external_order_ref = Some(external_order_ref.to_string());

        self.commit(
            actor,
            &current,
            Transition {
                event_type: TimelineEventType::ErpLinked,
                description: format!("Linked to ERP order {external_order_ref}"),
                next,
                lines_changed: false,
                writes: Vec::new(),
                proposal: None,
            },
        )
        .await
    }

    #[instrument(skip(self, actor), fields(tenant_id = %actor.tenant_id))]
    pub async fn send_to_supplier(&self, actor: &Actor, order_id: &str) -> Result<NegotiationOutcome> {
        let current = self.load_scoped(actor, order_id).await?;
        let next = self.begin(actor, &current, OrderEvent::Send)?;
        if current.lines.is_empty() {
            return Err(ProcuraError::Validation("order has no line items".into()));
        }

        self.commit(
            actor,
            &current,
            Transition {
                event_type: TimelineEventType::SentToSupplier,
                description: format!("Order sent to supplier, total {}", current.totals.grand_total),
                next,
                lines_changed: false,
                writes: Vec::new(),
                proposal: None,
            },
        )
        .await
    }

    /// Supplier answers the order with commercial terms.
    #[instrument(skip(self, actor, terms, lines), fields(tenant_id = %actor.tenant_id))]
    pub async fn submit_proposal(
        &self,
        actor: &Actor,
        order_id: &str,
        terms: ProposalTerms,
        lines: Vec<ProposalLine>,
    ) -> Result<NegotiationOutcome> {
        let current = self.load_scoped(actor, order_id).await?;
        let next = self.begin(actor, &current, OrderEvent::Propose)?;
        validate_proposal_lines(&current, &lines)?;

        let mut ledger = self.ledger_for(&current).await?;
        let proposal = ledger.submit(
            ProposalDraft {
                author_role: AuthorRole::Supplier,
                author_name: actor.name.clone(),
                terms,
                lines,
            },
            next.updated_at,
        )?;

        self.commit(
            actor,
            &current,
            Transition {
                event_type: TimelineEventType::ProposalSubmitted,
                description: format!("{} submitted a proposal", actor.name),
                next,
                lines_changed: false,
                writes: ledger.into_writes(),
                proposal: Some(proposal),
            },
        )
        .await
    }

    /// Buyer answers the pending supplier proposal. Allowed once per
    /// negotiation.
    #[instrument(skip(self, actor, terms, lines), fields(tenant_id = %actor.tenant_id))]
    pub async fn submit_counter_proposal(
        &self,
        actor: &Actor,
        order_id: &str,
        terms: ProposalTerms,
        lines: Vec<ProposalLine>,
    ) -> Result<NegotiationOutcome> {
        let current = self.load_scoped(actor, order_id).await?;
        let next = self.begin(actor, &current, OrderEvent::Counter)?;

        let mut ledger = self.ledger_for(&current).await?;
        if ledger.has_rejected_counter() {
            return Err(ProcuraError::Validation(
                "a counter proposal was already rejected; only one counter round is allowed".into(),
            ));
        }
        if ledger.pending_from(AuthorRole::Supplier).is_none() {
            return Err(ProcuraError::Validation(
                "a counter proposal requires a pending supplier proposal".into(),
            ));
        }
        validate_proposal_lines(&current, &lines)?;

        let proposal = ledger.submit(
            ProposalDraft {
                author_role: AuthorRole::Buyer,
                author_name: actor.name.clone(),
                terms,
                lines,
            },
            next.updated_at,
        )?;

        self.commit(
            actor,
            &current,
            Transition {
                event_type: TimelineEventType::CounterProposalSubmitted,
                description: format!("{} submitted a counter proposal", actor.name),
                next,
                lines_changed: false,
                writes: ledger.into_writes(),
                proposal: Some(proposal),
            },
        )
        .await
    }

    /// Supplier accepts the buyer's counter proposal; its terms are applied
    /// to the order lines.
    #[instrument(skip(self, actor), fields(tenant_id = %actor.tenant_id))]
    pub async fn accept_counter_proposal(
        &self,
        actor: &Actor,
        order_id: &str,
    ) -> Result<NegotiationOutcome> {
        let current = self.load_scoped(actor, order_id).await?;
        let mut next = self.begin(actor, &current, OrderEvent::AcceptCounter)?;

        let mut ledger = self.ledger_for(&current).await?;
        let pending = ledger
            .pending_from(AuthorRole::Buyer)
            .cloned()
            .ok_or_else(|| ProcuraError::Validation("no counter proposal is pending".into()))?;
        if ledger.latest().map(|p| p.id.as_str()) != Some(pending.id.as_str()) {
            return Err(ProcuraError::Validation(
                "the pending counter proposal is not the most recent proposal".into(),
            ));
        }

        let accepted = ledger.accept(&pending.id, next.updated_at)?;
        apply_proposal_lines(&mut next, &accepted.lines)?;

        let description = format!(
            "{} accepted the counter proposal, new total {}",
            actor.name, next.totals.grand_total
        );
        self.commit(
            actor,
            &current,
            Transition {
                event_type: TimelineEventType::CounterProposalAccepted,
                description,
                next,
                lines_changed: true,
                writes: ledger.into_writes(),
                proposal: Some(accepted),
            },
        )
        .await
    }

    /// Supplier turns down the counter proposal; its own latest proposal
    /// becomes pending again.
    #[instrument(skip(self, actor), fields(tenant_id = %actor.tenant_id))]
    pub async fn reject_counter_proposal(
        &self,
        actor: &Actor,
        order_id: &str,
    ) -> Result<NegotiationOutcome> {
        let current = self.load_scoped(actor, order_id).await?;
        let next = self.begin(actor, &current, OrderEvent::RejectCounter)?;

        let mut ledger = self.ledger_for(&current).await?;
        let pending = ledger
            .pending_from(AuthorRole::Buyer)
            .cloned()
            .ok_or_else(|| ProcuraError::Validation("no counter proposal is pending".into()))?;
        ledger.reject(&pending.id, next.updated_at)?;
        let reactivated = ledger.reactivate_latest_rejected(AuthorRole::Supplier)?;

        self.commit(
            actor,
            &current,
            Transition {
                event_type: TimelineEventType::CounterProposalRejected,
                description: format!("{} rejected the counter proposal", actor.name),
                next,
                lines_changed: false,
                writes: ledger.into_writes(),
                proposal: Some(reactivated),
            },
        )
        .await
    }

    /// Close the negotiation. A pending supplier proposal is accepted on the
    /// way.
    #[instrument(skip(self, actor), fields(tenant_id = %actor.tenant_id))]
    pub async fn finalize(&self, actor: &Actor, order_id: &str) -> Result<NegotiationOutcome> {
        let current = self.load_scoped(actor, order_id).await?;
        let mut next = self.begin(actor, &current, OrderEvent::Finalize)?;

        let mut ledger = self.ledger_for(&current).await?;
        let mut accepted = None;
        if current.status == OrderStatus::ProposalPending {
            if let Some(pending) = ledger.pending_from(AuthorRole::Supplier).cloned() {
                let proposal = ledger.accept(&pending.id, next.updated_at)?;
                apply_proposal_lines(&mut next, &proposal.lines)?;
                accepted = Some(proposal);
            }
        }
        ledger.resolve_all_pending(next.updated_at)?;

        let description =
            format!("Order finalized by {}, total {}", actor.name, next.totals.grand_total);
        self.commit(
            actor,
            &current,
            Transition {
                event_type: TimelineEventType::Finalized,
                description,
                lines_changed: accepted.is_some(),
                next,
                writes: ledger.into_writes(),
                proposal: accepted,
            },
        )
        .await
    }

    /// Cancel a non-terminal order. Buyer or supplier side.
    #[instrument(skip(self, actor, reason), fields(tenant_id = %actor.tenant_id))]
    pub async fn cancel(
        &self,
        actor: &Actor,
        order_id: &str,
        reason: &str,
    ) -> Result<NegotiationOutcome> {
        let reason = validate_reason(reason)?;
        self.close(actor, order_id, OrderEvent::Cancel, reason).await
    }

    /// Supplier side refuses the order outright.
    #[instrument(skip(self, actor, reason), fields(tenant_id = %actor.tenant_id))]
    pub async fn decline(
        &self,
        actor: &Actor,
        order_id: &str,
        reason: &str,
    ) -> Result<NegotiationOutcome> {
        let reason = validate_reason(reason)?;
        self.close(actor, order_id, OrderEvent::Decline, reason).await
    }

    /// Push the status implied by the order's current state again.
    #[instrument(skip(self, actor), fields(tenant_id = %actor.tenant_id))]
    pub async fn resync_order(&self, actor: &Actor, order_id: &str) -> Result<NegotiationOutcome> {
        require_role(actor, &[ActorRole::Buyer, ActorRole::System], "resync an order")?;
        let mut order = self.load_scoped(actor, order_id).await?;

        let sync = self.mirror(&mut order).await;
        if sync.is_success() {
            self.record_resync(actor, &order).await;
        }
        Ok(NegotiationOutcome { order, sync, proposal: None })
    }

    /// Re-push every order whose ERP mirror lags behind.
    #[instrument(skip(self))]
    pub async fn resync_stale(
        &self,
        tenant_id: &str,
        limit: usize,
    ) -> Result<Vec<(OrderId, SyncReport)>> {
        let actor = Actor::system(tenant_id);
        let stale = self.orders.list_stale_mirrors(tenant_id, limit).await?;
        debug!(count = stale.len(), "Found orders with a stale ERP mirror");

        let mut results = Vec::with_capacity(stale.len());
        for mut order in stale {
            let sync = self.mirror(&mut order).await;
            if sync.is_success() {
                self.record_resync(&actor, &order).await;
            }
            results.push((order.id, sync));
        }

        let synced = results.iter().filter(|(_, report)| report.is_success()).count();
        info!(synced, total = results.len(), "Stale ERP mirrors resynced");
        Ok(results)
    }

    /// Messaging payload for a counterpart without a platform account.
    ///
    /// `None` when the counterpart can log in and see the order themselves.
    #[instrument(skip(self, actor), fields(tenant_id = %actor.tenant_id))]
    pub async fn counterpart_contact(
        &self,
        actor: &Actor,
        order_id: &str,
    ) -> Result<Option<NotificationPayload>> {
        require_role(actor, &[ActorRole::Buyer], "contact the counterpart")?;
        let order = self.load_scoped(actor, order_id).await?;

        let party_id = order.representative_id.as_deref().unwrap_or(&order.supplier_id);
        let party = self
            .parties
            .find_party(&order.tenant_id, party_id)
            .await?
            .ok_or_else(|| ProcuraError::NotFound(format!("counterpart {party_id}")))?;
        if party.has_account {
            return Ok(None);
        }

        let phone = party
            .phone
            .filter(|phone| !phone.trim().is_empty())
            .ok_or_else(|| {
                ProcuraError::Validation(format!("counterpart {} has no phone on file", party.id))
            })?;
        let public_order_link = format!(
            "{}/orders/{}",
            self.config.public_order_base_url.trim_end_matches('/'),
            order.id
        );

        Ok(Some(NotificationPayload { recipient_name: party.name, phone, public_order_link }))
    }

    #[instrument(skip(self, actor), fields(tenant_id = %actor.tenant_id))]
    pub async fn order_view(&self, actor: &Actor, order_id: &str) -> Result<OrderView> {
        let order = self.load_scoped(actor, order_id).await?;
        let proposals = self.proposals.list_for_order(&order.tenant_id, &order.id).await?;
        let timeline = self.timeline.list_for_order(&order.tenant_id, &order.id).await?;
        let allowed_events = OrderStateMachine::allowed_events(order.status)
            .into_iter()
            .filter(|event| OrderStateMachine::authorize(*event, actor.role).is_ok())
            .collect();

        Ok(OrderView { order, proposals, timeline, allowed_events })
    }

    async fn close(
        &self,
        actor: &Actor,
        order_id: &str,
        event: OrderEvent,
        reason: String,
    ) -> Result<NegotiationOutcome> {
        let current = self.load_scoped(actor, order_id).await?;
        let mut next = self.begin(actor, &current, event)?;
        if let Some(external) = current.external_status.filter(|status| status.is_closed()) {
            return Err(ProcuraError::Validation(format!(
                "order is already closed in the ERP (status {})",
                external.code()
            )));
        }

        let mut ledger = self.ledger_for(&current).await?;
        ledger.resolve_all_pending(next.updated_at)?;
        next.close_reason = Some(reason.clone());

        let (event_type, verb) = match event {
            OrderEvent::Decline => (TimelineEventType::Declined, "declined"),
            _ => (TimelineEventType::Canceled, "canceled"),
        };
        self.commit(
            actor,
            &current,
            Transition {
                event_type,
                description: format!("Order {verb} by {}: {reason}", actor.name),
                next,
                lines_changed: false,
                writes: ledger.into_writes(),
                proposal: None,
            },
        )
        .await
    }

    async fn load_scoped(&self, actor: &Actor, order_id: &str) -> Result<PurchaseOrder> {
        let order = self
            .orders
            .find_order(&actor.tenant_id, order_id)
            .await?
            .ok_or_else(|| ProcuraError::NotFound(format!("order {order_id}")))?;
        check_scope(actor, &order)?;
        Ok(order)
    }

    async fn ledger_for(&self, order: &PurchaseOrder) -> Result<ProposalLedger> {
        let history = self.proposals.list_for_order(&order.tenant_id, &order.id).await?;
        Ok(ProposalLedger::new(&order.tenant_id, &order.id, history))
    }

    fn begin(&self, actor: &Actor, current: &PurchaseOrder, event: OrderEvent) -> Result<PurchaseOrder> {
        OrderStateMachine::authorize(event, actor.role)?;
        let status = OrderStateMachine::transition(current.status, event)?;

        let mut next = next_version(current);
        next.status = status;
        Ok(next)
    }

    async fn commit(
        &self,
        actor: &Actor,
        current: &PurchaseOrder,
        transition: Transition,
    ) -> Result<NegotiationOutcome> {
        let Transition { event_type, description, next, lines_changed, writes, proposal } =
            transition;

        let commit = TransitionCommit {
            expected_status: current.status,
            expected_version: current.version,
            order: next,
            lines_changed,
            proposal_writes: writes,
        };
        let mut order = self.orders.commit_transition(commit).await?;
        info!(
            order_id = %order.id,
            from = %current.status,
            to = %order.status,
            version = order.version,
            "Order transition committed"
        );

        let sync = self.mirror(&mut order).await;
        self.record(actor, &order, event_type, description, sync.warning()).await;

        Ok(NegotiationOutcome { order, sync, proposal })
    }

    /// Push the implied external status and remember it when the ERP accepts.
    async fn mirror(&self, order: &mut PurchaseOrder) -> SyncReport {
        let Some(target) = order.status.implied_external_status() else {
            return SyncReport::skipped(SkipReason::NotMirrored);
        };
        let Some(external_ref) = order.external_order_ref.clone() else {
            return SyncReport::skipped(SkipReason::NoExternalRef);
        };

        let report = self.erp.push_status(&order.tenant_id, &external_ref, target).await;
        if report.is_success() {
            let recorded = self
                .orders
                .record_external_status(&order.tenant_id, &order.id, order.version, target)
                .await;
            match recorded {
                Ok(true) => order.external_status = Some(target),
                Ok(false) => debug!(
                    order_id = %order.id,
                    version = order.version,
                    "Order moved on before the ERP answered, mirror left to the newer push"
                ),
                Err(err) => warn!(
                    order_id = %order.id,
                    error = %err,
                    "ERP accepted the status but recording it locally failed"
                ),
            }
        } else if let Some(warning) = report.warning() {
            warn!(
                order_id = %order.id,
                external_ref = %external_ref,
                retries = report.retries_used,
                "{warning}"
            );
        }
        report
    }

    async fn record_resync(&self, actor: &Actor, order: &PurchaseOrder) {
        let code = order.external_status.map(|status| status.code()).unwrap_or_default();
        let description = format!("ERP status resynced to {code}");
        self.record(actor, order, TimelineEventType::ErpResynced, description, None).await;
    }

    async fn record(
        &self,
        actor: &Actor,
        order: &PurchaseOrder,
        event_type: TimelineEventType,
        description: String,
        sync_warning: Option<String>,
    ) {
        let event = TimelineEvent {
            id: new_id(),
            tenant_id: order.tenant_id.clone(),
            order_id: order.id.clone(),
            event_type,
            description,
            actor_role: actor.role,
            actor_name: actor.name.clone(),
            sync_warning,
            created_at: Utc::now(),
        };

        if let Err(err) = self.timeline.append(&event).await {
            warn!(
                order_id = %order.id,
                event_type = %event_type,
                error = %err,
                "Failed to append timeline event"
            );
        }
    }
}

fn next_version(current: &PurchaseOrder) -> PurchaseOrder {
    let mut next = current.clone();
    next.version = current.version + 1;
    next.updated_at = Utc::now();
    next
}

fn require_role(actor: &Actor, roles: &[ActorRole], action: &str) -> Result<()> {
    if roles.contains(&actor.role) {
        Ok(())
    } else {
        Err(ProcuraError::Forbidden(format!("{} may not {action}", actor.role)))
    }
}

fn check_scope(actor: &Actor, order: &PurchaseOrder) -> Result<()> {
    let in_scope = match actor.role {
        ActorRole::Buyer | ActorRole::System => actor.party_id == order.tenant_id,
        ActorRole::Supplier => actor.party_id == order.supplier_id,
        ActorRole::Representative => {
            order.representative_id.as_deref() == Some(actor.party_id.as_str())
        }
    };

    if in_scope {
        Ok(())
    } else {
        Err(ProcuraError::Forbidden(format!("{} is not a party to order {}", actor.role, order.id)))
    }
}

fn validate_reason(reason: &str) -> Result<String> {
    let reason = reason.trim();
    if reason.chars().count() < MIN_CANCEL_REASON_LEN {
        return Err(ProcuraError::Validation(format!(
            "reason must be at least {MIN_CANCEL_REASON_LEN} characters"
        )));
    }
    Ok(reason.to_string())
}
