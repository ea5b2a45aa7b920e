//! Order state machine
//!
//! ```text
//! draft ──send──► sent_to_supplier ──propose──► proposal_pending
//!                                                 │        ▲
//!                                              counter   reject
//!                                                 ▼        │
//!                                        counter_proposal_pending ──accept──► accepted
//!
//! draft | sent_to_supplier | proposal_pending | accepted ──finalize──► finalized
//! any non-terminal ──cancel──► canceled
//! any non-terminal ──decline──► rejected
//! ```
//!
//! `finalized`, `canceled` and `rejected` are terminal. Rejecting a counter
//! proposal returns to `proposal_pending`; the service refuses a second
//! counter round afterwards (see `ProposalLedger::has_rejected_counter`).

use procura_domain::{ActorRole, OrderStatus, ProcuraError, Result};
use serde::{Deserialize, Serialize};

/// Actor intents that drive the order lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderEvent {
    Send,
    Propose,
    Counter,
    AcceptCounter,
    RejectCounter,
    Finalize,
    Cancel,
    Decline,
}

impl OrderEvent {
    pub const ALL: [OrderEvent; 8] = [
        Self::Send,
        Self::Propose,
        Self::Counter,
        Self::AcceptCounter,
        Self::RejectCounter,
        Self::Finalize,
        Self::Cancel,
        Self::Decline,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Send => "send",
            Self::Propose => "propose",
            Self::Counter => "counter",
            Self::AcceptCounter => "accept_counter",
            Self::RejectCounter => "reject_counter",
            Self::Finalize => "finalize",
            Self::Cancel => "cancel",
            Self::Decline => "decline",
        }
    }
}

impl std::fmt::Display for OrderEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Stateless transition table.
pub struct OrderStateMachine;

impl OrderStateMachine {
    /// Resolve the target status for `event` applied in `from`.
    ///
    /// Returns `ProcuraError::Validation` for any edge not in the table.
    pub fn transition(from: OrderStatus, event: OrderEvent) -> Result<OrderStatus> {
        use OrderEvent as E;
        use OrderStatus as S;

        let to = match (from, event) {
            (S::Draft, E::Send) => Some(S::SentToSupplier),
            (S::SentToSupplier, E::Propose) => Some(S::ProposalPending),
            (S::ProposalPending, E::Counter) => Some(S::CounterProposalPending),
            (S::CounterProposalPending, E::AcceptCounter) => Some(S::Accepted),
            (S::CounterProposalPending, E::RejectCounter) => Some(S::ProposalPending),
            (S::Draft | S::SentToSupplier | S::ProposalPending | S::Accepted, E::Finalize) => {
                Some(S::Finalized)
            }
            (status, E::Cancel) if !status.is_terminal() => Some(S::Canceled),
            (status, E::Decline) if !status.is_terminal() => Some(S::Rejected),
            _ => None,
        };

        to.ok_or_else(|| {
            ProcuraError::Validation(format!("cannot {event} an order in status {from}"))
        })
    }

    /// Check that `role` may raise `event` at all, independent of status.
    pub fn authorize(event: OrderEvent, role: ActorRole) -> Result<()> {
        let allowed = match event {
            OrderEvent::Send | OrderEvent::Counter | OrderEvent::Finalize => {
                role == ActorRole::Buyer
            }
            OrderEvent::Propose
            | OrderEvent::AcceptCounter
            | OrderEvent::RejectCounter
            | OrderEvent::Decline => role.is_supplier_side(),
            OrderEvent::Cancel => role == ActorRole::Buyer || role.is_supplier_side(),
        };

        if allowed {
            Ok(())
        } else {
            Err(ProcuraError::Forbidden(format!("{role} may not {event} an order")))
        }
    }

    /// Events with a legal edge out of `status`.
    pub fn allowed_events(status: OrderStatus) -> Vec<OrderEvent> {
        OrderEvent::ALL
            .into_iter()
            .filter(|event| Self::transition(status, *event).is_ok())
            .collect()
    }
}
