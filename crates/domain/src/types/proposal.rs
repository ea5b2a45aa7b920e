//! Commercial proposals exchanged during a negotiation

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{OrderId, ProposalId, TenantId};
use crate::impl_domain_status_conversions;

/// Which side of the negotiation authored a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorRole {
    Supplier,
    Buyer,
}

impl_domain_status_conversions!(AuthorRole {
    Supplier => "supplier",
    Buyer => "buyer",
});

impl AuthorRole {
    pub fn opposing(self) -> Self {
        match self {
            Self::Supplier => Self::Buyer,
            Self::Buyer => Self::Supplier,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Pending,
    Accepted,
    Rejected,
}

impl_domain_status_conversions!(ProposalStatus {
    Pending => "pending",
    Accepted => "accepted",
    Rejected => "rejected",
});

/// Per-line commercial terms.
///
/// `bonus_quantity` is an absolute number of free units, not a percentage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalLine {
    pub order_line_id: String,
    pub quantity: u32,
    pub discount_pct: Decimal,
    pub bonus_quantity: u32,
}

/// Order-level commercial terms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalTerms {
    pub minimum_order_value: Option<Decimal>,
    pub valid_until: Option<NaiveDate>,
    pub delivery_lead_time_days: Option<u32>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegotiationProposal {
    pub id: ProposalId,
    pub order_id: OrderId,
    pub tenant_id: TenantId,
    pub author_role: AuthorRole,
    pub author_name: String,
    pub status: ProposalStatus,
    pub terms: ProposalTerms,
    pub lines: Vec<ProposalLine>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl NegotiationProposal {
    pub fn is_pending(&self) -> bool {
        self.status == ProposalStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposing_roles() {
        assert_eq!(AuthorRole::Buyer.opposing(), AuthorRole::Supplier);
        assert_eq!(AuthorRole::Supplier.opposing(), AuthorRole::Buyer);
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&ProposalStatus::Pending).expect("serialize");
        assert_eq!(json, "\"pending\"");
    }
}
