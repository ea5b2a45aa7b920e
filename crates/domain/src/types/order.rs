//! Purchase order aggregate types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::coverage::UrgencyTier;
use super::{OrderId, TenantId};
use crate::impl_domain_status_conversions;

/// Authoritative lifecycle state owned by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Draft,
    SentToSupplier,
    ProposalPending,
    CounterProposalPending,
    Accepted,
    Finalized,
    Canceled,
    Rejected,
}

impl_domain_status_conversions!(OrderStatus {
    Draft => "draft",
    SentToSupplier => "sent_to_supplier",
    ProposalPending => "proposal_pending",
    CounterProposalPending => "counter_proposal_pending",
    Accepted => "accepted",
    Finalized => "finalized",
    Canceled => "canceled",
    Rejected => "rejected",
});

impl OrderStatus {
    /// Terminal states have no outgoing transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finalized | Self::Canceled | Self::Rejected)
    }

    /// External status the ERP mirror should hold for this internal state.
    ///
    /// Drafts are never pushed. `Open` is only ever assigned by the ERP.
    pub fn implied_external_status(self) -> Option<ExternalStatus> {
        match self {
            Self::Draft => None,
            Self::SentToSupplier
            | Self::ProposalPending
            | Self::CounterProposalPending
            | Self::Accepted => Some(ExternalStatus::InProgress),
            Self::Finalized => Some(ExternalStatus::Fulfilled),
            Self::Canceled | Self::Rejected => Some(ExternalStatus::Canceled),
        }
    }
}

/// Mirror of the external ERP's own four-value order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum ExternalStatus {
    Open = 0,
    Fulfilled = 1,
    Canceled = 2,
    InProgress = 3,
}

impl ExternalStatus {
    /// Wire code used by the ERP status endpoint.
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Open),
            1 => Some(Self::Fulfilled),
            2 => Some(Self::Canceled),
            3 => Some(Self::InProgress),
            _ => None,
        }
    }

    /// Fulfilled or canceled orders can no longer be canceled locally.
    pub fn is_closed(self) -> bool {
        matches!(self, Self::Fulfilled | Self::Canceled)
    }
}

impl From<ExternalStatus> for u8 {
    fn from(value: ExternalStatus) -> Self {
        value.code()
    }
}

impl TryFrom<u8> for ExternalStatus {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_code(value).ok_or_else(|| format!("Invalid ExternalStatus code: {value}"))
    }
}

/// A single product line on a purchase order.
///
/// `quantity` is the billed quantity. `bonus_quantity` units ship free on top
/// of it and never affect price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub bonus_quantity: u32,
    pub original_unit_price: Decimal,
    pub discount_pct: Decimal,
    pub urgency: Option<UrgencyTier>,
}

impl OrderLine {
    /// `original_unit_price × (1 − discount_pct / 100)`, kept at full
    /// precision so line totals carry no per-unit rounding drift.
    pub fn effective_unit_price(&self) -> Decimal {
        let factor = Decimal::ONE - self.discount_pct / Decimal::ONE_HUNDRED;
        self.original_unit_price * factor
    }

    /// Units physically shipped: billed plus bonus.
    pub fn shipped_quantity(&self) -> u32 {
        self.quantity.saturating_add(self.bonus_quantity)
    }

    /// Contribution of this line to the grand total.
    pub fn line_total(&self) -> Decimal {
        self.effective_unit_price() * Decimal::from(self.quantity)
    }

    /// Undiscounted value of the billed quantity.
    pub fn gross_total(&self) -> Decimal {
        self.original_unit_price * Decimal::from(self.quantity)
    }
}

/// Monetary totals of an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub products: Decimal,
    pub discount: Decimal,
    pub freight: Decimal,
    pub grand_total: Decimal,
}

impl OrderTotals {
    /// Recompute totals from lines. Grand total is
    /// `Σ(effective_unit_price × quantity) + freight`.
    pub fn compute(lines: &[OrderLine], freight: Decimal) -> Self {
        let products: Decimal = lines.iter().map(OrderLine::gross_total).sum();
        let net: Decimal = lines.iter().map(OrderLine::line_total).sum();

        Self { products, discount: products - net, freight, grand_total: net + freight }
    }
}

/// Purchase order aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: OrderId,
    pub tenant_id: TenantId,
    pub supplier_id: String,
    pub representative_id: Option<String>,
    pub status: OrderStatus,
    /// Populated only after a successful ERP push; may lag `status`.
    pub external_status: Option<ExternalStatus>,
    /// Absent until the order has been registered in the ERP.
    pub external_order_ref: Option<String>,
    pub lines: Vec<OrderLine>,
    pub totals: OrderTotals,
    pub close_reason: Option<String>,
    /// Bumped on every committed transition; part of the compare-and-swap.
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PurchaseOrder {
    pub fn recompute_totals(&mut self) {
        self.totals = OrderTotals::compute(&self.lines, self.totals.freight);
    }

    pub fn line(&self, line_id: &str) -> Option<&OrderLine> {
        self.lines.iter().find(|line| line.id == line_id)
    }

    /// True when the ERP mirror does not yet reflect the local state.
    pub fn mirror_is_stale(&self) -> bool {
        self.external_order_ref.is_some()
            && self.status.implied_external_status().is_some()
            && self.status.implied_external_status() != self.external_status
    }
}
