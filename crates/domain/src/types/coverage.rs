//! Stock coverage types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// Product importance tier by revenue or volume contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AbcClass {
    A,
    B,
    C,
    D,
}

impl_domain_status_conversions!(AbcClass {
    A => "a",
    B => "b",
    C => "c",
    D => "d",
});

impl AbcClass {
    /// Safety margin added on top of the lead time.
    pub fn safety_margin(self) -> f64 {
        match self {
            Self::A => 0.50,
            Self::B => 0.30,
            Self::C => 0.20,
            Self::D => 0.10,
        }
    }

    /// The more critical of two labels (A beats B beats C beats D).
    pub fn most_critical(self, other: Self) -> Self {
        self.min(other)
    }
}

/// Replenishment urgency. Ordered from most to least urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UrgencyTier {
    Critical,
    High,
    Medium,
    Ok,
}

impl_domain_status_conversions!(UrgencyTier {
    Critical => "critical",
    High => "high",
    Medium => "medium",
    Ok => "ok",
});

/// Derived per-product coverage figures. Not persisted on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageAssessment {
    pub daily_average_sales: f64,
    /// `None` when there is no sales history and coverage is undefined.
    pub days_of_coverage: Option<f64>,
    pub days_required: f64,
    pub lead_time_days: u32,
    pub effective_class: AbcClass,
    pub urgency_tier: UrgencyTier,
    /// Units needed to reach `days_required` of coverage.
    pub suggested_quantity: u32,
}

/// Inventory and sales snapshot used to seed a draft order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub product_id: String,
    pub product_name: String,
    pub unit_price: Decimal,
    /// May be negative when upstream inventory data is inconsistent.
    pub stock: i64,
    pub qty_sold_trailing_90d: u64,
    pub lead_time_days: Option<u32>,
    pub abc_by_revenue: AbcClass,
    pub abc_by_volume: AbcClass,
}
