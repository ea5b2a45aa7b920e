//! Coverage engine - pure urgency scoring

use procura_domain::constants::{
    DEFAULT_LEAD_TIME_DAYS, OK_COVERAGE_FACTOR, TRAILING_SALES_WINDOW_DAYS,
};
use procura_domain::{
    new_id, AbcClass, CoverageAssessment, OrderLine, ProductSnapshot, UrgencyTier,
};
use rust_decimal::Decimal;

/// Assess coverage with the default lead time of 15 days.
pub fn assess(
    stock: i64,
    qty_sold_trailing_90d: u64,
    lead_time_days: Option<u32>,
    abc_by_revenue: AbcClass,
    abc_by_volume: AbcClass,
) -> CoverageAssessment {
    CoverageEngine::default().assess(
        stock,
        qty_sold_trailing_90d,
        lead_time_days,
        abc_by_revenue,
        abc_by_volume,
    )
}

/// Coverage engine with a configurable fallback lead time.
#[derive(Debug, Clone, Copy)]
pub struct CoverageEngine {
    default_lead_time_days: u32,
}

impl Default for CoverageEngine {
    fn default() -> Self {
        Self { default_lead_time_days: DEFAULT_LEAD_TIME_DAYS }
    }
}

impl CoverageEngine {
    pub fn new(default_lead_time_days: u32) -> Self {
        Self { default_lead_time_days }
    }

    /// Compute days of coverage and urgency for one product.
    ///
    /// Negative stock is clamped to zero before dividing. With no sales in
    /// the trailing window coverage is undefined (`None`): products still in
    /// stock are `Ok`, empty ones are `Medium` (possibly obsolete).
    pub fn assess(
        &self,
        stock: i64,
        qty_sold_trailing_90d: u64,
        lead_time_days: Option<u32>,
        abc_by_revenue: AbcClass,
        abc_by_volume: AbcClass,
    ) -> CoverageAssessment {
        let daily_average_sales =
            qty_sold_trailing_90d as f64 / f64::from(TRAILING_SALES_WINDOW_DAYS);
        let lead_time_days = lead_time_days.unwrap_or(self.default_lead_time_days);
        let lead_time = f64::from(lead_time_days);
        let effective_class = abc_by_revenue.most_critical(abc_by_volume);
        let days_required = lead_time * (1.0 + effective_class.safety_margin());
        let stock_on_hand = stock.max(0);

        if daily_average_sales <= 0.0 {
            let urgency_tier = if stock_on_hand > 0 { UrgencyTier::Ok } else { UrgencyTier::Medium };
            return CoverageAssessment {
                daily_average_sales: 0.0,
                days_of_coverage: None,
                days_required,
                lead_time_days,
                effective_class,
                urgency_tier,
                suggested_quantity: 0,
            };
        }

        let days_of_coverage = stock_on_hand as f64 / daily_average_sales;
        let urgency_tier = if days_of_coverage < lead_time {
            UrgencyTier::Critical
        } else if days_of_coverage < days_required {
            UrgencyTier::High
        } else if days_of_coverage < OK_COVERAGE_FACTOR * days_required {
            UrgencyTier::Medium
        } else {
            UrgencyTier::Ok
        };

        let target_units = (daily_average_sales * days_required).ceil();
        let shortfall = target_units - stock_on_hand as f64;
        let suggested_quantity =
            if shortfall > 0.0 { shortfall.min(f64::from(u32::MAX)) as u32 } else { 0 };

        CoverageAssessment {
            daily_average_sales,
            days_of_coverage: Some(days_of_coverage),
            days_required,
            lead_time_days,
            effective_class,
            urgency_tier,
            suggested_quantity,
        }
    }

    /// Build draft order lines for every product that needs replenishment,
    /// most urgent first.
    pub fn seed_lines(&self, products: &[ProductSnapshot]) -> Vec<OrderLine> {
        let mut seeded: Vec<(UrgencyTier, OrderLine)> = products
            .iter()
            .filter_map(|product| {
                let assessment = self.assess(
                    product.stock,
                    product.qty_sold_trailing_90d,
                    product.lead_time_days,
                    product.abc_by_revenue,
                    product.abc_by_volume,
                );
                if assessment.suggested_quantity == 0 {
                    return None;
                }
                Some((
                    assessment.urgency_tier,
                    OrderLine {
                        id: new_id(),
                        product_id: product.product_id.clone(),
                        product_name: product.product_name.clone(),
                        quantity: assessment.suggested_quantity,
                        bonus_quantity: 0,
                        original_unit_price: product.unit_price,
                        discount_pct: Decimal::ZERO,
                        urgency: Some(assessment.urgency_tier),
                    },
                ))
            })
            .collect();

        seeded.sort_by_key(|(tier, _)| *tier);
        seeded.into_iter().map(|(_, line)| line).collect()
    }
}
