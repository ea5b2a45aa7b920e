//! Applying negotiated terms to order lines

use std::collections::HashSet;

use procura_domain::{OrderLine, ProcuraError, ProposalLine, PurchaseOrder, Result};
use rust_decimal::Decimal;

/// Reject proposal lines that do not fit the order.
pub fn validate_proposal_lines(order: &PurchaseOrder, lines: &[ProposalLine]) -> Result<()> {
    let mut seen = HashSet::new();
    for line in lines {
        if order.line(&line.order_line_id).is_none() {
            return Err(ProcuraError::InvalidInput(format!(
                "order {} has no line {}",
                order.id, line.order_line_id
            )));
        }
        if !seen.insert(line.order_line_id.as_str()) {
            return Err(ProcuraError::InvalidInput(format!(
                "line {} appears more than once",
                line.order_line_id
            )));
        }
        validate_discount(line.discount_pct)?;
    }
    Ok(())
}

/// Validate buyer-edited draft lines.
pub fn validate_order_lines(lines: &[OrderLine]) -> Result<()> {
    let mut seen = HashSet::new();
    for line in lines {
        if line.product_id.trim().is_empty() {
            return Err(ProcuraError::InvalidInput("line product_id must not be empty".into()));
        }
        if !line.id.is_empty() && !seen.insert(line.id.as_str()) {
            return Err(ProcuraError::InvalidInput(format!("line {} appears more than once", line.id)));
        }
        if line.quantity == 0 {
            return Err(ProcuraError::InvalidInput(format!(
                "line for product {} must have a positive quantity",
                line.product_id
            )));
        }
        if line.original_unit_price.is_sign_negative() {
            return Err(ProcuraError::InvalidInput(format!(
                "line for product {} has a negative price",
                line.product_id
            )));
        }
        validate_discount(line.discount_pct)?;
    }
    Ok(())
}

/// Overwrite quantity, discount and bonus on every line the proposal names,
/// then recompute order totals.
///
/// Lines the proposal does not mention keep their current terms.
pub fn apply_proposal_lines(order: &mut PurchaseOrder, lines: &[ProposalLine]) -> Result<()> {
    validate_proposal_lines(order, lines)?;

    for proposed in lines {
        if let Some(line) = order.lines.iter_mut().find(|l| l.id == proposed.order_line_id) {
            line.quantity = proposed.quantity;
            line.discount_pct = proposed.discount_pct;
            line.bonus_quantity = proposed.bonus_quantity;
        }
    }
    order.recompute_totals();
    Ok(())
}

fn validate_discount(discount_pct: Decimal) -> Result<()> {
    if discount_pct < Decimal::ZERO || discount_pct > Decimal::ONE_HUNDRED {
        return Err(ProcuraError::InvalidInput(format!(
            "discount {discount_pct}% is outside 0..=100"
        )));
    }
    Ok(())
}
