//! SQLite implementation of the order repository port.
//!
//! `commit_transition` runs the compare-and-swap on `(status, version)`, the
//! line rewrite and every proposal write inside one transaction.

use std::sync::Arc;

use async_trait::async_trait;
use procura_core::{OrderRepository, TransitionCommit};
use procura_domain::{
    ExternalStatus, OrderLine, OrderTotals, ProcuraError, PurchaseOrder, Result as DomainResult,
};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, warn};

use super::columns::{
    from_millis, int_to_u32, map_sql_error, parse_decimal, parse_text, run_blocking, to_millis,
    usize_to_i64,
};
use super::manager::DbManager;
use super::proposal_repository::apply_proposal_write;

/// SQLite-backed purchase order repository.
pub struct SqliteOrderRepository {
    db: Arc<DbManager>,
}

impl SqliteOrderRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    fn load(conn: &Connection, tenant_id: &str, order_id: &str) -> DomainResult<Option<PurchaseOrder>> {
        let order = conn
            .query_row(
                &format!("{ORDER_SELECT_SQL} WHERE tenant_id = ?1 AND id = ?2"),
                params![tenant_id, order_id],
                map_order_row,
            )
            .optional()
            .map_err(map_sql_error)?;

        match order {
            Some(mut order) => {
                order.lines = Self::load_lines(conn, &order.tenant_id, &order.id)?;
                Ok(Some(order))
            }
            None => Ok(None),
        }
    }

    fn load_lines(conn: &Connection, tenant_id: &str, order_id: &str) -> DomainResult<Vec<OrderLine>> {
        let mut stmt = conn.prepare(LINES_SELECT_SQL).map_err(map_sql_error)?;
        let lines = stmt
            .query_map(params![tenant_id, order_id], map_line_row)
            .map_err(map_sql_error)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(map_sql_error)?;
        Ok(lines)
    }

    fn insert_order_row(conn: &Connection, order: &PurchaseOrder) -> rusqlite::Result<()> {
        conn.execute(
            "INSERT INTO purchase_orders (
                id, tenant_id, supplier_id, representative_id, status, external_status,
                external_order_ref, total_products, total_discount, freight, grand_total,
                close_reason, version, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                order.id,
                order.tenant_id,
                order.supplier_id,
                order.representative_id,
                order.status.to_string(),
                order.external_status.map(ExternalStatus::code),
                order.external_order_ref,
                order.totals.products.to_string(),
                order.totals.discount.to_string(),
                order.totals.freight.to_string(),
                order.totals.grand_total.to_string(),
                order.close_reason,
                order.version,
                to_millis(order.created_at),
                to_millis(order.updated_at),
            ],
        )?;
        Ok(())
    }

    fn write_lines(conn: &Connection, order: &PurchaseOrder) -> rusqlite::Result<()> {
        conn.execute(
            "DELETE FROM order_lines WHERE tenant_id = ?1 AND order_id = ?2",
            params![order.tenant_id, order.id],
        )?;

        let mut stmt = conn.prepare(
            "INSERT INTO order_lines (
                order_id, id, tenant_id, position, product_id, product_name, quantity,
                bonus_quantity, original_unit_price, discount_pct, urgency
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )?;
        for (position, line) in order.lines.iter().enumerate() {
            stmt.execute(params![
                order.id,
                line.id,
                order.tenant_id,
                usize_to_i64(position),
                line.product_id,
                line.product_name,
                line.quantity,
                line.bonus_quantity,
                line.original_unit_price.to_string(),
                line.discount_pct.to_string(),
                line.urgency.map(|tier| tier.to_string()),
            ])?;
        }
        Ok(())
    }

    fn commit(conn: &mut Connection, commit: TransitionCommit) -> DomainResult<PurchaseOrder> {
        let tx = conn.transaction().map_err(map_sql_error)?;
        let next = &commit.order;

        let updated = tx
            .execute(
                "UPDATE purchase_orders SET
                    status = ?1, external_order_ref = ?2, total_products = ?3,
                    total_discount = ?4, freight = ?5, grand_total = ?6, close_reason = ?7,
                    version = ?8, updated_at = ?9
                 WHERE tenant_id = ?10 AND id = ?11 AND status = ?12 AND version = ?13",
                params![
                    next.status.to_string(),
                    next.external_order_ref,
                    next.totals.products.to_string(),
                    next.totals.discount.to_string(),
                    next.totals.freight.to_string(),
                    next.totals.grand_total.to_string(),
                    next.close_reason,
                    next.version,
                    to_millis(next.updated_at),
                    next.tenant_id,
                    next.id,
                    commit.expected_status.to_string(),
                    commit.expected_version,
                ],
            )
            .map_err(map_sql_error)?;

        if updated == 0 {
            let exists = tx
                .query_row(
                    "SELECT 1 FROM purchase_orders WHERE tenant_id = ?1 AND id = ?2",
                    params![next.tenant_id, next.id],
                    |_| Ok(()),
                )
                .optional()
                .map_err(map_sql_error)?
                .is_some();
            return Err(if exists {
                debug!(order_id = %next.id, expected_version = commit.expected_version, "Stale order write rejected");
                ProcuraError::Conflict(format!(
                    "order {} changed since it was read (expected {} v{})",
                    next.id, commit.expected_status, commit.expected_version
                ))
            } else {
                ProcuraError::NotFound(format!("order {}", next.id))
            });
        }

        if commit.lines_changed {
            Self::write_lines(&tx, next).map_err(map_sql_error)?;
        }
        for write in &commit.proposal_writes {
            apply_proposal_write(&tx, &next.tenant_id, &next.id, write)?;
        }

        let stored = Self::load(&tx, &next.tenant_id, &next.id)?
            .ok_or_else(|| ProcuraError::NotFound(format!("order {}", next.id)))?;
        tx.commit().map_err(map_sql_error)?;
        Ok(stored)
    }
}

#[async_trait]
impl OrderRepository for SqliteOrderRepository {
    async fn insert_order(&self, order: &PurchaseOrder) -> DomainResult<()> {
        let order = order.clone();
        run_blocking(&self.db, move |conn| {
            let tx = conn.transaction().map_err(map_sql_error)?;
            Self::insert_order_row(&tx, &order).map_err(map_sql_error)?;
            Self::write_lines(&tx, &order).map_err(map_sql_error)?;
            tx.commit().map_err(map_sql_error)
        })
        .await
    }

    async fn find_order(&self, tenant_id: &str, order_id: &str) -> DomainResult<Option<PurchaseOrder>> {
        let (tenant_id, order_id) = (tenant_id.to_string(), order_id.to_string());
        run_blocking(&self.db, move |conn| Self::load(conn, &tenant_id, &order_id)).await
    }

    async fn commit_transition(&self, commit: TransitionCommit) -> DomainResult<PurchaseOrder> {
        run_blocking(&self.db, move |conn| Self::commit(conn, commit)).await
    }

    async fn record_external_status(
        &self,
        tenant_id: &str,
        order_id: &str,
        version: i64,
        status: ExternalStatus,
    ) -> DomainResult<bool> {
        let (tenant_id, order_id) = (tenant_id.to_string(), order_id.to_string());
        run_blocking(&self.db, move |conn| {
            let updated = conn
                .execute(
                    "UPDATE purchase_orders SET external_status = ?1
                     WHERE tenant_id = ?2 AND id = ?3 AND version = ?4",
                    params![status.code(), tenant_id, order_id, version],
                )
                .map_err(map_sql_error)?;
            if updated == 1 {
                return Ok(true);
            }

            let current: Option<i64> = conn
                .query_row(
                    "SELECT version FROM purchase_orders WHERE tenant_id = ?1 AND id = ?2",
                    params![tenant_id, order_id],
                    |row| row.get(0),
                )
                .optional()
                .map_err(map_sql_error)?;
            match current {
                Some(current) => {
                    debug!(order_id = %order_id, version, current, "External status superseded");
                    Ok(false)
                }
                None => {
                    warn!(order_id = %order_id, "External status recorded for unknown order");
                    Err(ProcuraError::NotFound(format!("order {order_id}")))
                }
            }
        })
        .await
    }

    async fn list_stale_mirrors(&self, tenant_id: &str, limit: usize) -> DomainResult<Vec<PurchaseOrder>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let tenant_id = tenant_id.to_string();
        run_blocking(&self.db, move |conn| {
            let mut stmt = conn
                .prepare(&format!("{ORDER_SELECT_SQL} {STALE_MIRROR_FILTER_SQL}"))
                .map_err(map_sql_error)?;
            let mut orders = stmt
                .query_map(params![tenant_id, usize_to_i64(limit)], map_order_row)
                .map_err(map_sql_error)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(map_sql_error)?;
            for order in &mut orders {
                order.lines = Self::load_lines(conn, &order.tenant_id, &order.id)?;
            }
            Ok(orders)
        })
        .await
    }
}

const ORDER_SELECT_SQL: &str = "SELECT
        id, tenant_id, supplier_id, representative_id, status, external_status,
        external_order_ref, total_products, total_discount, freight, grand_total,
        close_reason, version, created_at, updated_at
    FROM purchase_orders";

const LINES_SELECT_SQL: &str = "SELECT
        id, product_id, product_name, quantity, bonus_quantity, original_unit_price,
        discount_pct, urgency
    FROM order_lines
    WHERE tenant_id = ?1 AND order_id = ?2
    ORDER BY position ASC";

// Mirrors OrderStatus::implied_external_status.
const STALE_MIRROR_FILTER_SQL: &str = "WHERE tenant_id = ?1
      AND external_order_ref IS NOT NULL
      AND status != 'draft'
      AND (external_status IS NULL OR external_status != CASE status
            WHEN 'finalized' THEN 1
            WHEN 'canceled' THEN 2
            WHEN 'rejected' THEN 2
            ELSE 3
          END)
    ORDER BY updated_at ASC
    LIMIT ?2";

fn map_order_row(row: &Row<'_>) -> rusqlite::Result<PurchaseOrder> {
    let status: String = row.get(4)?;
    let external_status = row
        .get::<_, Option<u8>>(5)?
        .map(|code| {
            ExternalStatus::from_code(code).ok_or_else(|| {
                rusqlite::Error::FromSqlConversionFailure(
                    5,
                    Type::Integer,
                    format!("unknown external status {code}").into(),
                )
            })
        })
        .transpose()?;
    let total_products: String = row.get(7)?;
    let total_discount: String = row.get(8)?;
    let freight: String = row.get(9)?;
    let grand_total: String = row.get(10)?;

    Ok(PurchaseOrder {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        supplier_id: row.get(2)?,
        representative_id: row.get(3)?,
        status: parse_text(4, &status)?,
        external_status,
        external_order_ref: row.get(6)?,
        lines: Vec::new(),
        totals: OrderTotals {
            products: parse_decimal(7, &total_products)?,
            discount: parse_decimal(8, &total_discount)?,
            freight: parse_decimal(9, &freight)?,
            grand_total: parse_decimal(10, &grand_total)?,
        },
        close_reason: row.get(11)?,
        version: row.get(12)?,
        created_at: from_millis(13, row.get(13)?)?,
        updated_at: from_millis(14, row.get(14)?)?,
    })
}

fn map_line_row(row: &Row<'_>) -> rusqlite::Result<OrderLine> {
    let price: String = row.get(5)?;
    let discount: String = row.get(6)?;
    let urgency: Option<String> = row.get(7)?;

    Ok(OrderLine {
        id: row.get(0)?,
        product_id: row.get(1)?,
        product_name: row.get(2)?,
        quantity: int_to_u32(3, row.get(3)?)?,
        bonus_quantity: int_to_u32(4, row.get(4)?)?,
        original_unit_price: parse_decimal(5, &price)?,
        discount_pct: parse_decimal(6, &discount)?,
        urgency: urgency.as_deref().map(|raw| parse_text(7, raw)).transpose()?,
    })
}
