//! Shared fixtures for `procura-infra` integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use procura_domain::{
    new_id, AbcClass, Actor, OrderLine, OrderStatus, OrderTotals, Party, PartyKind,
    ProductSnapshot, ProposalLine, PurchaseOrder,
};
use procura_infra::database::DbManager;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tempfile::TempDir;

pub const TENANT: &str = "tenant-1";
pub const OTHER_TENANT: &str = "tenant-2";
pub const SUPPLIER: &str = "supplier-1";

/// Temporary database wrapper that keeps the underlying file alive for the
/// duration of a test run.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    /// Create a migrated database in a fresh temporary directory.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let db_path = temp_dir.path().join("procura-test.db");

        let manager = DbManager::new(&db_path, 4).expect("db manager should be created");
        manager.run_migrations().expect("schema migrations should apply");

        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }

    pub fn count(&self, sql: &str) -> i64 {
        let conn = self.manager.get_connection().expect("connection should be available");
        conn.query_row(sql, [], |row| row.get(0)).expect("count query should succeed")
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_750_000_000 + secs, 0).single().expect("valid timestamp")
}

pub fn line(product_id: &str, quantity: u32, price: Decimal, discount: Decimal) -> OrderLine {
    OrderLine {
        id: new_id(),
        product_id: product_id.into(),
        product_name: format!("Product {product_id}"),
        quantity,
        bonus_quantity: 0,
        original_unit_price: price,
        discount_pct: discount,
        urgency: None,
    }
}

/// Two-line order in `status` with version 1.
pub fn order(tenant_id: &str, status: OrderStatus) -> PurchaseOrder {
    let lines = vec![line("sku-1", 10, dec!(12.50), dec!(10)), line("sku-2", 3, dec!(4.00), dec!(0))];
    let mut order = PurchaseOrder {
        id: new_id(),
        tenant_id: tenant_id.into(),
        supplier_id: SUPPLIER.into(),
        representative_id: None,
        status,
        external_status: None,
        external_order_ref: None,
        lines,
        totals: OrderTotals { freight: dec!(7.25), ..OrderTotals::default() },
        close_reason: None,
        version: 1,
        created_at: at(0),
        updated_at: at(0),
    };
    order.recompute_totals();
    order
}

/// Next revision of `order`, as the orchestrator would build it.
pub fn next_revision(order: &PurchaseOrder, status: OrderStatus) -> PurchaseOrder {
    let mut next = order.clone();
    next.status = status;
    next.version = order.version + 1;
    next.updated_at = order.updated_at + Duration::seconds(1);
    next
}

pub fn buyer() -> Actor {
    Actor::buyer(TENANT, "Bia Buyer")
}

pub fn supplier() -> Actor {
    Actor::supplier(TENANT, SUPPLIER, "Sal Supplier")
}

pub fn supplier_party(has_account: bool) -> Party {
    Party {
        id: SUPPLIER.into(),
        tenant_id: TENANT.into(),
        kind: PartyKind::Supplier,
        name: "Acme Distribuidora".into(),
        phone: Some("+55 11 99999-0000".into()),
        has_account,
    }
}

/// 10 units/day sold with 2 in stock: always seeded into a draft.
pub fn urgent_product(product_id: &str, unit_price: Decimal) -> ProductSnapshot {
    ProductSnapshot {
        product_id: product_id.into(),
        product_name: format!("Product {product_id}"),
        unit_price,
        stock: 2,
        qty_sold_trailing_90d: 900,
        lead_time_days: Some(10),
        abc_by_revenue: AbcClass::A,
        abc_by_volume: AbcClass::B,
    }
}

pub fn proposal_line(order_line_id: &str, quantity: u32, discount_pct: Decimal, bonus: u32) -> ProposalLine {
    ProposalLine { order_line_id: order_line_id.into(), quantity, discount_pct, bonus_quantity: bonus }
}
