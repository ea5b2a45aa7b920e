//! Shared test helpers for `procura-core` integration tests.
//!
//! In-memory ports plus small fixtures so the negotiation tests can focus on
//! behaviour instead of wiring.

#![allow(dead_code)]

pub mod erp;
pub mod repositories;

use std::sync::Arc;

use procura_core::{NegotiationPorts, NegotiationService};
use procura_domain::{
    AbcClass, Actor, NegotiationConfig, Party, PartyKind, ProductSnapshot, ProposalLine,
};
use rust_decimal::Decimal;

pub use erp::{PushedStatus, ScriptedErp};
pub use repositories::{InMemoryStore, MockPartyDirectory};

pub const TENANT: &str = "tenant-1";
pub const SUPPLIER: &str = "supplier-1";
pub const REPRESENTATIVE: &str = "rep-1";

/// Service plus handles on its mocks.
pub struct Harness {
    pub service: NegotiationService,
    pub store: InMemoryStore,
    pub erp: ScriptedErp,
}

pub fn harness() -> Harness {
    harness_with_parties(MockPartyDirectory::default())
}

pub fn harness_with_parties(parties: MockPartyDirectory) -> Harness {
    let store = InMemoryStore::new();
    let erp = ScriptedErp::new();
    let ports = NegotiationPorts {
        orders: Arc::new(store.clone()),
        proposals: Arc::new(store.clone()),
        timeline: Arc::new(store.clone()),
        erp: Arc::new(erp.clone()),
        parties: Arc::new(parties),
    };
    let config = NegotiationConfig {
        public_order_base_url: "https://app.procura.test/".into(),
        ..NegotiationConfig::default()
    };

    Harness { service: NegotiationService::new(ports, config), store, erp }
}

pub fn buyer() -> Actor {
    Actor::buyer(TENANT, "Bia Buyer")
}

pub fn supplier() -> Actor {
    Actor::supplier(TENANT, SUPPLIER, "Sal Supplier")
}

pub fn representative() -> Actor {
    Actor::representative(TENANT, REPRESENTATIVE, "Rui Rep")
}

/// 100 units/90d sold, 2 in stock: always seeded.
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
    ProposalLine {
        order_line_id: order_line_id.into(),
        quantity,
        discount_pct,
        bonus_quantity: bonus,
    }
}

pub fn party(id: &str, kind: PartyKind, phone: Option<&str>, has_account: bool) -> Party {
    Party {
        id: id.into(),
        tenant_id: TENANT.into(),
        kind,
        name: format!("Party {id}"),
        phone: phone.map(str::to_string),
        has_account,
    }
}
