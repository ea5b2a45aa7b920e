//! Negotiation participants

use serde::{Deserialize, Serialize};

use super::TenantId;
use crate::constants::SYSTEM_ACTOR_NAME;
use crate::impl_domain_status_conversions;

/// Role of whoever performs an action or authors a timeline event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Buyer,
    Supplier,
    Representative,
    System,
}

impl_domain_status_conversions!(ActorRole {
    Buyer => "buyer",
    Supplier => "supplier",
    Representative => "representative",
    System => "system",
});

impl ActorRole {
    /// Suppliers and their representatives negotiate on the same side.
    pub fn is_supplier_side(self) -> bool {
        matches!(self, Self::Supplier | Self::Representative)
    }
}

/// Authenticated caller of a negotiation operation.
///
/// Authentication and tenant membership are resolved upstream; the engine
/// only checks that the actor's party matches the order it touches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub role: ActorRole,
    pub name: String,
    pub tenant_id: TenantId,
    /// Buyer company, supplier or representative id depending on `role`.
    pub party_id: String,
}

impl Actor {
    pub fn buyer(tenant_id: impl Into<String>, name: impl Into<String>) -> Self {
        let tenant_id = tenant_id.into();
        Self { role: ActorRole::Buyer, name: name.into(), party_id: tenant_id.clone(), tenant_id }
    }

    pub fn supplier(
        tenant_id: impl Into<String>,
        supplier_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            role: ActorRole::Supplier,
            name: name.into(),
            tenant_id: tenant_id.into(),
            party_id: supplier_id.into(),
        }
    }

    pub fn representative(
        tenant_id: impl Into<String>,
        representative_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            role: ActorRole::Representative,
            name: name.into(),
            tenant_id: tenant_id.into(),
            party_id: representative_id.into(),
        }
    }

    pub fn system(tenant_id: impl Into<String>) -> Self {
        let tenant_id = tenant_id.into();
        Self {
            role: ActorRole::System,
            name: SYSTEM_ACTOR_NAME.to_string(),
            party_id: tenant_id.clone(),
            tenant_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyKind {
    Supplier,
    Representative,
}

impl_domain_status_conversions!(PartyKind {
    Supplier => "supplier",
    Representative => "representative",
});

/// Counterpart directory entry as seen from a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub id: String,
    pub tenant_id: TenantId,
    pub kind: PartyKind,
    pub name: String,
    pub phone: Option<String>,
    /// Whether the counterpart has a registered platform account.
    pub has_account: bool,
}

/// Data handed to the messaging collaborator when the counterpart has no
/// account. The engine never sends the message itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub recipient_name: String,
    pub phone: String,
    pub public_order_link: String,
}
