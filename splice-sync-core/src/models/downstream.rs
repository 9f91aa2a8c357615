//! Records of the entitlement server (owners, users, roles, consumers).

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name prefix of the per-owner administration role.
pub const ORG_ADMIN_ROLE_PREFIX: &str = "Org Admin Role for ";
/// Name of the full administration role.
pub const FULL_ADMIN_ROLE: &str = "Administrator";
/// Custom info key holding a consumer's source host id.
pub const SOURCE_ID_FIELD: &str = "spacewalk-id";

/// Flat, dotted fact names mapped to scalar values.
pub type Facts = BTreeMap<String, Value>;

/// A downstream organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    pub label: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownstreamUser {
    pub id: u64,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: u64,
    pub name: String,
}

/// The downstream roles whose membership this tool manages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RoleKind {
    OrgAdmin { owner_label: String },
    FullAdmin,
}

impl RoleKind {
    pub fn org_admin(owner_label: &str) -> Self {
        RoleKind::OrgAdmin {
            owner_label: owner_label.to_string(),
        }
    }

    pub fn role_name(&self) -> String {
        match self {
            RoleKind::OrgAdmin { owner_label } => format!("{}{}", ORG_ADMIN_ROLE_PREFIX, owner_label),
            RoleKind::FullAdmin => FULL_ADMIN_ROLE.to_string(),
        }
    }

    /// Parse a downstream role name; roles we don't manage yield `None`.
    pub fn from_role_name(name: &str) -> Option<Self> {
        if name == FULL_ADMIN_ROLE {
            return Some(RoleKind::FullAdmin);
        }
        name.strip_prefix(ORG_ADMIN_ROLE_PREFIX)
            .filter(|label| !label.is_empty())
            .map(RoleKind::org_admin)
    }
}

/// Owner reference embedded in a consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerRef {
    pub key: String,
    pub display_name: String,
}

/// A consumer as listed by the entitlement server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consumer {
    pub uuid: String,
    pub name: String,
    pub owner: OwnerRef,
    /// Source host id read from the `spacewalk-id` custom info field.
    pub external_id: Option<String>,
    #[serde(default)]
    pub facts: Facts,
    pub service_level: Option<String>,
    pub checkin_time: Option<String>,
    pub entitlement_status: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledProduct {
    #[serde(rename = "productId")]
    pub product_id: String,
    #[serde(rename = "productName")]
    pub product_name: String,
}

/// A host translated into the consumer shape, ready to be pushed downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct DesiredConsumer {
    /// Source host id; the cross-reference written to `spacewalk-id`.
    pub host_id: String,
    pub name: String,
    pub owner_label: String,
    pub facts: Facts,
    pub installed_products: Vec<InstalledProduct>,
    pub last_checkin: NaiveDateTime,
}

/// Payload for registering a new consumer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsumerRegistration {
    pub name: String,
    pub owner_label: String,
    pub facts: Facts,
}

/// Fields pushed to an existing consumer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsumerUpdate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facts: Option<Facts>,
    #[serde(rename = "installedProducts")]
    pub installed_products: Vec<InstalledProduct>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distributor {
    pub uuid: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub id: String,
}

/// One entitlement attached to a consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entitlement {
    pub account_number: String,
    pub contract_number: String,
    pub product_id: String,
    pub quantity: i64,
}
