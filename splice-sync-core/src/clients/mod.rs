//! Collaborator interfaces.
//!
//! Transport implementations (XML-RPC, REST, OAuth) live outside this crate;
//! the reconciliation core only sees these traits.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDateTime;
use serde_json::Value;

use crate::error::ClientResult;
use crate::models::{
    ChannelRecord, Consumer, ConsumerRegistration, ConsumerUpdate, Distributor, DownstreamUser,
    Entitlement, HostRecord, Owner, Provider, Role, RoleKind, SourceUser,
};

#[cfg(test)]
pub(crate) mod mock;

/// The host-inventory system of record.
pub trait SourceSystem {
    fn list_hosts(&self) -> ClientResult<Vec<HostRecord>>;
    fn list_users(&self) -> ClientResult<Vec<SourceUser>>;
    fn list_channels(&self) -> ClientResult<Vec<ChannelRecord>>;
    /// Organization id to organization name.
    fn get_org_list(&self) -> ClientResult<BTreeMap<String, String>>;
}

/// The entitlement server whose owners, users, roles and consumers are reconciled.
pub trait EntitlementServer {
    fn list_owners(&self) -> ClientResult<Vec<Owner>>;
    fn create_owner(&self, label: &str, name: &str) -> ClientResult<Owner>;
    fn delete_owner(&self, owner: &Owner) -> ClientResult<()>;
    fn create_environment(&self, owner_label: &str, name: &str, label: &str) -> ClientResult<()>;
    /// Create the `Org Admin Role for <label>` role and its permission.
    fn create_org_admin_role(&self, owner_label: &str) -> ClientResult<()>;

    fn create_distributor(&self, name: &str, root_owner_label: &str) -> ClientResult<Distributor>;
    fn export_manifest(&self, distributor_uuid: &str) -> ClientResult<Vec<u8>>;
    fn find_provider(&self, org_name: &str, provider_name: &str) -> ClientResult<Provider>;
    fn import_manifest(&self, provider_id: &str, manifest: &[u8]) -> ClientResult<()>;

    fn list_users(&self) -> ClientResult<Vec<DownstreamUser>>;
    fn create_user(&self, username: &str, email: &str, password: &str)
        -> ClientResult<DownstreamUser>;

    fn list_user_roles(&self, user: &DownstreamUser) -> ClientResult<Vec<Role>>;
    fn grant_role(&self, user: &DownstreamUser, role: &RoleKind) -> ClientResult<()>;
    fn revoke_role(&self, user: &DownstreamUser, role: &RoleKind) -> ClientResult<()>;

    /// Consumers across all owners, with facts and the `spacewalk-id` cross-reference.
    fn list_consumers(&self) -> ClientResult<Vec<Consumer>>;
    /// Register a consumer, returning its uuid.
    fn create_consumer(&self, registration: &ConsumerRegistration) -> ClientResult<String>;
    fn update_consumer(&self, uuid: &str, update: &ConsumerUpdate) -> ClientResult<()>;
    fn set_custom_info(&self, uuid: &str, key: &str, value: &str) -> ClientResult<()>;
    fn delete_consumer(&self, uuid: &str) -> ClientResult<()>;
    fn checkin(&self, uuid: &str, at: NaiveDateTime) -> ClientResult<()>;
    fn refresh_entitlements(&self, uuid: &str) -> ClientResult<()>;
    fn list_entitlements(&self, uuid: &str) -> ClientResult<Vec<Entitlement>>;
}

/// The usage reporting server; accepts one-way uploads.
pub trait ReportingServer {
    /// POST a JSON payload, returning the status code and body.
    fn post(&self, path: &str, payload: &Value) -> ClientResult<(u16, String)>;
}

/// A product described by a locally installed product certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCert {
    pub id: String,
    pub name: String,
}

/// Lookup of product certificates by numeric product id.
pub trait ProductCertStore {
    fn find_by_product(&self, product_id: &str) -> Option<ProductCert>;
}

impl ProductCertStore for HashMap<String, ProductCert> {
    fn find_by_product(&self, product_id: &str) -> Option<ProductCert> {
        self.get(product_id).cloned()
    }
}
