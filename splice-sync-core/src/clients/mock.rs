//! In-memory collaborators that record every mutating call.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDateTime;
use serde_json::Value;

use super::{EntitlementServer, ReportingServer, SourceSystem};
use crate::error::{ClientError, ClientResult};
use crate::models::{
    ChannelRecord, Consumer, ConsumerRegistration, ConsumerUpdate, Distributor, DownstreamUser,
    Entitlement, Facts, HostRecord, Owner, OwnerRef, Provider, Role, RoleKind, SourceUser,
    SOURCE_ID_FIELD,
};

/// A mutating call made against the mock entitlement server.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateOwner { label: String, name: String },
    DeleteOwner { label: String },
    CreateEnvironment { owner_label: String, name: String, label: String },
    CreateOrgAdminRole { owner_label: String },
    CreateDistributor { name: String, root_owner_label: String },
    ExportManifest { distributor_uuid: String },
    FindProvider { org_name: String, provider_name: String },
    ImportManifest { provider_id: String, manifest: Vec<u8> },
    CreateUser { username: String, email: String, password: String },
    GrantRole { username: String, role: RoleKind },
    RevokeRole { username: String, role: RoleKind },
    CreateConsumer { name: String, owner_label: String },
    UpdateConsumer { uuid: String, name: String },
    SetCustomInfo { uuid: String, key: String, value: String },
    DeleteConsumer { uuid: String },
    Checkin { uuid: String, at: NaiveDateTime },
    RefreshEntitlements { uuid: String },
}

#[derive(Debug, Default)]
pub struct MockEntitlementServer {
    pub owners: RefCell<Vec<Owner>>,
    pub users: RefCell<Vec<DownstreamUser>>,
    pub roles: RefCell<HashMap<u64, Vec<Role>>>,
    pub consumers: RefCell<Vec<Consumer>>,
    pub entitlements: HashMap<String, Vec<Entitlement>>,
    /// Calls to `export_manifest` fail when set.
    pub fail_manifest_export: bool,
    /// Uuids for which `update_consumer` answers not-found.
    pub missing_on_update: HashSet<String>,
    pub calls: RefCell<Vec<Call>>,
}

impl MockEntitlementServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_owners(self, owners: &[(&str, &str)]) -> Self {
        *self.owners.borrow_mut() = owners
            .iter()
            .map(|(label, name)| Owner {
                label: label.to_string(),
                name: name.to_string(),
            })
            .collect();
        self
    }

    pub fn with_users(self, users: &[(u64, &str)]) -> Self {
        *self.users.borrow_mut() = users
            .iter()
            .map(|(id, username)| DownstreamUser {
                id: *id,
                username: username.to_string(),
                email: format!("{}@foo.com", username),
            })
            .collect();
        self
    }

    pub fn with_roles(self, user_id: u64, names: &[&str]) -> Self {
        let roles = names
            .iter()
            .enumerate()
            .map(|(i, name)| Role {
                id: i as u64 + 1,
                name: name.to_string(),
            })
            .collect();
        self.roles.borrow_mut().insert(user_id, roles);
        self
    }

    pub fn with_consumers(self, consumers: Vec<Consumer>) -> Self {
        *self.consumers.borrow_mut() = consumers;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

/// A listed consumer carrying a cross-reference.
pub fn consumer(uuid: &str, name: &str, owner_key: &str, external_id: &str) -> Consumer {
    let mut facts = Facts::new();
    facts.insert("network.hostname".to_string(), Value::from(format!("{}.example.com", name)));
    facts.insert("systemid".to_string(), Value::from(external_id));
    Consumer {
        uuid: uuid.to_string(),
        name: name.to_string(),
        owner: OwnerRef {
            key: owner_key.to_string(),
            display_name: format!("{} org", owner_key),
        },
        external_id: Some(external_id.to_string()),
        facts,
        service_level: Some("Premium".to_string()),
        checkin_time: Some("2013-05-03T20:37:54Z".to_string()),
        entitlement_status: Some(Value::from("valid")),
    }
}

impl EntitlementServer for MockEntitlementServer {
    fn list_owners(&self) -> ClientResult<Vec<Owner>> {
        Ok(self.owners.borrow().clone())
    }

    fn create_owner(&self, label: &str, name: &str) -> ClientResult<Owner> {
        self.record(Call::CreateOwner {
            label: label.to_string(),
            name: name.to_string(),
        });
        let owner = Owner {
            label: label.to_string(),
            name: name.to_string(),
        };
        self.owners.borrow_mut().push(owner.clone());
        Ok(owner)
    }

    fn delete_owner(&self, owner: &Owner) -> ClientResult<()> {
        self.record(Call::DeleteOwner {
            label: owner.label.clone(),
        });
        self.owners.borrow_mut().retain(|o| o.label != owner.label);
        Ok(())
    }

    fn create_environment(&self, owner_label: &str, name: &str, label: &str) -> ClientResult<()> {
        self.record(Call::CreateEnvironment {
            owner_label: owner_label.to_string(),
            name: name.to_string(),
            label: label.to_string(),
        });
        Ok(())
    }

    fn create_org_admin_role(&self, owner_label: &str) -> ClientResult<()> {
        self.record(Call::CreateOrgAdminRole {
            owner_label: owner_label.to_string(),
        });
        Ok(())
    }

    fn create_distributor(&self, name: &str, root_owner_label: &str) -> ClientResult<Distributor> {
        self.record(Call::CreateDistributor {
            name: name.to_string(),
            root_owner_label: root_owner_label.to_string(),
        });
        Ok(Distributor {
            uuid: "100100".to_string(),
        })
    }

    fn export_manifest(&self, distributor_uuid: &str) -> ClientResult<Vec<u8>> {
        self.record(Call::ExportManifest {
            distributor_uuid: distributor_uuid.to_string(),
        });
        if self.fail_manifest_export {
            return Err(ClientError::Status {
                system: "katello".to_string(),
                code: 500,
                body: "export failed".to_string(),
            });
        }
        Ok(b"FILECONTENT".to_vec())
    }

    fn find_provider(&self, org_name: &str, provider_name: &str) -> ClientResult<Provider> {
        self.record(Call::FindProvider {
            org_name: org_name.to_string(),
            provider_name: provider_name.to_string(),
        });
        Ok(Provider {
            id: "99999".to_string(),
        })
    }

    fn import_manifest(&self, provider_id: &str, manifest: &[u8]) -> ClientResult<()> {
        self.record(Call::ImportManifest {
            provider_id: provider_id.to_string(),
            manifest: manifest.to_vec(),
        });
        Ok(())
    }

    fn list_users(&self) -> ClientResult<Vec<DownstreamUser>> {
        Ok(self.users.borrow().clone())
    }

    fn create_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> ClientResult<DownstreamUser> {
        self.record(Call::CreateUser {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        });
        let user = DownstreamUser {
            id: 1000 + self.users.borrow().len() as u64,
            username: username.to_string(),
            email: email.to_string(),
        };
        self.users.borrow_mut().push(user.clone());
        Ok(user)
    }

    fn list_user_roles(&self, user: &DownstreamUser) -> ClientResult<Vec<Role>> {
        Ok(self.roles.borrow().get(&user.id).cloned().unwrap_or_default())
    }

    fn grant_role(&self, user: &DownstreamUser, role: &RoleKind) -> ClientResult<()> {
        self.record(Call::GrantRole {
            username: user.username.clone(),
            role: role.clone(),
        });
        Ok(())
    }

    fn revoke_role(&self, user: &DownstreamUser, role: &RoleKind) -> ClientResult<()> {
        self.record(Call::RevokeRole {
            username: user.username.clone(),
            role: role.clone(),
        });
        Ok(())
    }

    fn list_consumers(&self) -> ClientResult<Vec<Consumer>> {
        Ok(self.consumers.borrow().clone())
    }

    fn create_consumer(&self, registration: &ConsumerRegistration) -> ClientResult<String> {
        self.record(Call::CreateConsumer {
            name: registration.name.clone(),
            owner_label: registration.owner_label.clone(),
        });
        let uuid = format!("new-{}", registration.name);
        self.consumers.borrow_mut().push(Consumer {
            uuid: uuid.clone(),
            name: registration.name.clone(),
            owner: OwnerRef {
                key: registration.owner_label.clone(),
                display_name: registration.owner_label.clone(),
            },
            external_id: None,
            facts: registration.facts.clone(),
            service_level: None,
            checkin_time: None,
            entitlement_status: None,
        });
        Ok(uuid)
    }

    fn update_consumer(&self, uuid: &str, update: &ConsumerUpdate) -> ClientResult<()> {
        if self.missing_on_update.contains(uuid) {
            return Err(ClientError::NotFound {
                what: format!("consumer {}", uuid),
            });
        }
        self.record(Call::UpdateConsumer {
            uuid: uuid.to_string(),
            name: update.name.clone(),
        });
        Ok(())
    }

    fn set_custom_info(&self, uuid: &str, key: &str, value: &str) -> ClientResult<()> {
        self.record(Call::SetCustomInfo {
            uuid: uuid.to_string(),
            key: key.to_string(),
            value: value.to_string(),
        });
        if key == SOURCE_ID_FIELD {
            if let Some(c) = self.consumers.borrow_mut().iter_mut().find(|c| c.uuid == uuid) {
                c.external_id = Some(value.to_string());
            }
        }
        Ok(())
    }

    fn delete_consumer(&self, uuid: &str) -> ClientResult<()> {
        self.record(Call::DeleteConsumer {
            uuid: uuid.to_string(),
        });
        self.consumers.borrow_mut().retain(|c| c.uuid != uuid);
        Ok(())
    }

    fn checkin(&self, uuid: &str, at: NaiveDateTime) -> ClientResult<()> {
        self.record(Call::Checkin {
            uuid: uuid.to_string(),
            at,
        });
        if let Some(c) = self.consumers.borrow_mut().iter_mut().find(|c| c.uuid == uuid) {
            c.checkin_time = Some(at.format("%Y-%m-%dT%H:%M:%SZ").to_string());
        }
        Ok(())
    }

    fn refresh_entitlements(&self, uuid: &str) -> ClientResult<()> {
        self.record(Call::RefreshEntitlements {
            uuid: uuid.to_string(),
        });
        Ok(())
    }

    fn list_entitlements(&self, uuid: &str) -> ClientResult<Vec<Entitlement>> {
        Ok(self.entitlements.get(uuid).cloned().unwrap_or_default())
    }
}

#[derive(Debug, Default)]
pub struct MockSourceSystem {
    pub hosts: Vec<HostRecord>,
    pub users: Vec<SourceUser>,
    pub channels: Vec<ChannelRecord>,
    pub orgs: BTreeMap<String, String>,
}

impl SourceSystem for MockSourceSystem {
    fn list_hosts(&self) -> ClientResult<Vec<HostRecord>> {
        Ok(self.hosts.clone())
    }

    fn list_users(&self) -> ClientResult<Vec<SourceUser>> {
        Ok(self.users.clone())
    }

    fn list_channels(&self) -> ClientResult<Vec<ChannelRecord>> {
        Ok(self.channels.clone())
    }

    fn get_org_list(&self) -> ClientResult<BTreeMap<String, String>> {
        Ok(self.orgs.clone())
    }
}

/// Answers every POST with the configured status (204 unless overridden).
#[derive(Debug, Default)]
pub struct MockReportingServer {
    pub statuses: HashMap<String, u16>,
    pub posts: RefCell<Vec<(String, Value)>>,
}

impl ReportingServer for MockReportingServer {
    fn post(&self, path: &str, payload: &Value) -> ClientResult<(u16, String)> {
        self.posts
            .borrow_mut()
            .push((path.to_string(), payload.clone()));
        let status = self.statuses.get(path).copied().unwrap_or(204);
        Ok((status, String::new()))
    }
}
