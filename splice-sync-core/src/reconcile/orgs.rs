//! Organization sync.
//!
//! Every source organization gets a managed owner. Owners are never
//! renamed; managed owners whose organization disappeared are deleted.

use std::collections::BTreeMap;

use anyhow::Context;

use crate::clients::EntitlementServer;
use crate::config::CheckinConfig;
use crate::error::Result;
use crate::logging::LogContext;
use crate::models::{Owner, RoleKind};

use super::diff::{reconcile, ReconcilePolicy};
use super::namespace::Namespace;
use super::SyncStats;

/// An organization as listed upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceOrg {
    pub id: String,
    pub name: String,
}

impl SourceOrg {
    pub fn from_org_list(orgs: &BTreeMap<String, String>) -> Vec<SourceOrg> {
        orgs.iter()
            .map(|(id, name)| SourceOrg {
                id: id.clone(),
                name: name.clone(),
            })
            .collect()
    }
}

pub struct OwnerPolicy<'a> {
    pub namespace: &'a Namespace,
}

impl ReconcilePolicy for OwnerPolicy<'_> {
    type Desired = SourceOrg;
    type Actual = Owner;
    type Key = String;

    fn desired_key(&self, org: &SourceOrg) -> String {
        org.id.clone()
    }

    fn actual_key(&self, owner: &Owner) -> Option<String> {
        self.namespace.org_id_for(&owner.label).map(String::from)
    }

    fn is_managed(&self, owner: &Owner) -> bool {
        self.namespace.is_managed(&owner.label)
    }
}

pub fn sync_orgs(
    ctx: &LogContext,
    config: &CheckinConfig,
    namespace: &Namespace,
    server: &dyn EntitlementServer,
    orgs: &BTreeMap<String, String>,
) -> Result<SyncStats> {
    let desired = SourceOrg::from_org_list(orgs);
    let owners = server.list_owners()?;
    let plan = reconcile(&OwnerPolicy { namespace }, &desired, &owners);

    log::info!(
        "{} ORG_PLAN upstream={} downstream={} create={} delete={}",
        ctx,
        desired.len(),
        owners.len(),
        plan.to_create.len(),
        plan.to_delete.len()
    );

    let mut stats = SyncStats::default();

    for org in plan.to_create {
        let label = namespace.label_for(&org.id);
        let owner_ctx = ctx.with_entity("owner", &label);

        server.create_owner(&label, &org.name)?;
        log::info!("{} OWNER_CREATED name={}", owner_ctx, org.name);

        server.create_environment(&label, &config.environment_name, &config.environment_label)?;
        server.create_org_admin_role(&label)?;
        log::info!(
            "{} OWNER_PROVISIONED environment={} role={:?}",
            owner_ctx,
            config.environment_label,
            RoleKind::org_admin(&label).role_name()
        );

        if org.id != config.primary_org_id {
            if let Err(e) = provision_manifest(config, namespace, server, org) {
                log::warn!("{} MANIFEST_PROVISION_FAILED error={:#}", owner_ctx, e);
            }
        }
        stats.created += 1;
    }

    // no rename support: matched owners are left as they are
    stats.unchanged = plan.to_update.len();

    for owner in plan.to_delete {
        server.delete_owner(owner)?;
        log::info!(
            "{} OWNER_DELETED name={}",
            ctx.with_entity("owner", &owner.label),
            owner.name
        );
        stats.deleted += 1;
    }

    Ok(stats)
}

/// Export a manifest from a distributor in the primary owner and import it
/// into the new organization's provider.
fn provision_manifest(
    config: &CheckinConfig,
    namespace: &Namespace,
    server: &dyn EntitlementServer,
    org: &SourceOrg,
) -> anyhow::Result<()> {
    let root_label = namespace.label_for(&config.primary_org_id);
    let distributor_name = format!("Distributor for {}", org.name);

    let distributor = server
        .create_distributor(&distributor_name, &root_label)
        .with_context(|| format!("creating distributor '{}'", distributor_name))?;
    let manifest = server
        .export_manifest(&distributor.uuid)
        .with_context(|| format!("exporting manifest of distributor {}", distributor.uuid))?;
    let provider = server
        .find_provider(&org.name, &config.manifest_provider)
        .with_context(|| format!("finding provider '{}'", config.manifest_provider))?;
    server
        .import_manifest(&provider.id, &manifest)
        .with_context(|| format!("importing manifest into provider {}", provider.id))?;

    Ok(())
}
