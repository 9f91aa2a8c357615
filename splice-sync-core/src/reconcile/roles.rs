//! Role sync.
//!
//! For users present on both sides, the upstream role string decides which
//! managed roles the downstream user holds: the org-admin role of the user's
//! own organization and the full-admin role. Other roles are left alone.

use std::collections::BTreeSet;

use crate::clients::EntitlementServer;
use crate::error::Result;
use crate::logging::LogContext;
use crate::models::{Role, RoleKind, SourceUser, SOURCE_ORG_ADMIN, SOURCE_SATELLITE_ADMIN};

use super::diff::reconcile;
use super::namespace::Namespace;
use super::users::UserPolicy;
use super::SyncStats;

/// Grants and revocations for one user.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RoleChanges {
    pub grant: Vec<RoleKind>,
    pub revoke: Vec<RoleKind>,
}

impl RoleChanges {
    pub fn is_empty(&self) -> bool {
        self.grant.is_empty() && self.revoke.is_empty()
    }
}

/// Managed roles the upstream role string entitles the user to.
pub fn desired_roles(user: &SourceUser, namespace: &Namespace) -> BTreeSet<RoleKind> {
    let mut roles = BTreeSet::new();
    if user.has_role(SOURCE_ORG_ADMIN) {
        roles.insert(RoleKind::org_admin(&namespace.label_for(&user.organization_id)));
    }
    if user.has_role(SOURCE_SATELLITE_ADMIN) {
        roles.insert(RoleKind::FullAdmin);
    }
    roles
}

/// Diff desired managed roles against the roles the user holds downstream.
///
/// Full-admin is revoked whenever the upstream role set lacks it.
pub fn role_changes(
    user: &SourceUser,
    namespace: &Namespace,
    held: &[Role],
) -> RoleChanges {
    let desired = desired_roles(user, namespace);
    let own_org_admin = RoleKind::org_admin(&namespace.label_for(&user.organization_id));

    let held: BTreeSet<RoleKind> = held
        .iter()
        .filter_map(|role| RoleKind::from_role_name(&role.name))
        .filter(|kind| *kind == RoleKind::FullAdmin || *kind == own_org_admin)
        .collect();

    RoleChanges {
        grant: desired.difference(&held).cloned().collect(),
        revoke: held.difference(&desired).cloned().collect(),
    }
}

/// Users only present downstream are skipped.
pub fn sync_roles(
    ctx: &LogContext,
    namespace: &Namespace,
    server: &dyn EntitlementServer,
    users: &[SourceUser],
) -> Result<SyncStats> {
    let existing = server.list_users()?;
    let plan = reconcile(&UserPolicy, users, &existing);

    let mut stats = SyncStats::default();

    for (user, downstream) in plan.to_update {
        let user_ctx = ctx.with_entity("user", &user.username);
        let held = server.list_user_roles(downstream)?;
        let changes = role_changes(user, namespace, &held);

        if changes.is_empty() {
            log::debug!("{} ROLES_IN_SYNC held={}", user_ctx, held.len());
            stats.unchanged += 1;
            continue;
        }

        for role in &changes.grant {
            server.grant_role(downstream, role)?;
            log::info!("{} ROLE_GRANTED role={:?}", user_ctx, role.role_name());
            stats.granted += 1;
        }
        for role in &changes.revoke {
            server.revoke_role(downstream, role)?;
            log::info!("{} ROLE_REVOKED role={:?}", user_ctx, role.role_name());
            stats.revoked += 1;
        }
    }

    Ok(stats)
}
