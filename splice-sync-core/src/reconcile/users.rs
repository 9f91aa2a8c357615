//! User sync. Create-only: downstream users are never updated or deleted.

use crate::clients::EntitlementServer;
use crate::config::CheckinConfig;
use crate::error::Result;
use crate::logging::LogContext;
use crate::models::{DownstreamUser, SourceUser};

use super::diff::{reconcile, ReconcilePolicy};
use super::SyncStats;

/// Users are matched by username.
pub struct UserPolicy;

impl ReconcilePolicy for UserPolicy {
    type Desired = SourceUser;
    type Actual = DownstreamUser;
    type Key = String;

    fn desired_key(&self, user: &SourceUser) -> String {
        user.username.clone()
    }

    fn actual_key(&self, user: &DownstreamUser) -> Option<String> {
        Some(user.username.clone())
    }

    fn is_managed(&self, _user: &DownstreamUser) -> bool {
        false
    }
}

pub fn sync_users(
    ctx: &LogContext,
    config: &CheckinConfig,
    server: &dyn EntitlementServer,
    users: &[SourceUser],
) -> Result<SyncStats> {
    let existing = server.list_users()?;
    let plan = reconcile(&UserPolicy, users, &existing);

    log::info!(
        "{} USER_PLAN upstream={} downstream={} create={}",
        ctx,
        users.len(),
        existing.len(),
        plan.to_create.len()
    );

    let mut stats = SyncStats {
        unchanged: plan.to_update.len(),
        ..Default::default()
    };

    for user in plan.to_create {
        server.create_user(&user.username, &user.email, &config.default_user_password)?;
        log::info!(
            "{} USER_CREATED email={}",
            ctx.with_entity("user", &user.username),
            user.email
        );
        stats.created += 1;
    }

    Ok(stats)
}
