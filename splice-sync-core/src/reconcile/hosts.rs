//! Host/consumer sync.
//!
//! Consumers are cross-referenced to source hosts through the `spacewalk-id`
//! custom info field. Only consumers in managed owners take part: the rest
//! are never matched, updated or deleted.

use std::collections::HashSet;

use crate::clients::EntitlementServer;
use crate::config::CheckinConfig;
use crate::error::Result;
use crate::logging::LogContext;
use crate::models::{
    Consumer, ConsumerRegistration, ConsumerUpdate, DesiredConsumer, SOURCE_ID_FIELD,
};

use super::diff::{reconcile, ReconcilePolicy};
use super::namespace::Namespace;
use super::SyncStats;

pub struct HostPolicy<'a> {
    pub namespace: &'a Namespace,
}

impl ReconcilePolicy for HostPolicy<'_> {
    type Desired = DesiredConsumer;
    type Actual = Consumer;
    type Key = String;

    fn desired_key(&self, desired: &DesiredConsumer) -> String {
        desired.host_id.clone()
    }

    fn actual_key(&self, consumer: &Consumer) -> Option<String> {
        if self.is_managed(consumer) {
            consumer.external_id.clone()
        } else {
            None
        }
    }

    fn is_managed(&self, consumer: &Consumer) -> bool {
        self.namespace.is_managed(&consumer.owner.key)
    }
}

/// Managed consumers carrying a cross-reference already seen on an earlier
/// consumer, in listing order. The first holder stays the match.
pub fn duplicate_cross_references<'a>(
    namespace: &Namespace,
    consumers: &'a [Consumer],
) -> Vec<&'a Consumer> {
    let policy = HostPolicy { namespace };
    let mut seen = HashSet::new();
    consumers
        .iter()
        .filter(|consumer| match policy.actual_key(consumer) {
            Some(key) => !seen.insert(key),
            None => false,
        })
        .collect()
}

/// Push translated hosts downstream. Stale and duplicate consumers are
/// deleted first.
pub fn sync_hosts(
    ctx: &LogContext,
    config: &CheckinConfig,
    namespace: &Namespace,
    server: &dyn EntitlementServer,
    desired: &[DesiredConsumer],
) -> Result<SyncStats> {
    let consumers = server.list_consumers()?;
    let plan = reconcile(&HostPolicy { namespace }, desired, &consumers);

    let mut to_delete = plan.to_delete;
    for duplicate in duplicate_cross_references(namespace, &consumers) {
        if to_delete.iter().any(|c| c.uuid == duplicate.uuid) {
            continue;
        }
        log::warn!(
            "{} CONSUMER_DUPLICATE host_id={} owner={}",
            ctx.with_entity("consumer", &duplicate.uuid),
            duplicate.external_id.as_deref().unwrap_or(""),
            duplicate.owner.key
        );
        to_delete.push(duplicate);
    }

    log::info!(
        "{} HOST_PLAN upstream={} downstream={} create={} update={} delete={}",
        ctx,
        desired.len(),
        consumers.len(),
        plan.to_create.len(),
        plan.to_update.len(),
        to_delete.len()
    );

    let mut stats = SyncStats::default();

    for consumer in to_delete {
        server.delete_consumer(&consumer.uuid)?;
        log::info!(
            "{} CONSUMER_DELETED host_id={} owner={}",
            ctx.with_entity("consumer", &consumer.uuid),
            consumer.external_id.as_deref().unwrap_or(""),
            consumer.owner.key
        );
        stats.deleted += 1;
    }

    let total = plan.to_create.len() + plan.to_update.len();
    let mut processed = 0;

    for host in plan.to_create {
        create_consumer(ctx, server, host)?;
        stats.created += 1;
        processed += 1;
        log_progress(ctx, config, processed, total);
    }

    for (host, consumer) in plan.to_update {
        if consumer.owner.key != host.owner_label {
            move_consumer(ctx, server, host, consumer)?;
            stats.deleted += 1;
            stats.created += 1;
        } else if update_consumer(ctx, server, host, consumer)? {
            stats.updated += 1;
        } else {
            stats.created += 1;
        }
        processed += 1;
        log_progress(ctx, config, processed, total);
    }

    Ok(stats)
}

/// Register, record the cross-reference, attach products, then activate.
fn create_consumer(
    ctx: &LogContext,
    server: &dyn EntitlementServer,
    host: &DesiredConsumer,
) -> Result<String> {
    let registration = ConsumerRegistration {
        name: host.name.clone(),
        owner_label: host.owner_label.clone(),
        facts: host.facts.clone(),
    };
    let uuid = server.create_consumer(&registration)?;
    server.set_custom_info(&uuid, SOURCE_ID_FIELD, &host.host_id)?;

    let update = ConsumerUpdate {
        name: host.name.clone(),
        facts: None,
        installed_products: host.installed_products.clone(),
    };
    server.update_consumer(&uuid, &update)?;
    server.checkin(&uuid, host.last_checkin)?;
    server.refresh_entitlements(&uuid)?;

    log::info!(
        "{} CONSUMER_CREATED uuid={} owner={} products={}",
        ctx.with_entity("host", &host.host_id),
        uuid,
        host.owner_label,
        host.installed_products.len()
    );
    Ok(uuid)
}

/// Returns `false` when the consumer had vanished and was registered anew.
fn update_consumer(
    ctx: &LogContext,
    server: &dyn EntitlementServer,
    host: &DesiredConsumer,
    consumer: &Consumer,
) -> Result<bool> {
    let update = ConsumerUpdate {
        name: host.name.clone(),
        facts: Some(host.facts.clone()),
        installed_products: host.installed_products.clone(),
    };

    match server.update_consumer(&consumer.uuid, &update) {
        Ok(()) => {}
        Err(e) if e.is_not_found() => {
            log::warn!(
                "{} CONSUMER_VANISHED uuid={} registering again",
                ctx.with_entity("host", &host.host_id),
                consumer.uuid
            );
            create_consumer(ctx, server, host)?;
            return Ok(false);
        }
        Err(e) => return Err(e.into()),
    }

    server.checkin(&consumer.uuid, host.last_checkin)?;
    server.refresh_entitlements(&consumer.uuid)?;

    log::debug!(
        "{} CONSUMER_UPDATED uuid={}",
        ctx.with_entity("host", &host.host_id),
        consumer.uuid
    );
    Ok(true)
}

/// The host changed organization: consumers cannot change owner, so the old
/// one is dropped and the host registered in its new owner.
fn move_consumer(
    ctx: &LogContext,
    server: &dyn EntitlementServer,
    host: &DesiredConsumer,
    consumer: &Consumer,
) -> Result<()> {
    server.delete_consumer(&consumer.uuid)?;
    log::info!(
        "{} CONSUMER_MOVED uuid={} from={} to={}",
        ctx.with_entity("host", &host.host_id),
        consumer.uuid,
        consumer.owner.key,
        host.owner_label
    );
    create_consumer(ctx, server, host)?;
    Ok(())
}

fn log_progress(ctx: &LogContext, config: &CheckinConfig, processed: usize, total: usize) {
    if processed % config.progress_interval.max(1) == 0 || processed == total {
        log::info!("{} HOST_PROGRESS processed={} total={}", ctx, processed, total);
    }
}
