//! Checkin run coordinator.
//!
//! Sequences one run:
//! 1. Fetch source snapshots (orgs, users, channels, hosts)
//! 2. Translate every host; any failure stops the run before a single write
//! 3. Reconcile orgs, users, roles and hosts, in that order
//! 4. Project downstream consumers into usage records and upload them

use chrono::Utc;
use serde::Serialize;

use crate::channels::OriginResolver;
use crate::clients::{EntitlementServer, ProductCertStore, ReportingServer, SourceSystem};
use crate::config::CheckinConfig;
use crate::error::{Result, SyncError, EX_OK};
use crate::logging::init_logger;
use crate::reconcile::{sync_hosts, sync_orgs, sync_roles, sync_users, Namespace, SyncStats};
use crate::report::{build_server_metadata, upload_to_splice, usage_record};
use crate::translate::{ChannelCertMapping, HostTranslator, ProductResolver};

use super::context::{RunContext, RunMode};

/// The external systems a run talks to.
pub struct Collaborators<'a> {
    pub source: &'a dyn SourceSystem,
    pub entitlement: &'a dyn EntitlementServer,
    pub reporting: &'a dyn ReportingServer,
    pub certs: &'a dyn ProductCertStore,
}

/// Per-stage counts of a run.
#[derive(Debug, Clone, Serialize)]
pub struct CheckinReport {
    pub run_id: String,
    pub mode: RunMode,
    pub orgs: SyncStats,
    pub users: SyncStats,
    pub roles: SyncStats,
    pub hosts: SyncStats,
    pub usage_records: usize,
}

impl CheckinReport {
    pub fn new(run: &RunContext) -> Self {
        Self {
            run_id: run.run_id.clone(),
            mode: run.mode,
            orgs: SyncStats::default(),
            users: SyncStats::default(),
            roles: SyncStats::default(),
            hosts: SyncStats::default(),
            usage_records: 0,
        }
    }
}

/// Report of a finished run, with the error that stopped it, if any.
#[derive(Debug)]
pub struct RunOutcome {
    pub report: CheckinReport,
    pub error: Option<SyncError>,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn exit_code(&self) -> i32 {
        self.error.as_ref().map_or(EX_OK, SyncError::exit_code)
    }
}

/// Bring the entitlement server in line with the source system.
pub fn spacewalk_sync(
    run: &RunContext,
    config: &CheckinConfig,
    systems: &Collaborators<'_>,
    mapping: &ChannelCertMapping,
    report: &mut CheckinReport,
) -> Result<()> {
    let ctx = run.stage("fetch");
    let orgs = systems.source.get_org_list()?;
    let users = systems.source.list_users()?;
    let channels = systems.source.list_channels()?;
    let hosts = systems.source.list_hosts()?;
    log::info!(
        "{} SOURCE_FETCHED orgs={} users={} channels={} hosts={}",
        ctx,
        orgs.len(),
        users.len(),
        channels.len(),
        hosts.len()
    );

    let namespace = Namespace::new(&config.owner_prefix);
    let origins = OriginResolver::new(&channels);
    let translator = HostTranslator::new(
        config,
        &namespace,
        ProductResolver::new(mapping, &origins, systems.certs),
    );
    let desired = translator.translate_all(&hosts)?;
    log::info!("{} HOSTS_TRANSLATED count={}", run.stage("translate"), desired.len());

    let server = systems.entitlement;
    report.orgs = sync_orgs(&run.stage("orgs"), config, &namespace, server, &orgs)?;
    report.users = sync_users(&run.stage("users"), config, server, &users)?;
    report.roles = sync_roles(&run.stage("roles"), &namespace, server, &users)?;
    report.hosts = sync_hosts(&run.stage("hosts"), config, &namespace, server, &desired)?;
    Ok(())
}

/// Upload usage of every downstream consumer to the reporting server.
pub fn splice_sync(
    run: &RunContext,
    config: &CheckinConfig,
    systems: &Collaborators<'_>,
    report: &mut CheckinReport,
) -> Result<()> {
    let ctx = run.stage("upload");
    let consumers = systems.entitlement.list_consumers()?;

    let mut usage = Vec::with_capacity(consumers.len());
    for consumer in &consumers {
        let entitlements = systems.entitlement.list_entitlements(&consumer.uuid)?;
        usage.push(usage_record(consumer, &entitlements, &config.splice.server_uuid)?);
    }
    log::info!("{} USAGE_BUILT records={}", ctx, usage.len());

    report.usage_records = usage.len();
    let metadata = build_server_metadata(&config.splice, Utc::now());
    upload_to_splice(&ctx, &config.splice, systems.reporting, metadata, usage)
}

/// Run a checkin in the given mode.
///
/// Never panics on collaborator failure; the outcome carries the error and
/// the exit code the caller should report.
pub fn run_checkin(
    config: &CheckinConfig,
    mode: RunMode,
    systems: &Collaborators<'_>,
    mapping: &ChannelCertMapping,
) -> RunOutcome {
    init_logger();

    let run = RunContext::new(mode);
    let mut report = CheckinReport::new(&run);
    log::info!("{} RUN_STARTED mode={}", run.log_context(), mode);

    let result = execute(&run, config, systems, mapping, &mut report);
    let error = match result {
        Ok(()) => {
            log::info!(
                "{} RUN_COMPLETE elapsed_ms={} owners_created={} owners_deleted={} users_created={} roles_granted={} roles_revoked={} consumers_created={} consumers_updated={} consumers_deleted={} usage_records={}",
                run.log_context(),
                run.elapsed_ms(),
                report.orgs.created,
                report.orgs.deleted,
                report.users.created,
                report.roles.granted,
                report.roles.revoked,
                report.hosts.created,
                report.hosts.updated,
                report.hosts.deleted,
                report.usage_records
            );
            None
        }
        Err(e) => {
            log::error!(
                "{} RUN_FAILED exit_code={} error={}",
                run.log_context(),
                e.exit_code(),
                e
            );
            Some(e)
        }
    };

    RunOutcome { report, error }
}

fn execute(
    run: &RunContext,
    config: &CheckinConfig,
    systems: &Collaborators<'_>,
    mapping: &ChannelCertMapping,
    report: &mut CheckinReport,
) -> Result<()> {
    config.validate()?;
    if run.mode.syncs_spacewalk() {
        spacewalk_sync(run, config, systems, mapping, report)?;
    }
    if run.mode.syncs_splice() {
        splice_sync(run, config, systems, report)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::mock::{
        consumer, Call, MockEntitlementServer, MockReportingServer, MockSourceSystem,
    };
    use crate::clients::ProductCert;
    use crate::error::{EX_CONFIG, EX_DATAERR};
    use crate::models::{ChannelRecord, CpuInfo, HostRecord, NetworkInfo, SourceUser};
    use std::collections::HashMap;

    fn host(id: &str, org_id: &str, network: &str) -> HostRecord {
        HostRecord {
            id: id.to_string(),
            name: format!("host-{}", id),
            hostname: Some(format!("host-{}.example.com", id)),
            org_id: org_id.to_string(),
            cpu: CpuInfo::default(),
            memory_kb: Some(1655),
            swap_kb: None,
            network: NetworkInfo::Summary(network.to_string()),
            software_channel: "clone-rhel-6".to_string(),
            last_checkin: "2013-05-03 16:37:54".to_string(),
            inactive: None,
            active_guest_info: None,
        }
    }

    const ETH0: &str = "1 CPUs 1 Sockets; eth0 10.0.0.5/255.255.255.0 52:54:00:26:96:a7";

    fn source() -> MockSourceSystem {
        MockSourceSystem {
            hosts: vec![host("100", "1", ETH0), host("101", "2", ETH0)],
            users: vec![SourceUser {
                username: "foo".to_string(),
                email: "foo@example.com".to_string(),
                organization_id: "1".to_string(),
                organization: "foo".to_string(),
                role: "Organization Administrator".to_string(),
            }],
            channels: vec![
                ChannelRecord::new("rhel-x86_64-server-6", None),
                ChannelRecord::new("clone-rhel-6", Some("rhel-x86_64-server-6")),
            ],
            orgs: [("1", "foo"), ("2", "bar")]
                .iter()
                .map(|(id, name)| (id.to_string(), name.to_string()))
                .collect(),
        }
    }

    fn certs() -> HashMap<String, ProductCert> {
        let mut certs = HashMap::new();
        certs.insert(
            "69".to_string(),
            ProductCert {
                id: "69".to_string(),
                name: "Red Hat Enterprise Linux Server".to_string(),
            },
        );
        certs
    }

    fn mapping() -> ChannelCertMapping {
        ChannelCertMapping::parse("rhel-x86_64-server-6: rhel-x86_64-server-6-69.pem\n")
    }

    #[test]
    fn test_full_run() {
        let source = source();
        let server = MockEntitlementServer::new()
            .with_owners(&[("satellite-1", "foo")])
            .with_consumers(vec![
                consumer("1-1-1", "host-100", "satellite-1", "100"),
                consumer("1-1-9", "host-999", "satellite-1", "999"),
            ]);
        let reporting = MockReportingServer::default();
        let certs = certs();
        let systems = Collaborators {
            source: &source,
            entitlement: &server,
            reporting: &reporting,
            certs: &certs,
        };

        let outcome = run_checkin(&CheckinConfig::default(), RunMode::Full, &systems, &mapping());

        assert!(outcome.is_success(), "{:?}", outcome.error);
        assert_eq!(outcome.exit_code(), EX_OK);

        let report = &outcome.report;
        assert_eq!(report.orgs.created, 1);
        assert_eq!(report.users.created, 1);
        assert_eq!(report.roles.granted, 1);
        assert_eq!(report.hosts.created, 1);
        assert_eq!(report.hosts.updated, 1);
        assert_eq!(report.hosts.deleted, 1);
        assert_eq!(report.usage_records, 2);
        assert_eq!(reporting.posts.borrow().len(), 2);

        // the owner exists before its consumers are registered
        let calls = server.calls();
        let owner_at = calls
            .iter()
            .position(|c| matches!(c, Call::CreateOwner { label, .. } if label == "satellite-2"))
            .unwrap();
        let consumer_at = calls
            .iter()
            .position(|c| matches!(c, Call::CreateConsumer { owner_label, .. } if owner_label == "satellite-2"))
            .unwrap();
        assert!(owner_at < consumer_at);
    }

    #[test]
    fn test_translation_failure_stops_before_writes() {
        let mut source = source();
        source
            .hosts
            .push(host("102", "1", "lo 127.0.0.1/255.0.0.0 00:00:00:00:00:00"));
        let server = MockEntitlementServer::new()
            .with_consumers(vec![consumer("1-1-1", "host-100", "satellite-1", "100")]);
        let reporting = MockReportingServer::default();
        let certs = certs();
        let systems = Collaborators {
            source: &source,
            entitlement: &server,
            reporting: &reporting,
            certs: &certs,
        };

        let outcome = run_checkin(&CheckinConfig::default(), RunMode::Full, &systems, &mapping());

        assert_eq!(outcome.exit_code(), EX_DATAERR);
        assert!(server.calls().is_empty());
        assert!(reporting.posts.borrow().is_empty());
    }

    #[test]
    fn test_splice_only_run() {
        let source = MockSourceSystem::default();
        let server = MockEntitlementServer::new()
            .with_consumers(vec![consumer("1-1-1", "host-100", "satellite-1", "100")]);
        let reporting = MockReportingServer::default();
        let certs = certs();
        let systems = Collaborators {
            source: &source,
            entitlement: &server,
            reporting: &reporting,
            certs: &certs,
        };

        let outcome = run_checkin(
            &CheckinConfig::default(),
            RunMode::SpliceOnly,
            &systems,
            &mapping(),
        );

        assert!(outcome.is_success());
        assert!(server.calls().is_empty());
        assert_eq!(outcome.report.usage_records, 1);
        assert_eq!(reporting.posts.borrow().len(), 2);
    }

    #[test]
    fn test_rejected_upload_is_a_data_error() {
        let source = MockSourceSystem::default();
        let server = MockEntitlementServer::new();
        let mut reporting = MockReportingServer::default();
        reporting
            .statuses
            .insert(crate::report::USAGE_PATH.to_string(), 500);
        let certs = certs();
        let systems = Collaborators {
            source: &source,
            entitlement: &server,
            reporting: &reporting,
            certs: &certs,
        };

        let outcome = run_checkin(
            &CheckinConfig::default(),
            RunMode::SpliceOnly,
            &systems,
            &mapping(),
        );
        assert!(matches!(outcome.error, Some(SyncError::Upload { status: 500, .. })));
        assert_eq!(outcome.exit_code(), EX_DATAERR);
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let source = source();
        let server = MockEntitlementServer::new();
        let reporting = MockReportingServer::default();
        let certs = certs();
        let systems = Collaborators {
            source: &source,
            entitlement: &server,
            reporting: &reporting,
            certs: &certs,
        };
        let config = CheckinConfig {
            owner_prefix: String::new(),
            ..Default::default()
        };

        let outcome = run_checkin(&config, RunMode::Full, &systems, &mapping());
        assert_eq!(outcome.exit_code(), EX_CONFIG);
        assert!(server.calls().is_empty());
    }
}
