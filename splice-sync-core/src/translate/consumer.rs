//! Projection of a source host into the consumer shape.

use chrono::NaiveDateTime;
use serde_json::Value;

use crate::config::CheckinConfig;
use crate::error::{Result, TranslateError};
use crate::models::{DesiredConsumer, Facts, HostRecord, NetworkInfo};
use crate::reconcile::Namespace;

use super::facts::{cpu_facts, guest_facts, inactive_facts, memory_facts};
use super::network::{network_facts, parse_hardware_summary};
use super::products::ProductResolver;

/// Timestamp format of source checkin times.
pub const SOURCE_CHECKIN_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct HostTranslator<'a> {
    config: &'a CheckinConfig,
    namespace: &'a Namespace,
    products: ProductResolver<'a>,
}

impl<'a> HostTranslator<'a> {
    pub fn new(
        config: &'a CheckinConfig,
        namespace: &'a Namespace,
        products: ProductResolver<'a>,
    ) -> Self {
        Self {
            config,
            namespace,
            products,
        }
    }

    /// Translate every host, stopping at the first failure.
    ///
    /// A partial list must never reach the reconciler: missing hosts would
    /// be read as deleted upstream.
    pub fn translate_all(&self, hosts: &[HostRecord]) -> Result<Vec<DesiredConsumer>> {
        hosts.iter().map(|host| self.translate(host)).collect()
    }

    pub fn translate(&self, host: &HostRecord) -> Result<DesiredConsumer> {
        let hostname = host
            .hostname
            .as_deref()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| TranslateError::MissingField {
                host_id: host.id.clone(),
                field: "hostname".to_string(),
            })?;

        let last_checkin = NaiveDateTime::parse_from_str(&host.last_checkin, SOURCE_CHECKIN_FORMAT)
            .map_err(|_| TranslateError::InvalidTimestamp {
                host_id: host.id.clone(),
                value: host.last_checkin.clone(),
            })?;

        let mut cpu = host.cpu.clone();
        let devices = match &host.network {
            NetworkInfo::Summary(summary) => {
                let parsed = parse_hardware_summary(&host.id, summary)?;
                cpu.cpu_count = cpu.cpu_count.or(parsed.cpu_count);
                cpu.socket_count = cpu.socket_count.or(parsed.socket_count);
                parsed.devices
            }
            NetworkInfo::Devices(devices) => devices.clone(),
        };

        let mut facts = Facts::new();
        facts.extend(cpu_facts(&cpu));
        facts.extend(network_facts(&host.id, &devices, &self.config.primary_interface)?);
        facts.extend(memory_facts(host.memory_kb, host.swap_kb));
        facts.extend(inactive_facts(host.inactive.as_ref()));
        facts.extend(guest_facts(host.active_guest_info.as_ref()));
        facts.insert("systemid".to_string(), Value::from(host.id.as_str()));
        facts.insert(
            "system.certificate_version".to_string(),
            Value::from(self.config.certificate_version.as_str()),
        );
        facts.insert("network.hostname".to_string(), Value::from(hostname));

        let installed_products = self
            .products
            .resolve_installed_products(&host.software_channel)?;

        let name = if host.name.is_empty() {
            hostname.to_string()
        } else {
            host.name.clone()
        };

        log::debug!(
            "HOST_TRANSLATED host_id={} facts={} products={}",
            host.id,
            facts.len(),
            installed_products.len()
        );

        Ok(DesiredConsumer {
            host_id: host.id.clone(),
            name,
            owner_label: self.namespace.label_for(&host.org_id),
            facts,
            installed_products,
            last_checkin,
        })
    }
}
