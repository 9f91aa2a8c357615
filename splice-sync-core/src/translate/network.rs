//! Network fact translation.
//!
//! The source reports interfaces either as a flat hardware summary string or
//! as a list of device records; both end up as `net.interface.<iface>.*` facts.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use crate::error::TranslateError;
use crate::models::{Facts, NetworkDevice};

lazy_static! {
    /// Leading cpu token of a hardware summary: `2 CPUs 1 Sockets`
    static ref CPU_SUMMARY: Regex = Regex::new(r"^(\d+)\s+CPUs?\s+(\d+)\s+Sockets?$").unwrap();

    /// Interface token of a hardware summary: `eth0 10.0.0.5/255.255.255.0 52:54:00:26:96:a7`
    static ref INTERFACE_TOKEN: Regex = Regex::new(r"^(\S+)\s+(\S+)/(\S+)\s+(\S+)$").unwrap();
}

/// Parsed form of a `;`-delimited hardware summary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HardwareSummary {
    pub cpu_count: Option<u32>,
    pub socket_count: Option<u32>,
    pub devices: Vec<NetworkDevice>,
}

/// Parse `"2 CPUs 1 Sockets; eth0 ip/mask mac; lo ip/mask mac"`.
pub fn parse_hardware_summary(host_id: &str, summary: &str) -> Result<HardwareSummary, TranslateError> {
    let mut parsed = HardwareSummary::default();

    for token in summary.split(';').map(str::trim).filter(|t| !t.is_empty()) {
        if let Some(caps) = CPU_SUMMARY.captures(token) {
            parsed.cpu_count = caps[1].parse().ok();
            parsed.socket_count = caps[2].parse().ok();
            continue;
        }

        let caps = INTERFACE_TOKEN
            .captures(token)
            .ok_or_else(|| TranslateError::MalformedInterface {
                host_id: host_id.to_string(),
                token: token.to_string(),
            })?;

        parsed.devices.push(NetworkDevice {
            interface: caps[1].to_string(),
            ip: Some(caps[2].to_string()),
            netmask: Some(caps[3].to_string()),
            hardware_address: Some(caps[4].to_string()),
            broadcast: None,
        });
    }

    Ok(parsed)
}

/// Per-interface facts plus `net.ipv4_address` mirrored from the primary interface.
///
/// The primary interface and its mac address are required.
pub fn network_facts(
    host_id: &str,
    devices: &[NetworkDevice],
    primary_interface: &str,
) -> Result<Facts, TranslateError> {
    let mut facts = Facts::new();

    for device in devices {
        let prefix = format!("net.interface.{}", device.interface);
        let fields = [
            ("mac_address", &device.hardware_address),
            ("ipv4_address", &device.ip),
            ("ipv4_netmask", &device.netmask),
            ("ipv4_broadcast", &device.broadcast),
        ];
        for (suffix, value) in fields {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                facts.insert(format!("{}.{}", prefix, suffix), Value::from(value));
            }
        }
    }

    let primary = devices
        .iter()
        .find(|d| d.interface == primary_interface)
        .ok_or_else(|| TranslateError::MissingInterface {
            host_id: host_id.to_string(),
            interface: primary_interface.to_string(),
        })?;

    if primary.hardware_address.as_deref().unwrap_or("").is_empty() {
        return Err(TranslateError::MissingField {
            host_id: host_id.to_string(),
            field: format!("net.interface.{}.mac_address", primary_interface),
        });
    }

    if let Some(ip) = primary.ip.as_deref().filter(|ip| !ip.is_empty()) {
        facts.insert("net.ipv4_address".to_string(), Value::from(ip));
    }

    Ok(facts)
}
