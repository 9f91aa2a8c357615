//! Records read from the host-inventory (source) system.
//!
//! Each run reads a fresh snapshot; these records are never written back.

use serde::{Deserialize, Serialize};

/// Upstream role token granting administration of the user's organization.
pub const SOURCE_ORG_ADMIN: &str = "Organization Administrator";
/// Upstream role token granting full administration.
pub const SOURCE_SATELLITE_ADMIN: &str = "Satellite Administrator";

/// One registered host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostRecord {
    /// Source-assigned server id; stable across runs.
    pub id: String,
    pub name: String,
    pub hostname: Option<String>,
    pub org_id: String,
    #[serde(default)]
    pub cpu: CpuInfo,
    /// Installed memory in kilobytes.
    pub memory_kb: Option<u64>,
    /// Swap in kilobytes.
    pub swap_kb: Option<u64>,
    pub network: NetworkInfo,
    /// Subscribed channel label, or several joined with `;`.
    #[serde(default)]
    pub software_channel: String,
    /// `YYYY-MM-DD HH:MM:SS`
    pub last_checkin: String,
    pub inactive: Option<Inactivity>,
    /// Virtualization guests running on this host, passed through untouched.
    #[serde(default)]
    pub active_guest_info: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CpuInfo {
    pub arch: Option<String>,
    pub cpu_count: Option<u32>,
    pub socket_count: Option<u32>,
    pub cores_per_socket: Option<u32>,
    pub cache: Option<String>,
    pub mhz: Option<String>,
    pub vendor: Option<String>,
    pub model: Option<String>,
    pub stepping: Option<String>,
}

/// The two shapes in which the source reports network hardware.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NetworkInfo {
    /// `"2 CPUs 1 Sockets; eth0 10.0.0.5/255.255.255.0 52:54:00:26:96:a7; lo ..."`
    Summary(String),
    /// One entry per interface.
    Devices(Vec<NetworkDevice>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkDevice {
    pub interface: String,
    pub ip: Option<String>,
    pub netmask: Option<String>,
    pub hardware_address: Option<String>,
    pub broadcast: Option<String>,
}

/// Present when the source flags the host as no longer checking in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inactivity {
    pub last_boot: Option<String>,
    pub last_checkin: Option<String>,
}

/// A user of the source system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceUser {
    pub username: String,
    pub email: String,
    pub organization_id: String,
    #[serde(default)]
    pub organization: String,
    /// Role names joined with `;`.
    #[serde(default)]
    pub role: String,
}

impl SourceUser {
    /// Named roles from the `;`-delimited role string, blanks dropped.
    pub fn roles(&self) -> Vec<&str> {
        self.role
            .split(';')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .collect()
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles().contains(&role)
    }
}

/// A channel and the channel it was cloned from, if any.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelRecord {
    pub label: String,
    pub parent_label: Option<String>,
}

impl ChannelRecord {
    pub fn new(label: &str, parent_label: Option<&str>) -> Self {
        Self {
            label: label.to_string(),
            parent_label: parent_label.map(|p| p.to_string()),
        }
    }
}
