//! Checkin configuration.
//!
//! Built once by the caller and handed by reference to every stage of the run.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, SyncError};

/// Settings for a checkin run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CheckinConfig {
    /// Label prefix marking downstream owners this tool manages.
    pub owner_prefix: String,
    /// Source organization that hosts the distributors of every other org.
    pub primary_org_id: String,
    /// Provider receiving imported manifests.
    pub manifest_provider: String,
    pub environment_name: String,
    pub environment_label: String,
    /// Placeholder password for users created downstream.
    pub default_user_password: String,
    /// Interface every host must report; its address becomes `net.ipv4_address`.
    pub primary_interface: String,
    pub certificate_version: String,
    /// Log upload progress every N hosts.
    pub progress_interval: usize,
    pub splice: SpliceConfig,
}

/// Reporting server identity and payload dump settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SpliceConfig {
    pub server_uuid: String,
    pub server_hostname: String,
    pub server_environment: String,
    pub server_description: String,
    pub sample_json_dir: Option<PathBuf>,
}

impl Default for CheckinConfig {
    fn default() -> Self {
        Self {
            owner_prefix: "satellite-".to_string(),
            primary_org_id: "1".to_string(),
            manifest_provider: "Red Hat".to_string(),
            environment_name: "spacewalk_env".to_string(),
            environment_label: "spacewalk_environment".to_string(),
            default_user_password: "CHANGEME".to_string(),
            primary_interface: "eth0".to_string(),
            certificate_version: "3.1".to_string(),
            progress_interval: 10,
            splice: SpliceConfig::default(),
        }
    }
}

impl CheckinConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: CheckinConfig =
            toml::from_str(raw).map_err(|e| SyncError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            SyncError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if self.owner_prefix.is_empty() {
            return Err(SyncError::config(
                "owner_prefix must not be empty, every owner would be managed",
            ));
        }
        if self.primary_interface.is_empty() {
            return Err(SyncError::config("primary_interface must not be empty"));
        }
        if self.progress_interval == 0 {
            return Err(SyncError::config("progress_interval must be at least 1"));
        }
        Ok(())
    }
}
