//! Reporting server uploads.
//!
//! Payloads are wrapped in `{"objects": [...]}` and posted one kind at a
//! time; a status outside the expected set fails the run.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::clients::ReportingServer;
use crate::config::SpliceConfig;
use crate::error::{Result, SyncError};
use crate::logging::LogContext;
use crate::models::{Envelope, MarketingProductUsage, SpliceServerMetadata};

pub const SPLICE_SERVER_PATH: &str = "/v1/spliceserver/";
pub const USAGE_PATH: &str = "/v1/marketingproductusage/";

const SPLICE_SERVER_ACCEPTED: &[u16] = &[204];
const USAGE_ACCEPTED: &[u16] = &[202, 204];

pub const SAMPLE_USAGE_FILE: &str = "sst_mpu.json";
pub const SAMPLE_SERVER_FILE: &str = "sst_splice_server.json";

pub fn build_server_metadata(config: &SpliceConfig, now: DateTime<Utc>) -> SpliceServerMetadata {
    let stamp = now.to_rfc3339();
    SpliceServerMetadata {
        uuid: config.server_uuid.clone(),
        description: config.server_description.clone(),
        environment: config.server_environment.clone(),
        hostname: config.server_hostname.clone(),
        created: stamp.clone(),
        updated: stamp,
    }
}

pub fn envelope<T: Serialize>(objects: Vec<T>) -> Result<Value> {
    Ok(serde_json::to_value(Envelope::new(objects))?)
}

/// POST `payload`, failing unless the status is one of `accepted`.
pub fn post_checked(
    ctx: &LogContext,
    reporting: &dyn ReportingServer,
    path: &str,
    payload: &Value,
    accepted: &[u16],
) -> Result<()> {
    let (status, body) = reporting.post(path, payload)?;
    if !accepted.contains(&status) {
        log::error!("{} UPLOAD_REJECTED path={} status={}", ctx, path, status);
        return Err(SyncError::Upload {
            path: path.to_string(),
            status,
            body,
        });
    }
    log::info!("{} UPLOAD_ACCEPTED path={} status={}", ctx, path, status);
    Ok(())
}

/// Upload server metadata, then the usage records.
pub fn upload_to_splice(
    ctx: &LogContext,
    config: &SpliceConfig,
    reporting: &dyn ReportingServer,
    metadata: SpliceServerMetadata,
    usage: Vec<MarketingProductUsage>,
) -> Result<()> {
    let server_payload = envelope(vec![metadata])?;
    let usage_payload = envelope(usage)?;

    if let Some(dir) = &config.sample_json_dir {
        write_sample_json(ctx, dir, &server_payload, &usage_payload);
    }

    post_checked(ctx, reporting, SPLICE_SERVER_PATH, &server_payload, SPLICE_SERVER_ACCEPTED)?;
    post_checked(ctx, reporting, USAGE_PATH, &usage_payload, USAGE_ACCEPTED)?;
    Ok(())
}

/// Dump both payloads as pretty JSON. Failures are only logged.
pub fn write_sample_json(ctx: &LogContext, dir: &Path, server_payload: &Value, usage_payload: &Value) {
    let files = [
        (SAMPLE_SERVER_FILE, server_payload),
        (SAMPLE_USAGE_FILE, usage_payload),
    ];
    for (name, payload) in files {
        let path = dir.join(name);
        let written = serde_json::to_string_pretty(payload)
            .map_err(SyncError::from)
            .and_then(|json| fs::write(&path, json).map_err(SyncError::from));
        match written {
            Ok(()) => log::info!("{} SAMPLE_JSON_WRITTEN path={}", ctx, path.display()),
            Err(e) => log::warn!(
                "{} SAMPLE_JSON_FAILED path={} error={}",
                ctx,
                path.display(),
                e
            ),
        }
    }
}
