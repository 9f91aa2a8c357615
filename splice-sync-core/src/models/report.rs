//! Payloads accepted by the reporting server.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wrapper every reporting upload is sent in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub objects: Vec<T>,
}

impl<T> Envelope<T> {
    pub fn new(objects: Vec<T>) -> Self {
        Self { objects }
    }
}

/// Identity of the server emitting usage data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpliceServerMetadata {
    pub uuid: String,
    pub description: String,
    pub environment: String,
    pub hostname: String,
    pub created: String,
    pub updated: String,
}

/// Product usage of one consumer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketingProductUsage {
    pub splice_server: String,
    pub date: String,
    pub name: String,
    pub service_level: String,
    /// Filled in by the reporting server.
    pub created: String,
    pub updated: String,
    pub hostname: String,
    pub instance_identifier: String,
    pub entitlement_status: Value,
    pub organization_id: String,
    pub organization_name: String,
    /// Facts with `.` rewritten, see `translate::rewrite_fact_keys`.
    pub facts: serde_json::Map<String, Value>,
    pub product_info: Vec<ProductUsage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductUsage {
    pub account: String,
    pub contract: String,
    pub product: String,
    pub quantity: i64,
}
