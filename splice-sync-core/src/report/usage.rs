//! Consumer to usage-record projection.

use serde_json::Value;

use crate::error::TranslateError;
use crate::models::{Consumer, Entitlement, MarketingProductUsage, ProductUsage};
use crate::translate::rewrite_fact_keys;

pub fn product_usage(entitlements: &[Entitlement]) -> Vec<ProductUsage> {
    entitlements
        .iter()
        .map(|e| ProductUsage {
            account: e.account_number.clone(),
            contract: e.contract_number.clone(),
            product: e.product_id.clone(),
            quantity: e.quantity,
        })
        .collect()
}

/// Build the usage record of one consumer.
///
/// The hostname fact and the checkin time are required.
pub fn usage_record(
    consumer: &Consumer,
    entitlements: &[Entitlement],
    splice_server: &str,
) -> Result<MarketingProductUsage, TranslateError> {
    let missing = |field: &str| TranslateError::MissingField {
        host_id: consumer.uuid.clone(),
        field: field.to_string(),
    };

    let hostname = consumer
        .facts
        .get("network.hostname")
        .and_then(Value::as_str)
        .ok_or_else(|| missing("network.hostname"))?;
    let date = consumer
        .checkin_time
        .clone()
        .ok_or_else(|| missing("checkin_time"))?;

    Ok(MarketingProductUsage {
        splice_server: splice_server.to_string(),
        date,
        name: consumer.name.clone(),
        service_level: consumer.service_level.clone().unwrap_or_default(),
        created: String::new(),
        updated: String::new(),
        hostname: hostname.to_string(),
        instance_identifier: consumer.uuid.clone(),
        entitlement_status: consumer.entitlement_status.clone().unwrap_or(Value::Null),
        organization_id: consumer.owner.key.clone(),
        organization_name: consumer.owner.display_name.clone(),
        facts: rewrite_fact_keys(&consumer.facts),
        product_info: product_usage(entitlements),
    })
}
