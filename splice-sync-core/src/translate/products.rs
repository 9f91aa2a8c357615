//! Channel to installed-product resolution.
//!
//! A subscribed channel is normalized to its clone origin, looked up in the
//! channel/certificate mapping file, and the certificate's product id is
//! resolved against the local product certificate store.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;

use crate::channels::OriginResolver;
use crate::clients::ProductCertStore;
use crate::error::{Result, TranslateError};
use crate::models::InstalledProduct;

lazy_static! {
    /// Mapping lines start with a letter; anything else is a comment or blank.
    static ref MAPPING_LINE: Regex = Regex::new(r"^[a-zA-Z]").unwrap();
}

/// Root channel label to product certificate file name.
#[derive(Debug, Clone, Default)]
pub struct ChannelCertMapping {
    certs: HashMap<String, String>,
}

impl ChannelCertMapping {
    /// Parse `channel-label: cert-file` lines.
    pub fn parse(contents: &str) -> Self {
        let mut certs = HashMap::new();

        for (lineno, line) in contents.lines().enumerate() {
            if !MAPPING_LINE.is_match(line) {
                continue;
            }
            match line.split_once(": ") {
                Some((label, cert)) if !cert.trim().is_empty() => {
                    certs.insert(label.trim().to_string(), cert.trim().to_string());
                }
                _ => {
                    log::warn!("MAPPING_LINE_SKIPPED line={} content={:?}", lineno + 1, line);
                }
            }
        }

        Self { certs }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let mapping = Self::parse(&contents);
        log::info!(
            "MAPPING_LOADED path={} channels={}",
            path.display(),
            mapping.len()
        );
        Ok(mapping)
    }

    pub fn cert_for(&self, channel: &str) -> Option<&str> {
        self.certs.get(channel).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.certs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certs.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, S)> for ChannelCertMapping {
    fn from_iter<I: IntoIterator<Item = (S, S)>>(iter: I) -> Self {
        Self {
            certs: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Product id encoded in a certificate file name: `rhel-x86_64-server-6-69.pem` is `69`.
pub fn product_id_from_cert(cert: &str) -> &str {
    let last = cert.rsplit('-').next().unwrap_or(cert);
    last.split('.').next().unwrap_or(last)
}

/// Resolves subscribed channels to the installed products a consumer reports.
pub struct ProductResolver<'a> {
    mapping: &'a ChannelCertMapping,
    origins: &'a OriginResolver,
    certs: &'a dyn ProductCertStore,
}

impl<'a> ProductResolver<'a> {
    pub fn new(
        mapping: &'a ChannelCertMapping,
        origins: &'a OriginResolver,
        certs: &'a dyn ProductCertStore,
    ) -> Self {
        Self {
            mapping,
            origins,
            certs,
        }
    }

    /// Installed products for a `;`-delimited channel list.
    ///
    /// Unmapped channels are skipped. A mapped product without a local
    /// certificate is an error.
    pub fn resolve_installed_products(&self, channels: &str) -> Result<Vec<InstalledProduct>> {
        let mut seen = BTreeSet::new();
        let mut products = Vec::new();

        for channel in channels.split(';').map(str::trim).filter(|c| !c.is_empty()) {
            let origin = self.origins.resolve(channel)?;
            let Some(cert) = self.mapping.cert_for(&origin) else {
                log::debug!("CHANNEL_UNMAPPED channel={} origin={}", channel, origin);
                continue;
            };

            let product_id = product_id_from_cert(cert);
            if !seen.insert(product_id.to_string()) {
                continue;
            }

            let product = self.certs.find_by_product(product_id).ok_or_else(|| {
                TranslateError::UnknownProductCertificate {
                    channel: channel.to_string(),
                    product_id: product_id.to_string(),
                }
            })?;

            products.push(InstalledProduct {
                product_id: product.id,
                product_name: product.name,
            });
        }

        Ok(products)
    }
}
