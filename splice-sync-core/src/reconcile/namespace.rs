//! The managed owner namespace.

/// Owners whose label carries the prefix belong to this tool; the rest of
/// the label is the source organization id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    prefix: String,
}

impl Namespace {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
        }
    }

    /// `1` -> `satellite-1`
    pub fn label_for(&self, org_id: &str) -> String {
        format!("{}{}", self.prefix, org_id)
    }

    /// `satellite-1` -> `1`; labels outside the namespace yield `None`.
    pub fn org_id_for<'l>(&self, label: &'l str) -> Option<&'l str> {
        label
            .strip_prefix(self.prefix.as_str())
            .filter(|org_id| !org_id.is_empty())
    }

    pub fn is_managed(&self, label: &str) -> bool {
        self.org_id_for(label).is_some()
    }
}
