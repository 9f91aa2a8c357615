//! Channel-origin resolution.
//!
//! Walks the clone-parent chain of a channel up to its root. Results are
//! memoized per resolver, which lives for one run.

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;

use crate::error::CyclicChannelGraph;
use crate::models::ChannelRecord;

/// Resolve `channel` to its root against a one-off channel snapshot.
pub fn resolve(channel: &str, channels: &[ChannelRecord]) -> Result<String, CyclicChannelGraph> {
    OriginResolver::new(channels).resolve(channel)
}

/// Memoizing resolver over the channel snapshot of one run.
#[derive(Debug)]
pub struct OriginResolver {
    parents: HashMap<String, Option<String>>,
    memo: Mutex<HashMap<String, String>>,
}

impl OriginResolver {
    pub fn new(channels: &[ChannelRecord]) -> Self {
        let parents = channels
            .iter()
            .map(|c| {
                let parent = c
                    .parent_label
                    .as_ref()
                    .filter(|p| !p.is_empty() && **p != c.label)
                    .cloned();
                (c.label.clone(), parent)
            })
            .collect();

        Self {
            parents,
            memo: Mutex::new(HashMap::new()),
        }
    }

    /// Root label of `channel`.
    ///
    /// A channel without a parent, or absent from the snapshot, is its own root.
    pub fn resolve(&self, channel: &str) -> Result<String, CyclicChannelGraph> {
        if let Some(root) = self.memo.lock().get(channel) {
            return Ok(root.clone());
        }

        let mut path = vec![channel.to_string()];
        let mut visited: HashSet<&str> = HashSet::from([channel]);
        let mut current = channel;

        let root = loop {
            if let Some(root) = self.memo.lock().get(current) {
                break root.clone();
            }
            match self.parents.get(current) {
                Some(Some(parent)) => {
                    path.push(parent.clone());
                    if !visited.insert(parent.as_str()) {
                        log::error!(
                            "CHANNEL_CYCLE_DETECTED channel={} cycle={:?}",
                            channel,
                            path
                        );
                        return Err(CyclicChannelGraph {
                            channel: channel.to_string(),
                            cycle: path,
                        });
                    }
                    current = parent.as_str();
                }
                _ => break current.to_string(),
            }
        };

        let mut memo = self.memo.lock();
        for label in path {
            memo.insert(label, root.clone());
        }

        log::debug!("CHANNEL_RESOLVED channel={} root={}", channel, root);
        Ok(root)
    }
}
