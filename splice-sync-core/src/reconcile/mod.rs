//! Set reconciliation and the entity sync orchestrators.
//!
//! Stages run in dependency order, each to completion:
//! - `orgs` - source organizations to managed owners
//! - `users` - create-only user sync
//! - `roles` - org-admin / full-admin grants and revocations
//! - `hosts` - source hosts to consumers

pub mod diff;
pub mod hosts;
pub mod namespace;
pub mod orgs;
pub mod roles;
pub mod users;

pub use diff::*;
pub use hosts::*;
pub use namespace::*;
pub use orgs::*;
pub use roles::*;
pub use users::*;

use serde::Serialize;

/// Downstream changes applied by one stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncStats {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub granted: usize,
    pub revoked: usize,
    /// Entities matched but left untouched.
    pub unchanged: usize,
}

impl SyncStats {
    pub fn merge(&mut self, other: &SyncStats) {
        self.created += other.created;
        self.updated += other.updated;
        self.deleted += other.deleted;
        self.granted += other.granted;
        self.revoked += other.revoked;
        self.unchanged += other.unchanged;
    }

    pub fn changes(&self) -> usize {
        self.created + self.updated + self.deleted + self.granted + self.revoked
    }
}
