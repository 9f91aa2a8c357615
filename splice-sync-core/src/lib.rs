//! Splice Sync Core - Spacewalk / Katello / Splice reconciliation engine
//!
//! This crate keeps an entitlement server's owners, users, roles and
//! consumers in line with a Spacewalk inventory, and reports the resulting
//! consumer usage to a Splice server. The implementation prioritizes:
//!
//! 1. **Safety** - A run halts before its first write if any host fails translation
//! 2. **Logging** - Every downstream mutation logged with run context
//! 3. **Ownership** - Only the managed owner namespace is ever deleted from
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `pipeline` - Run coordinator (`run_checkin`)
//! - `reconcile` - Generic set diff and the org/user/role/host orchestrators
//! - `translate` - Host to consumer field translation, product resolution
//! - `channels` - Channel clone-origin resolution
//! - `report` - Usage projection and reporting uploads
//! - `clients` - Collaborator traits for the three external systems
//! - `models` - Typed records of each system
//! - `config` - Checkin configuration
//! - `logging` - Structured logging with run context
//! - `error` - Error taxonomy and exit codes

pub mod channels;
pub mod clients;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod reconcile;
pub mod report;
pub mod translate;

pub use config::CheckinConfig;
pub use error::{Result, SyncError};
pub use pipeline::{run_checkin, Collaborators, RunMode, RunOutcome};
