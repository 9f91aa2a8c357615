//! Run orchestration module.
//!
//! Coordinates a checkin run:
//! - Source snapshot fetch
//! - Host translation
//! - Org, user, role and host reconciliation
//! - Usage upload to the reporting server

pub mod checkin;
pub mod context;

pub use checkin::*;
pub use context::*;
