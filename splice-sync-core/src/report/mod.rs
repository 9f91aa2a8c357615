//! Upload formatting for the reporting server.
//!
//! - `usage` - consumer and entitlement projection into usage records
//! - `upload` - server metadata, envelopes, status-checked posts, sample dumps

pub mod upload;
pub mod usage;

pub use upload::*;
pub use usage::*;
