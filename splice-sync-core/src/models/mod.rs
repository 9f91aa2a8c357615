//! Typed records for the three integrated systems.
//!
//! - `source` - host inventory, users and channel topology as read upstream
//! - `downstream` - owners, users, roles and consumers of the entitlement server
//! - `report` - usage payloads accepted by the reporting server

pub mod downstream;
pub mod report;
pub mod source;

pub use downstream::*;
pub use report::*;
pub use source::*;
