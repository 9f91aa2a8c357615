//! Structured logging with run context.
//!
//! Every log line of a checkin run carries the run id, the stage being
//! reconciled and, where there is one, the entity being touched.

pub mod structured;

pub use structured::*;
