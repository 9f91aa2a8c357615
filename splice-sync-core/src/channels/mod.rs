//! Channel topology.
//!
//! Cloned channels are normalized to the channel they were (transitively)
//! cloned from, so product mappings only need to know root channels.

pub mod origin;

pub use origin::*;
