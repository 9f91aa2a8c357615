//! Field translation between the three record schemas.
//!
//! - `facts` - cpu, memory and inactivity facts; dotted-key rewriting
//! - `network` - hardware summary parsing and per-interface facts
//! - `products` - channel to installed-product resolution
//! - `consumer` - a source host projected into the consumer shape

pub mod consumer;
pub mod facts;
pub mod network;
pub mod products;

pub use consumer::*;
pub use facts::*;
pub use network::*;
pub use products::*;
