//! TTL KV - An embedded in-memory key-value store
//!
//! Provides per-entry TTL expiration with lazy evaluation, caller-driven
//! sweeping and ordered range queries over byte-string keys.

pub mod clock;
pub mod config;
pub mod error;
pub mod store;
pub mod sweep;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use error::{KvError, Result};
pub use store::KvStorage;
pub use sweep::{drain_expired, SweepReport};
