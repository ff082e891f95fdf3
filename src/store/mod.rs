//! Store Module
//!
//! Provides the in-memory key-value engine with lazy TTL expiration and
//! ordered range scans.

mod arena;
mod engine;
mod entry;
mod index;


// Re-export public types
pub use engine::KvStorage;
pub use entry::{Entry, NEVER_EXPIRES};
pub(crate) use index::EntryIndex;
