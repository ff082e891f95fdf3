//! Error types for the key-value store
//!
//! Provides unified error handling using thiserror. A missing or expired key is
//! never an error; lookups report it as `None`.

use std::collections::TryReserveError;

use thiserror::Error;

// == Kv Error Enum ==
/// Unified error type for the key-value store.
#[derive(Error, Debug)]
pub enum KvError {
    /// Memory for a new entry could not be reserved
    #[error("Allocation failed: {0}")]
    AllocationFailed(#[from] TryReserveError),

    /// Configuration value out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

// == Result Type Alias ==
/// Convenience Result type for the key-value store.
pub type Result<T> = std::result::Result<T, KvError>;
