//! Error types for the store module.

use std::fmt;

use thiserror::Error;
use vres_core::ResourceId;

/// Which budget a rejected insert would have exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityKind {
    Entries,
    Bytes,
}

impl fmt::Display for CapacityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapacityKind::Entries => f.write_str("entry"),
            CapacityKind::Bytes => f.write_str("byte"),
        }
    }
}

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Inserting would exceed a configured budget.
    #[error("{kind} capacity exceeded: limit {limit}, would reach {requested}")]
    Capacity {
        kind: CapacityKind,
        limit: usize,
        requested: usize,
    },

    /// An entry with this id is already stored.
    #[error("resource id already present: {0}")]
    DuplicateId(ResourceId),

    /// A thread panicked while holding the store lock.
    #[error("store lock poisoned")]
    Poisoned,

    /// The backing storage cannot be reached right now.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Whether retrying the same call later could succeed without the caller
    /// changing anything.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
