//! Error types for the registry.

use thiserror::Error;
use vres_core::EncodingError;
use vres_store::{CapacityKind, StoreError};

/// Errors that can occur during registry operations.
///
/// `NotFound` is an expected, steady-state outcome (revoked, expired, or never
/// issued). It is kept apart from `Store`, which signals that the backend
/// itself failed.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The payload could not be encoded for the declared media type.
    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// The reference does not name a live resource in this registry.
    #[error("resource not found: {reference}")]
    NotFound { reference: String },

    /// A configured entry or byte budget is exhausted.
    #[error("{kind} capacity exceeded: limit {limit}, would reach {requested}")]
    Capacity {
        kind: CapacityKind,
        limit: usize,
        requested: usize,
    },

    /// The storage backend failed.
    #[error("storage error: {0}")]
    Store(StoreError),

    /// The registry configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Per-publish options are out of range.
    #[error("invalid publish options: {0}")]
    InvalidOptions(String),
}

impl RegistryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RegistryError::NotFound { .. })
    }

    /// Whether the same call may succeed later without any caller action.
    pub fn is_transient(&self) -> bool {
        matches!(self, RegistryError::Store(e) if e.is_transient())
    }
}

impl From<StoreError> for RegistryError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Capacity {
                kind,
                limit,
                requested,
            } => RegistryError::Capacity {
                kind,
                limit,
                requested,
            },
            other => RegistryError::Store(other),
        }
    }
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_is_lifted_out_of_store_errors() {
        let err: RegistryError = StoreError::Capacity {
            kind: CapacityKind::Entries,
            limit: 4,
            requested: 5,
        }
        .into();
        assert!(matches!(err, RegistryError::Capacity { limit: 4, .. }));
        assert_eq!(err.to_string(), "entry capacity exceeded: limit 4, would reach 5");
    }

    #[test]
    fn test_transient_only_for_unavailable_backend() {
        let unavailable: RegistryError = StoreError::Unavailable("timeout".into()).into();
        assert!(unavailable.is_transient());
        assert!(!unavailable.is_not_found());

        let poisoned: RegistryError = StoreError::Poisoned.into();
        assert!(!poisoned.is_transient());

        let missing = RegistryError::NotFound {
            reference: "vres://00000000/00".into(),
        };
        assert!(missing.is_not_found());
        assert!(!missing.is_transient());
    }
}
