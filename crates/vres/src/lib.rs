//! # vres
//!
//! An in-process virtual resource registry: publish structured in-memory
//! data as short-lived, revocable URIs that any URL-based loader (a map
//! layer, an image tag, a download link) can be handed.
//!
//! ## Overview
//!
//! - **Publish**: encode a value for a media type and get back a handle
//! - **Resolve**: get the exact published bytes back from a handle or URI
//! - **Revoke**: make a resource permanently unretrievable (idempotent)
//! - **Expire**: optional TTL and idle windows, enforced lazily on resolve
//!   and eagerly by [`Registry::sweep_expired`] or a background sweeper
//!
//! ## Usage
//!
//! ```rust
//! use serde_json::json;
//! use vres::{known, PublishOptions, Registry};
//!
//! let registry = Registry::in_memory();
//!
//! let collection = json!({"type": "FeatureCollection", "features": []});
//! let handle = registry
//!     .publish(&collection, known::GEO_JSON, PublishOptions::new())
//!     .unwrap();
//!
//! // Hand `handle.uri()` to a layer loader; it resolves to the same bytes.
//! let resource = registry.resolve(handle.uri()).unwrap();
//! assert_eq!(&resource.bytes[..], br#"{"type":"FeatureCollection","features":[]}"#);
//!
//! registry.revoke(&handle).unwrap();
//! assert!(registry.resolve(&handle).is_err());
//! ```
//!
//! ## Re-exports
//!
//! - `vres::core` - Value types and encoders
//! - `vres::store` - Storage abstraction and the in-memory store

pub mod config;
pub mod error;
pub mod registry;
pub mod sweeper;

pub use vres_core as core;
pub use vres_store as store;

pub use config::{PublishOptions, RegistryConfig};
pub use error::{RegistryError, Result};
pub use registry::{Registry, RegistryStats, ResourceRef};
pub use sweeper::SweeperHandle;

pub use vres_core::{
    known, Blake3Hash, Clock, InstanceTag, Locator, ManualClock, MediaType, Resource,
    ResourceHandle, ResourceId, SystemClock,
};
pub use vres_store::{CapacityKind, MemoryStore, Store};
