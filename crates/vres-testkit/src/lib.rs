//! # vres testkit
//!
//! Testing utilities for the virtual resource registry.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: a registry on a manual clock, sample GeoJSON and KML
//!   payloads, and a value whose serialization hits a cycle
//! - **Generators**: Proptest strategies for structured values and media types
//! - **Golden vectors**: Known inputs with the exact bytes each encoding must
//!   produce
//!
//! ## Golden Vectors
//!
//! ```rust
//! use vres_testkit::vectors::{all_vectors, verify_all_vectors};
//!
//! for (name, ok, hex) in verify_all_vectors() {
//!     assert!(ok, "{} encoded to {}", name, hex);
//! }
//! assert!(!all_vectors().is_empty());
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use std::time::Duration;
//! use vres::PublishOptions;
//! use vres_testkit::fixtures::{embedded_polygon, RegistryFixture};
//!
//! let fixture = RegistryFixture::new();
//! let handle = fixture
//!     .registry
//!     .publish(&embedded_polygon(), "application/geo+json", PublishOptions::new().ttl(Duration::from_secs(1)))
//!     .unwrap();
//! fixture.advance(Duration::from_secs(1));
//! assert!(fixture.registry.resolve(&handle).is_err());
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{
    cyclic_graph, embedded_polygon, empty_feature_collection, sample_kml, GraphNode,
    RegistryFixture,
};
pub use generators::{json_media_type, json_value, payload};
pub use vectors::{all_vectors, verify_all_vectors, GoldenVector};
