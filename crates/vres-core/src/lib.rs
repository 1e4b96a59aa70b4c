//! # vres core
//!
//! Pure value types for the virtual resource registry: identifiers, media
//! types, entries, handles, and the canonical encoders that turn structured
//! values into payload bytes.
//!
//! This crate does no I/O and holds no shared state.
//!
//! ## Key Types
//!
//! - [`ResourceId`] - Sequence number plus random nonce, never reissued
//! - [`MediaType`] - Parsed `type/subtype`, selects the [`Encoding`]
//! - [`ResourceEntry`] - Immutable payload, media type, digest, expiry
//! - [`ResourceHandle`] - The capability (id + URI) returned by publish
//! - [`Locator`] - Routes a URI string to a registry or to the network
//!
//! ## Encoding
//!
//! JSON keeps object keys in insertion order; CBOR is deterministic. See the
//! [`canonical`] module.

pub mod canonical;
pub mod clock;
pub mod entry;
pub mod error;
pub mod hash;
pub mod media;
pub mod types;
pub mod uri;

pub use canonical::{canonical_cbor, canonical_json, encode};
pub use clock::{duration_millis, window_millis, Clock, ManualClock, SystemClock};
pub use entry::{Expiry, Resource, ResourceEntry, ResourceHandle};
pub use error::{EncodingError, LocatorError};
pub use hash::Blake3Hash;
pub use media::{known, Encoding, MediaType};
pub use types::{is_valid_scheme, InstanceTag, ResourceId};
pub use uri::{format_uri, Locator, DEFAULT_SCHEME};
