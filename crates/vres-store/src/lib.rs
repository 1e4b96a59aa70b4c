//! # vres store
//!
//! Storage abstraction for the virtual resource registry. The registry talks
//! to entries only through the [`Store`] trait; [`MemoryStore`] is the
//! in-process implementation.
//!
//! ## Key Types
//!
//! - [`Store`] - The id → entry mapping
//! - [`MemoryStore`] - `RwLock`-protected map with atomic last-access times
//! - [`Limits`] - Optional entry-count and byte budgets enforced on insert
//! - [`Lookup`] - Outcome of a read: live, expired, or missing
//!
//! ## Design Notes
//!
//! - **Atomic inserts**: capacity is checked and the entry inserted under one
//!   write-lock acquisition; a rejected insert leaves the store unchanged
//! - **Read-lock resolves**: lookups only take the read lock; last access is
//!   an atomic inside the stored entry
//! - **No silent eviction**: entries leave the store only through `remove`,
//!   `reclaim`, `remove_expired`, or `clear`

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{CapacityKind, Result, StoreError};
pub use memory::MemoryStore;
pub use traits::{Limits, Lookup, Store};
