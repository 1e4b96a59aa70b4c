//! Store trait: the abstract interface for entry storage.
//!
//! The registry owns id allocation, encoding, and expiry policy; the store
//! only keeps entries and answers questions about them.

use vres_core::{ResourceEntry, ResourceId};

use crate::error::Result;

/// Optional budgets enforced on insert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Limits {
    /// Maximum number of live entries.
    pub max_entries: Option<usize>,
    /// Maximum total payload bytes across live entries.
    pub max_bytes: Option<usize>,
}

impl Limits {
    /// No limits.
    pub const UNBOUNDED: Self = Self {
        max_entries: None,
        max_bytes: None,
    };
}

/// Outcome of looking up an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// The entry exists and has not expired. Its last access was updated.
    Live(ResourceEntry),
    /// The entry exists but its TTL or idle window has elapsed.
    Expired,
    /// No entry with this id is stored.
    Missing,
}

/// Entry storage.
///
/// All methods take `&self`; implementations provide their own interior
/// synchronization and must be safe to call from many threads at once.
///
/// # Design Notes
///
/// - `insert` is all-or-nothing: on error the store is unchanged.
/// - `lookup` must not block other lookups.
/// - Expired entries are never returned as `Live`, whether or not they have
///   been removed yet.
pub trait Store: Send + Sync {
    /// Insert a new entry, enforcing `limits`.
    fn insert(&self, entry: ResourceEntry, limits: &Limits) -> Result<()>;

    /// Look up an entry at time `now`, touching its last access if live.
    fn lookup(&self, id: &ResourceId, now: i64) -> Result<Lookup>;

    /// Remove an entry. Returns it if it was present.
    fn remove(&self, id: &ResourceId) -> Result<Option<ResourceEntry>>;

    /// Remove an entry only if it has expired at `now`.
    ///
    /// Returns whether it was removed.
    fn reclaim(&self, id: &ResourceId, now: i64) -> Result<bool>;

    /// Remove every entry that has expired at `now`. Returns their ids.
    fn remove_expired(&self, now: i64) -> Result<Vec<ResourceId>>;

    /// Whether an entry is stored (expired or not).
    fn contains(&self, id: &ResourceId) -> Result<bool>;

    /// Ids of all stored entries, in id order.
    fn ids(&self) -> Result<Vec<ResourceId>>;

    /// Number of stored entries.
    fn len(&self) -> Result<usize>;

    /// Total payload bytes of stored entries.
    fn total_bytes(&self) -> Result<usize>;

    /// Remove everything. Returns the number of entries removed.
    fn clear(&self) -> Result<usize>;
}
