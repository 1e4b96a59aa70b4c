//! In-memory implementation of the Store trait.
//!
//! Entries live in a `HashMap` behind a single `RwLock`. Lookups take the read
//! lock and record last access through an atomic, so concurrent resolves
//! never wait on each other; inserts and removals take the write lock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use vres_core::{ResourceEntry, ResourceId};

use crate::error::{CapacityKind, Result, StoreError};
use crate::traits::{Limits, Lookup, Store};

/// In-memory store implementation.
///
/// All data is released when the store is dropped.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

struct MemoryStoreInner {
    /// Entries indexed by id.
    entries: HashMap<ResourceId, StoredEntry>,

    /// Sum of payload lengths in `entries`.
    total_bytes: usize,
}

struct StoredEntry {
    entry: ResourceEntry,
    last_accessed_at: AtomicI64,
}

impl StoredEntry {
    fn is_expired(&self, now: i64) -> bool {
        self.entry
            .is_expired(now, self.last_accessed_at.load(Ordering::Acquire))
    }
}

impl MemoryStoreInner {
    fn take(&mut self, id: &ResourceId) -> Option<ResourceEntry> {
        let stored = self.entries.remove(id)?;
        self.total_bytes -= stored.entry.len();
        Some(stored.entry)
    }
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner {
                entries: HashMap::new(),
                total_bytes: 0,
            }),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner.read().map_err(|_| {
            tracing::warn!("memory store lock poisoned");
            StoreError::Poisoned
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner.write().map_err(|_| {
            tracing::warn!("memory store lock poisoned");
            StoreError::Poisoned
        })
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    fn insert(&self, entry: ResourceEntry, limits: &Limits) -> Result<()> {
        let mut inner = self.write()?;

        let id = entry.id();
        if inner.entries.contains_key(&id) {
            return Err(StoreError::DuplicateId(id));
        }

        if let Some(limit) = limits.max_entries {
            let requested = inner.entries.len() + 1;
            if requested > limit {
                return Err(StoreError::Capacity {
                    kind: CapacityKind::Entries,
                    limit,
                    requested,
                });
            }
        }

        let requested_bytes = inner.total_bytes.saturating_add(entry.len());
        if let Some(limit) = limits.max_bytes {
            if requested_bytes > limit {
                return Err(StoreError::Capacity {
                    kind: CapacityKind::Bytes,
                    limit,
                    requested: requested_bytes,
                });
            }
        }

        let created_at = entry.created_at();
        inner.entries.insert(
            id,
            StoredEntry {
                entry,
                last_accessed_at: AtomicI64::new(created_at),
            },
        );
        inner.total_bytes = requested_bytes;

        Ok(())
    }

    fn lookup(&self, id: &ResourceId, now: i64) -> Result<Lookup> {
        let inner = self.read()?;

        let Some(stored) = inner.entries.get(id) else {
            return Ok(Lookup::Missing);
        };

        if stored.is_expired(now) {
            return Ok(Lookup::Expired);
        }

        // fetch_max so a late-arriving older timestamp never moves access backwards.
        stored.last_accessed_at.fetch_max(now, Ordering::AcqRel);
        Ok(Lookup::Live(stored.entry.clone()))
    }

    fn remove(&self, id: &ResourceId) -> Result<Option<ResourceEntry>> {
        let mut inner = self.write()?;
        Ok(inner.take(id))
    }

    fn reclaim(&self, id: &ResourceId, now: i64) -> Result<bool> {
        let mut inner = self.write()?;

        let expired = inner
            .entries
            .get(id)
            .map(|stored| stored.is_expired(now))
            .unwrap_or(false);

        if expired {
            inner.take(id);
        }
        Ok(expired)
    }

    fn remove_expired(&self, now: i64) -> Result<Vec<ResourceId>> {
        let mut inner = self.write()?;

        let mut expired: Vec<ResourceId> = inner
            .entries
            .iter()
            .filter(|(_, stored)| stored.is_expired(now))
            .map(|(id, _)| *id)
            .collect();
        expired.sort();

        for id in &expired {
            inner.take(id);
        }

        Ok(expired)
    }

    fn contains(&self, id: &ResourceId) -> Result<bool> {
        let inner = self.read()?;
        Ok(inner.entries.contains_key(id))
    }

    fn ids(&self) -> Result<Vec<ResourceId>> {
        let inner = self.read()?;
        let mut ids: Vec<ResourceId> = inner.entries.keys().copied().collect();
        ids.sort();
        Ok(ids)
    }

    fn len(&self) -> Result<usize> {
        let inner = self.read()?;
        Ok(inner.entries.len())
    }

    fn total_bytes(&self) -> Result<usize> {
        let inner = self.read()?;
        Ok(inner.total_bytes)
    }

    fn clear(&self) -> Result<usize> {
        let mut inner = self.write()?;
        let removed = inner.entries.len();
        inner.entries.clear();
        inner.total_bytes = 0;
        Ok(removed)
    }
}
