//! The Registry: publish, resolve, revoke, and expire virtual resources.
//!
//! A registry turns in-memory values into URIs that any URL-based consumer
//! can be handed, and serves the exact bytes back on resolve until the
//! resource is revoked or expires.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use vres_core::{
    encode, format_uri, Clock, InstanceTag, Locator, LocatorError, MediaType, Resource,
    ResourceEntry, ResourceHandle, ResourceId, SystemClock,
};
use vres_store::{Lookup, MemoryStore, Store};

use crate::config::{PublishOptions, RegistryConfig};
use crate::error::{RegistryError, Result};

/// A reference to a resource: a handle, a bare id, or a URI string.
#[derive(Debug, Clone, Copy)]
pub enum ResourceRef<'a> {
    /// An id assumed to belong to this registry.
    Id(ResourceId),
    /// A URI, checked against this registry's scheme and instance.
    Uri(&'a str),
}

impl<'a> From<&'a ResourceHandle> for ResourceRef<'a> {
    fn from(handle: &'a ResourceHandle) -> Self {
        ResourceRef::Uri(handle.uri())
    }
}

impl<'a> From<&'a str> for ResourceRef<'a> {
    fn from(uri: &'a str) -> Self {
        ResourceRef::Uri(uri)
    }
}

impl<'a> From<&'a String> for ResourceRef<'a> {
    fn from(uri: &'a String) -> Self {
        ResourceRef::Uri(uri)
    }
}

impl From<ResourceId> for ResourceRef<'_> {
    fn from(id: ResourceId) -> Self {
        ResourceRef::Id(id)
    }
}

impl From<&ResourceId> for ResourceRef<'_> {
    fn from(id: &ResourceId) -> Self {
        ResourceRef::Id(*id)
    }
}

impl ResourceRef<'_> {
    fn describe(&self) -> String {
        match self {
            ResourceRef::Id(id) => id.to_string(),
            ResourceRef::Uri(uri) => (*uri).to_string(),
        }
    }
}

/// Point-in-time counters for a registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    /// Entries currently stored (including expired ones not yet reclaimed).
    pub live_entries: usize,
    /// Payload bytes currently stored.
    pub live_bytes: usize,
    /// Successful publishes since creation.
    pub published: u64,
    /// Entries removed by revoke or teardown.
    pub revoked: u64,
    /// Entries removed because they expired.
    pub expired: u64,
}

#[derive(Debug, Default)]
struct Counters {
    published: AtomicU64,
    revoked: AtomicU64,
    expired: AtomicU64,
}

/// The virtual resource registry.
///
/// Owns all entry storage; callers only ever hold [`ResourceHandle`]s. Every
/// method takes `&self` and the registry is `Send + Sync`, so it can be shared
/// behind an `Arc` by any number of publishers and resolvers.
pub struct Registry<S: Store = MemoryStore> {
    store: S,
    config: RegistryConfig,
    clock: Arc<dyn Clock>,
    instance: InstanceTag,
    /// Next sequence number to hand out. Starts at 1, never goes back.
    next_seq: AtomicU64,
    counters: Counters,
}

impl Registry<MemoryStore> {
    /// An in-memory registry with the default configuration.
    pub fn in_memory() -> Self {
        Self::from_parts(MemoryStore::new(), RegistryConfig::default())
    }
}

impl<S: Store> Registry<S> {
    /// Create a registry over `store`.
    pub fn new(store: S, config: RegistryConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(store, config))
    }

    fn from_parts(store: S, config: RegistryConfig) -> Self {
        Self {
            store,
            config,
            clock: Arc::new(SystemClock),
            instance: InstanceTag::generate(),
            next_seq: AtomicU64::new(1),
            counters: Counters::default(),
        }
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The tag embedded in every URI this registry mints.
    pub fn instance(&self) -> InstanceTag {
        self.instance
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Publish
    // ─────────────────────────────────────────────────────────────────────────

    /// Encode `data` for `media_type` and publish it.
    ///
    /// Fails with [`RegistryError::Encoding`] when the value cannot be encoded
    /// (the media type has no structured encoding, or the value's `Serialize`
    /// impl errors), with [`RegistryError::InvalidOptions`] when a TTL or idle
    /// window is under 1 ms, and with [`RegistryError::Capacity`] when a
    /// configured budget is full. On failure nothing is stored.
    pub fn publish<T: Serialize + ?Sized>(
        &self,
        data: &T,
        media_type: &str,
        options: PublishOptions,
    ) -> Result<ResourceHandle> {
        options.validate()?;
        let media_type = MediaType::parse(media_type)?;
        let payload = encode(data, &media_type)?;
        self.insert(Bytes::from(payload), media_type, options)
    }

    /// Publish pre-encoded bytes verbatim.
    ///
    /// Only the media type is validated; any media type is accepted.
    pub fn publish_bytes(
        &self,
        bytes: impl Into<Bytes>,
        media_type: &str,
        options: PublishOptions,
    ) -> Result<ResourceHandle> {
        options.validate()?;
        let media_type = MediaType::parse(media_type)?;
        self.insert(bytes.into(), media_type, options)
    }

    fn insert(
        &self,
        payload: Bytes,
        media_type: MediaType,
        options: PublishOptions,
    ) -> Result<ResourceHandle> {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let id = ResourceId::generate(seq);
        let len = payload.len();
        let entry = ResourceEntry::new(
            id,
            payload,
            media_type,
            self.clock.now_millis(),
            options.expiry(&self.config),
        );
        let media_type = entry.media_type().clone();

        if let Err(e) = self.store.insert(entry, &self.config.limits()) {
            tracing::warn!(%id, %media_type, len, error = %e, "publish rejected");
            return Err(e.into());
        }

        self.counters.published.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(%id, %media_type, len, "published resource");
        Ok(self.handle_for(id))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Resolve / Revoke
    // ─────────────────────────────────────────────────────────────────────────

    /// Return the exact bytes and media type stored for a resource.
    ///
    /// Fails with [`RegistryError::NotFound`] if the reference was never
    /// issued by this registry, was revoked, or has expired. An expired entry
    /// found here is reclaimed immediately.
    pub fn resolve<'a>(&self, reference: impl Into<ResourceRef<'a>>) -> Result<Resource> {
        let reference = reference.into();
        let not_found = || RegistryError::NotFound {
            reference: reference.describe(),
        };

        let id = self.own_id(&reference).ok_or_else(not_found)?;
        let now = self.clock.now_millis();

        match self.store.lookup(&id, now)? {
            Lookup::Live(entry) => Ok(entry.to_resource()),
            Lookup::Expired => {
                if self.store.reclaim(&id, now)? {
                    self.counters.expired.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(%id, "reclaimed expired resource on resolve");
                }
                Err(not_found())
            }
            Lookup::Missing => {
                tracing::debug!(%id, "resolve miss");
                Err(not_found())
            }
        }
    }

    /// Revoke a resource.
    ///
    /// Idempotent: unknown, already revoked, malformed, or foreign references
    /// are a no-op. Returns whether an entry was removed.
    pub fn revoke<'a>(&self, reference: impl Into<ResourceRef<'a>>) -> Result<bool> {
        let reference = reference.into();
        let Some(id) = self.own_id(&reference) else {
            return Ok(false);
        };

        match self.store.remove(&id)? {
            Some(entry) => {
                self.counters.revoked.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(%id, len = entry.len(), "revoked resource");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Whether a reference names a stored entry, without touching it.
    ///
    /// Expired entries count until they are reclaimed.
    pub fn contains<'a>(&self, reference: impl Into<ResourceRef<'a>>) -> Result<bool> {
        match self.own_id(&reference.into()) {
            Some(id) => Ok(self.store.contains(&id)?),
            None => Ok(false),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Remove every entry whose TTL or idle window has elapsed.
    ///
    /// Returns how many were removed.
    pub fn sweep_expired(&self) -> Result<usize> {
        let removed = self.store.remove_expired(self.clock.now_millis())?;
        if !removed.is_empty() {
            self.counters
                .expired
                .fetch_add(removed.len() as u64, Ordering::Relaxed);
            tracing::info!(removed = removed.len(), "swept expired resources");
        }
        Ok(removed.len())
    }

    /// Revoke everything. Returns how many entries were removed.
    ///
    /// The registry stays usable; new ids continue from where they left off.
    pub fn teardown(&self) -> Result<usize> {
        let removed = self.store.clear()?;
        self.counters
            .revoked
            .fetch_add(removed as u64, Ordering::Relaxed);
        tracing::info!(removed, "registry torn down");
        Ok(removed)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Introspection
    // ─────────────────────────────────────────────────────────────────────────

    /// Number of stored entries.
    pub fn len(&self) -> Result<usize> {
        Ok(self.store.len()?)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.store.len()? == 0)
    }

    /// Total stored payload bytes.
    pub fn total_bytes(&self) -> Result<usize> {
        Ok(self.store.total_bytes()?)
    }

    /// Handles for every stored entry, in publish order.
    pub fn handles(&self) -> Result<Vec<ResourceHandle>> {
        Ok(self
            .store
            .ids()?
            .into_iter()
            .map(|id| self.handle_for(id))
            .collect())
    }

    pub fn stats(&self) -> Result<RegistryStats> {
        Ok(RegistryStats {
            live_entries: self.store.len()?,
            live_bytes: self.store.total_bytes()?,
            published: self.counters.published.load(Ordering::Relaxed),
            revoked: self.counters.revoked.load(Ordering::Relaxed),
            expired: self.counters.expired.load(Ordering::Relaxed),
        })
    }

    /// Classify a URI for dispatch: ours, or something to fetch elsewhere.
    pub fn locate(&self, uri: &str) -> std::result::Result<Locator, LocatorError> {
        Locator::parse(uri, &self.config.scheme)
    }

    /// Whether `uri` was minted by this registry instance.
    pub fn owns(&self, uri: &str) -> bool {
        matches!(
            self.locate(uri),
            Ok(Locator::Virtual { instance, .. }) if instance == self.instance
        )
    }

    fn handle_for(&self, id: ResourceId) -> ResourceHandle {
        ResourceHandle::new(id, format_uri(&self.config.scheme, self.instance, id))
    }

    /// Map a reference to an id of this registry, if it can be one.
    fn own_id(&self, reference: &ResourceRef<'_>) -> Option<ResourceId> {
        match reference {
            ResourceRef::Id(id) => Some(*id),
            ResourceRef::Uri(uri) => match self.locate(uri) {
                Ok(Locator::Virtual { instance, id }) if instance == self.instance => Some(id),
                _ => None,
            },
        }
    }
}

impl<S: Store> std::fmt::Debug for Registry<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("instance", &self.instance)
            .field("config", &self.config)
            .field("next_seq", &self.next_seq.load(Ordering::Relaxed))
            .finish()
    }
}
