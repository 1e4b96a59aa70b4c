//! Resource entries, handles, and resolved resources.
//!
//! An entry is immutable once built: the payload, media type, and digest
//! never change. Only the store's last-access bookkeeping moves.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::clock::window_millis;
use crate::hash::Blake3Hash;
use crate::media::MediaType;
use crate::types::ResourceId;

/// Expiry policy attached to a single entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expiry {
    /// Fixed lifetime measured from creation.
    pub ttl: Option<Duration>,
    /// Maximum time between resolves.
    pub idle_timeout: Option<Duration>,
}

impl Expiry {
    /// No expiry: the entry lives until revoked.
    pub const NEVER: Self = Self {
        ttl: None,
        idle_timeout: None,
    };

    /// Whether any expiry applies.
    pub fn is_never(&self) -> bool {
        self.ttl.is_none() && self.idle_timeout.is_none()
    }
}

/// A stored resource.
#[derive(Clone, PartialEq, Eq)]
pub struct ResourceEntry {
    id: ResourceId,
    payload: Bytes,
    media_type: MediaType,
    digest: Blake3Hash,
    created_at: i64,
    expires_at: Option<i64>,
    idle_timeout_ms: Option<i64>,
}

impl ResourceEntry {
    /// Build an entry, computing its digest and absolute expiry.
    pub fn new(
        id: ResourceId,
        payload: Bytes,
        media_type: MediaType,
        created_at: i64,
        expiry: Expiry,
    ) -> Self {
        let digest = Blake3Hash::hash(&payload);
        Self {
            id,
            payload,
            media_type,
            digest,
            created_at,
            expires_at: expiry
                .ttl
                .map(|ttl| created_at.saturating_add(window_millis(ttl))),
            idle_timeout_ms: expiry.idle_timeout.map(window_millis),
        }
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    pub fn media_type(&self) -> &MediaType {
        &self.media_type
    }

    pub fn digest(&self) -> Blake3Hash {
        self.digest
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    /// Absolute TTL deadline in Unix ms, if a TTL applies.
    pub fn expires_at(&self) -> Option<i64> {
        self.expires_at
    }

    /// Idle window in ms, if idle expiry applies.
    pub fn idle_timeout_ms(&self) -> Option<i64> {
        self.idle_timeout_ms
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Whether the entry has expired at `now`, given its last resolve time.
    ///
    /// The TTL deadline is exclusive: an entry is still live one millisecond
    /// before `expires_at` and gone at `expires_at`.
    pub fn is_expired(&self, now: i64, last_accessed_at: i64) -> bool {
        if matches!(self.expires_at, Some(deadline) if now >= deadline) {
            return true;
        }
        matches!(
            self.idle_timeout_ms,
            Some(window) if now.saturating_sub(last_accessed_at) >= window
        )
    }

    /// The resolved view of this entry.
    pub fn to_resource(&self) -> Resource {
        Resource {
            id: self.id,
            bytes: self.payload.clone(),
            media_type: self.media_type.clone(),
            digest: self.digest,
        }
    }
}

impl fmt::Debug for ResourceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceEntry")
            .field("id", &self.id)
            .field("media_type", &self.media_type)
            .field("len", &self.payload.len())
            .field("digest", &self.digest)
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .field("idle_timeout_ms", &self.idle_timeout_ms)
            .finish()
    }
}

/// The bytes and metadata returned by a resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub id: ResourceId,
    /// Exactly the bytes stored at publish time.
    pub bytes: Bytes,
    pub media_type: MediaType,
    pub digest: Blake3Hash,
}

impl Resource {
    /// The payload as UTF-8 text, if it is valid UTF-8.
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }
}

/// The capability returned by publish.
///
/// Holding a handle grants the right to resolve or revoke the entry; it is
/// never a pointer into registry storage. Displays as its URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceHandle {
    id: ResourceId,
    uri: String,
}

impl ResourceHandle {
    pub fn new(id: ResourceId, uri: String) -> Self {
        Self { id, uri }
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    /// The URI to hand to a URL-based consumer.
    pub fn uri(&self) -> &str {
        &self.uri
    }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

impl AsRef<str> for ResourceHandle {
    fn as_ref(&self) -> &str {
        &self.uri
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(expiry: Expiry) -> ResourceEntry {
        ResourceEntry::new(
            ResourceId::from_parts(1, 2),
            Bytes::from_static(b"{}"),
            MediaType::parse("application/json").unwrap(),
            1_000,
            expiry,
        )
    }

    #[test]
    fn test_digest_is_computed() {
        let e = entry(Expiry::NEVER);
        assert_eq!(e.digest(), Blake3Hash::hash(b"{}"));
        assert_eq!(e.len(), 2);
    }

    #[test]
    fn test_never_expires() {
        let e = entry(Expiry::NEVER);
        assert!(!e.is_expired(i64::MAX, 0));
        assert_eq!(e.expires_at(), None);
    }

    #[test]
    fn test_ttl_deadline_is_exclusive() {
        let e = entry(Expiry {
            ttl: Some(Duration::from_millis(500)),
            idle_timeout: None,
        });
        assert_eq!(e.expires_at(), Some(1_500));
        assert!(!e.is_expired(1_499, 1_000));
        assert!(e.is_expired(1_500, 1_000));
    }

    #[test]
    fn test_sub_millisecond_ttl_is_live_at_creation() {
        let e = entry(Expiry {
            ttl: Some(Duration::from_micros(500)),
            idle_timeout: Some(Duration::from_nanos(10)),
        });
        assert_eq!(e.expires_at(), Some(1_001));
        assert_eq!(e.idle_timeout_ms(), Some(1));
        assert!(!e.is_expired(1_000, 1_000));
        assert!(e.is_expired(1_001, 1_000));
    }

    #[test]
    fn test_idle_window_tracks_last_access() {
        let e = entry(Expiry {
            ttl: None,
            idle_timeout: Some(Duration::from_millis(100)),
        });
        assert!(!e.is_expired(1_099, 1_000));
        assert!(e.is_expired(1_100, 1_000));
        // A resolve at 1_050 pushes the deadline out.
        assert!(!e.is_expired(1_100, 1_050));
    }

    #[test]
    fn test_resource_shares_bytes() {
        let e = entry(Expiry::NEVER);
        let r = e.to_resource();
        assert_eq!(r.bytes, e.payload().clone());
        assert_eq!(r.as_text(), Some("{}"));
        assert_eq!(r.media_type.as_str(), "application/json");
    }

    #[test]
    fn test_handle_displays_uri() {
        let h = ResourceHandle::new(ResourceId::from_parts(1, 2), "vres://x/y".into());
        assert_eq!(h.to_string(), "vres://x/y");
        assert_eq!(h.as_ref(), "vres://x/y");
    }
}
