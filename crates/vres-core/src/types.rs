//! Strong identifier types.
//!
//! Ids are newtypes so a resource id can never be confused with an instance
//! tag or a raw counter value.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Length of a rendered [`ResourceId`] in hex characters.
pub const RESOURCE_ID_HEX_LEN: usize = 32;

/// Length of a rendered [`InstanceTag`] in hex characters.
pub const INSTANCE_TAG_HEX_LEN: usize = 8;

/// A resource identifier: a per-registry sequence number plus a random nonce.
///
/// The sequence number is what guarantees uniqueness (it is never reissued);
/// the nonce makes ids unguessable. Neither part is derived from the payload,
/// so two identical payloads always get distinct ids.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId {
    seq: u64,
    nonce: u64,
}

impl ResourceId {
    /// Create an id from its parts.
    pub const fn from_parts(seq: u64, nonce: u64) -> Self {
        Self { seq, nonce }
    }

    /// Create an id for `seq` with a fresh random nonce.
    pub fn generate(seq: u64) -> Self {
        Self {
            seq,
            nonce: rand::thread_rng().gen(),
        }
    }

    /// The sequence number part.
    pub const fn seq(&self) -> u64 {
        self.seq
    }

    /// The random nonce part.
    pub const fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Render as 32 lowercase hex characters.
    pub fn to_hex(&self) -> String {
        let mut bytes = [0u8; 16];
        bytes[..8].copy_from_slice(&self.seq.to_be_bytes());
        bytes[8..].copy_from_slice(&self.nonce.to_be_bytes());
        hex::encode(bytes)
    }

    /// Parse from 32 hex characters.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 16 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut seq = [0u8; 8];
        let mut nonce = [0u8; 8];
        seq.copy_from_slice(&bytes[..8]);
        nonce.copy_from_slice(&bytes[8..]);
        Ok(Self {
            seq: u64::from_be_bytes(seq),
            nonce: u64::from_be_bytes(nonce),
        })
    }
}

impl fmt::Debug for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceId({}:{:08x})", self.seq, self.nonce >> 32)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ResourceId {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

/// A random tag identifying one registry instance.
///
/// Embedded in every URI a registry mints, so a URI from another instance
/// (or a previous process) never resolves against this one by accident.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceTag(pub u32);

impl InstanceTag {
    /// Generate a fresh random tag.
    pub fn generate() -> Self {
        Self(rand::thread_rng().gen())
    }

    /// Render as 8 lowercase hex characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0.to_be_bytes())
    }

    /// Parse from 8 hex characters.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        let arr: [u8; 4] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| hex::FromHexError::InvalidStringLength)?;
        Ok(Self(u32::from_be_bytes(arr)))
    }
}

impl fmt::Debug for InstanceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InstanceTag({})", self.to_hex())
    }
}

impl fmt::Display for InstanceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Whether `scheme` is a valid URI scheme (RFC 3986 section 3.1).
pub fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_resource_id_hex_roundtrip() {
        let id = ResourceId::from_parts(7, 0xdead_beef_0102_0304);
        let hex = id.to_hex();
        assert_eq!(hex.len(), RESOURCE_ID_HEX_LEN);
        assert_eq!(hex, "0000000000000007deadbeef01020304");
        assert_eq!(ResourceId::from_hex(&hex).unwrap(), id);
    }

    #[test]
    fn test_resource_id_rejects_wrong_length() {
        assert!(ResourceId::from_hex("abcd").is_err());
        assert!(ResourceId::from_hex("zz000000000000000000000000000000").is_err());
    }

    #[test]
    fn test_generate_keeps_seq() {
        let a = ResourceId::generate(1);
        let b = ResourceId::generate(1);
        assert_eq!(a.seq(), 1);
        // Same seq, nonces almost surely differ; ids are only equal if both match.
        assert_eq!(a == b, a.nonce() == b.nonce());
    }

    #[test]
    fn test_instance_tag_hex() {
        let tag = InstanceTag(0x0a0b0c0d);
        assert_eq!(tag.to_hex(), "0a0b0c0d");
        assert_eq!(InstanceTag::from_hex("0a0b0c0d").unwrap(), tag);
        assert!(InstanceTag::from_hex("0a0b").is_err());
    }

    #[test]
    fn test_valid_scheme() {
        assert!(is_valid_scheme("vres"));
        assert!(is_valid_scheme("blob+x.y-z"));
        assert!(!is_valid_scheme(""));
        assert!(!is_valid_scheme("1abc"));
        assert!(!is_valid_scheme("a b"));
    }

    proptest! {
        #[test]
        fn test_resource_id_hex_parses_back(seq: u64, nonce: u64) {
            let id = ResourceId::from_parts(seq, nonce);
            let hex = id.to_hex();
            prop_assert_eq!(hex.len(), RESOURCE_ID_HEX_LEN);
            prop_assert_eq!(hex.parse::<ResourceId>().unwrap(), id);
        }

        #[test]
        fn test_resource_id_orders_by_seq(a: u64, b: u64, na: u64, nb: u64) {
            prop_assume!(a != b);
            let ia = ResourceId::from_parts(a, na);
            let ib = ResourceId::from_parts(b, nb);
            prop_assert_eq!(ia < ib, a < b);
        }
    }
}
