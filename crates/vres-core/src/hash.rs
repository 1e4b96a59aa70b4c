//! Payload digests.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 32-byte Blake3 hash of a payload.
///
/// Computed once when an entry is created. Consumers can compare it against
/// the bytes they fetched, or use it as an ETag.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Blake3Hash(pub [u8; 32]);

impl Blake3Hash {
    /// Compute the Blake3 hash of the given data.
    pub fn hash(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Whether `data` hashes to this digest.
    pub fn matches(&self, data: &[u8]) -> bool {
        Self::hash(data) == *self
    }
}

impl fmt::Debug for Blake3Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Blake3({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Blake3Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl AsRef<[u8]> for Blake3Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_matches() {
        let digest = Blake3Hash::hash(b"hello");
        assert!(digest.matches(b"hello"));
        assert!(!digest.matches(b"hello!"));
    }

    #[test]
    fn test_empty_input_known_value() {
        let digest = Blake3Hash::hash(b"");
        assert_eq!(
            digest.to_hex(),
            "af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262"
        );
    }

    #[test]
    fn test_debug_is_truncated() {
        let debug = format!("{:?}", Blake3Hash::hash(b""));
        assert_eq!(debug, "Blake3(af1349b9f5f9a1a6)");
    }
}
