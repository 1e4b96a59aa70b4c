//! Error types for vres core.

use thiserror::Error;

/// Errors raised while turning a value into resource bytes.
///
/// Encoding failures are local to a single publish call: the caller gets the
/// error back and no entry is created.
#[derive(Debug, Error)]
pub enum EncodingError {
    /// The media type string could not be parsed.
    #[error("invalid media type {media_type:?}: {reason}")]
    InvalidMediaType { media_type: String, reason: String },

    /// No structured encoding is defined for this media type.
    #[error("no structured encoding for media type {0}")]
    UnsupportedMediaType(String),

    /// JSON serialization failed.
    #[error("json encoding failed: {0}")]
    Json(String),

    /// CBOR serialization failed.
    #[error("cbor encoding failed: {0}")]
    Cbor(String),

    /// A text media type was requested but the value is not a string.
    #[error("media type {0} requires a string value")]
    NotText(String),
}

impl From<serde_json::Error> for EncodingError {
    fn from(e: serde_json::Error) -> Self {
        EncodingError::Json(e.to_string())
    }
}

/// A URI that uses the registry's scheme but is not well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed resource uri {uri:?}: {reason}")]
pub struct LocatorError {
    pub uri: String,
    pub reason: &'static str,
}

/// Result type for encoding operations.
pub type Result<T> = std::result::Result<T, EncodingError>;
