//! Media types and the encoding each one implies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EncodingError;

/// Well-known media types.
pub mod known {
    pub const JSON: &str = "application/json";
    pub const GEO_JSON: &str = "application/geo+json";
    pub const CBOR: &str = "application/cbor";
    pub const KML: &str = "application/vnd.google-earth.kml+xml";
    pub const XML: &str = "application/xml";
    pub const TEXT: &str = "text/plain";
    pub const OCTET_STREAM: &str = "application/octet-stream";
}

/// How a structured value is turned into bytes for a given media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Compact JSON, object keys in insertion order.
    Json,
    /// Deterministic CBOR.
    Cbor,
    /// The value must be a string; its UTF-8 bytes are stored.
    Text,
}

/// A parsed media type (`type/subtype; params`).
///
/// Type and subtype are lowercased; parameter names are lowercased and values
/// kept verbatim. Values may be RFC 9110 quoted strings (`name="a;b"`). The
/// value is immutable once an entry is created with it.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MediaType {
    /// Full rendered form, e.g. `text/plain; charset=utf-8`.
    raw: String,
    /// Byte length of the `type/subtype` prefix within `raw`.
    essence_len: usize,
    /// Byte offset of the `/` within `raw`.
    slash: usize,
}

impl MediaType {
    /// Parse a media type string.
    pub fn parse(s: &str) -> Result<Self, EncodingError> {
        let invalid = |reason: &str| EncodingError::InvalidMediaType {
            media_type: s.to_string(),
            reason: reason.to_string(),
        };

        let mut parts = split_params(s).into_iter();
        let essence = parts.next().unwrap_or_default().trim();
        let (ty, subtype) = essence
            .split_once('/')
            .ok_or_else(|| invalid("missing '/'"))?;

        if ty.is_empty() || subtype.is_empty() {
            return Err(invalid("empty type or subtype"));
        }
        if !ty.chars().all(is_token_char) || !subtype.chars().all(is_token_char) {
            return Err(invalid("illegal character"));
        }

        let mut raw = format!("{}/{}", ty.to_ascii_lowercase(), subtype.to_ascii_lowercase());
        let essence_len = raw.len();
        let slash = ty.len();

        for param in parts {
            let param = param.trim();
            if param.is_empty() {
                continue;
            }
            let (name, value) = param
                .split_once('=')
                .ok_or_else(|| invalid("parameter without '='"))?;
            if name.is_empty() || !name.chars().all(is_token_char) || value.is_empty() {
                return Err(invalid("malformed parameter"));
            }
            if value.starts_with('"') {
                if !is_quoted_string(value) {
                    return Err(invalid("unterminated quoted parameter value"));
                }
            } else if value.chars().any(|c| c == '"' || c.is_whitespace()) {
                return Err(invalid("malformed parameter"));
            }
            raw.push_str("; ");
            raw.push_str(&name.to_ascii_lowercase());
            raw.push('=');
            raw.push_str(value);
        }

        Ok(Self {
            raw,
            essence_len,
            slash,
        })
    }

    /// The full media type string.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The `type/subtype` part without parameters.
    pub fn essence(&self) -> &str {
        &self.raw[..self.essence_len]
    }

    /// The top-level type (`application` in `application/json`).
    pub fn top_level(&self) -> &str {
        &self.raw[..self.slash]
    }

    /// The subtype (`geo+json` in `application/geo+json`).
    pub fn subtype(&self) -> &str {
        &self.raw[self.slash + 1..self.essence_len]
    }

    /// The structured-syntax suffix (`json` in `geo+json`), if any.
    pub fn suffix(&self) -> Option<&str> {
        self.subtype().rsplit_once('+').map(|(_, suffix)| suffix)
    }

    /// Look up a parameter value by (case-insensitive) name.
    ///
    /// Quoted values come back without their surrounding quotes; backslash
    /// escapes inside them are left as written.
    pub fn param(&self, name: &str) -> Option<&str> {
        split_params(&self.raw[self.essence_len..])
            .into_iter()
            .filter_map(|p| p.trim().split_once('='))
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| {
                if is_quoted_string(v) {
                    &v[1..v.len() - 1]
                } else {
                    v
                }
            })
    }

    /// The structured encoding implied by this media type, if any.
    ///
    /// Media types without one (images, octet streams) can only be published
    /// as pre-encoded bytes.
    pub fn encoding(&self) -> Option<Encoding> {
        match (self.top_level(), self.subtype(), self.suffix()) {
            (_, _, Some("json")) | ("application", "json", _) => Some(Encoding::Json),
            (_, _, Some("cbor")) | ("application", "cbor", _) => Some(Encoding::Cbor),
            ("text", _, _) | (_, _, Some("xml")) | ("application", "xml", _) => {
                Some(Encoding::Text)
            }
            _ => None,
        }
    }
}

/// Split on `;` outside of quoted strings.
fn split_params(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

/// Whether `v` is exactly one quoted string: `"..."` with `\` escapes.
fn is_quoted_string(v: &str) -> bool {
    let Some(inner) = v.strip_prefix('"') else {
        return false;
    };
    let mut escaped = false;
    for (i, c) in inner.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => return i + 1 == inner.len(),
            _ => {}
        }
    }
    false
}

/// RFC 6838 restricted-name characters.
fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '!' | '#' | '$' | '&' | '-' | '^' | '_' | '.' | '+')
}

impl fmt::Debug for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MediaType({})", self.raw)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for MediaType {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MediaType {
    type Error = EncodingError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<MediaType> for String {
    fn from(m: MediaType) -> Self {
        m.raw
    }
}

impl AsRef<str> for MediaType {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}
