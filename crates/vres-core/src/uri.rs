//! Resource URIs and routing.
//!
//! A registry mints URIs of the form `<scheme>://<instance>/<id>`, where
//! `<instance>` is 8 hex chars and `<id>` is 32 hex chars. Consumers treat
//! them as opaque; a dispatcher uses [`Locator::parse`] to tell them apart
//! from real network URLs.

use crate::error::LocatorError;
use crate::types::{InstanceTag, ResourceId, INSTANCE_TAG_HEX_LEN, RESOURCE_ID_HEX_LEN};

/// Default URI scheme for registry-minted resources.
pub const DEFAULT_SCHEME: &str = "vres";

/// Render the URI for a resource.
pub fn format_uri(scheme: &str, instance: InstanceTag, id: ResourceId) -> String {
    format!("{}://{}/{}", scheme, instance, id)
}

/// Where a URI points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// A resource held by a registry using our scheme.
    Virtual { instance: InstanceTag, id: ResourceId },
    /// Anything else: a network URL or a foreign scheme, left untouched.
    External(String),
}

impl Locator {
    /// Classify `input` against a registry scheme.
    ///
    /// Scheme comparison is case-insensitive. A URI with our scheme that does
    /// not have the exact `//<instance>/<id>` shape is an error rather than
    /// an external URL, so typos never get routed to the network.
    pub fn parse(input: &str, scheme: &str) -> Result<Self, LocatorError> {
        let rest = match input.split_once(':') {
            Some((s, rest)) if s.eq_ignore_ascii_case(scheme) => rest,
            _ => return Ok(Locator::External(input.to_string())),
        };

        let malformed = |reason| LocatorError {
            uri: input.to_string(),
            reason,
        };

        let path = rest
            .strip_prefix("//")
            .ok_or_else(|| malformed("missing '//' after scheme"))?;
        let (instance, id) = path
            .split_once('/')
            .ok_or_else(|| malformed("missing resource id"))?;

        if instance.len() != INSTANCE_TAG_HEX_LEN {
            return Err(malformed("bad instance tag length"));
        }
        if id.len() != RESOURCE_ID_HEX_LEN {
            return Err(malformed("bad resource id length"));
        }

        let instance =
            InstanceTag::from_hex(instance).map_err(|_| malformed("instance tag is not hex"))?;
        let id = ResourceId::from_hex(id).map_err(|_| malformed("resource id is not hex"))?;

        Ok(Locator::Virtual { instance, id })
    }

    /// Whether this locator points into a registry.
    pub fn is_virtual(&self) -> bool {
        matches!(self, Locator::Virtual { .. })
    }
}
