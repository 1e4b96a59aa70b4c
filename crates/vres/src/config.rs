//! Registry configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use vres_core::{is_valid_scheme, Expiry, DEFAULT_SCHEME};
use vres_store::Limits;

use crate::error::{RegistryError, Result};

/// Configuration for a [`Registry`](crate::Registry).
///
/// Durations are written as integer milliseconds in serialized form:
///
/// ```json
/// { "scheme": "vres", "default_ttl": 60000, "max_entries": 1024 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// URI scheme for minted resources.
    pub scheme: String,
    /// TTL applied when a publish does not set one.
    #[serde(with = "millis::option")]
    pub default_ttl: Option<Duration>,
    /// Idle window applied when a publish does not set one.
    #[serde(with = "millis::option")]
    pub idle_timeout: Option<Duration>,
    /// Maximum number of live entries.
    pub max_entries: Option<usize>,
    /// Maximum total payload bytes.
    pub max_bytes: Option<usize>,
    /// How often the background sweeper runs.
    #[serde(with = "millis")]
    pub sweep_interval: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            scheme: DEFAULT_SCHEME.to_string(),
            default_ttl: None,
            idle_timeout: None,
            max_entries: None,
            max_bytes: None,
            sweep_interval: Duration::from_secs(30),
        }
    }
}

impl RegistryConfig {
    /// Parse and validate a JSON configuration document.
    ///
    /// Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| RegistryError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values the registry cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !is_valid_scheme(&self.scheme) {
            return Err(RegistryError::Config(format!(
                "invalid uri scheme {:?}",
                self.scheme
            )));
        }
        check_window("default_ttl", self.default_ttl).map_err(RegistryError::Config)?;
        check_window("idle_timeout", self.idle_timeout).map_err(RegistryError::Config)?;
        if self.max_entries == Some(0) {
            return Err(RegistryError::Config("max_entries must be positive".into()));
        }
        if self.sweep_interval.is_zero() {
            return Err(RegistryError::Config("sweep_interval must be positive".into()));
        }
        Ok(())
    }

    pub(crate) fn limits(&self) -> Limits {
        Limits {
            max_entries: self.max_entries,
            max_bytes: self.max_bytes,
        }
    }
}

/// Per-publish options.
///
/// Unset fields fall back to the registry's configured defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishOptions {
    pub ttl: Option<Duration>,
    pub idle_timeout: Option<Duration>,
}

impl PublishOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expire the entry this long after creation.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Expire the entry after this long without a resolve.
    pub fn idle_timeout(mut self, idle: Duration) -> Self {
        self.idle_timeout = Some(idle);
        self
    }

    /// Reject expiry windows shorter than the 1 ms clock resolution.
    pub fn validate(&self) -> Result<()> {
        check_window("ttl", self.ttl).map_err(RegistryError::InvalidOptions)?;
        check_window("idle_timeout", self.idle_timeout).map_err(RegistryError::InvalidOptions)
    }

    pub(crate) fn expiry(&self, config: &RegistryConfig) -> Expiry {
        Expiry {
            ttl: self.ttl.or(config.default_ttl),
            idle_timeout: self.idle_timeout.or(config.idle_timeout),
        }
    }
}

/// Entry timestamps have millisecond resolution; a shorter window would
/// expire an entry the moment it is published.
fn check_window(name: &str, window: Option<Duration>) -> std::result::Result<(), String> {
    match window {
        Some(d) if d < MIN_WINDOW => Err(format!("{} must be at least 1ms, got {:?}", name, d)),
        _ => Ok(()),
    }
}

const MIN_WINDOW: Duration = Duration::from_millis(1);

/// Serde helpers writing durations as integer milliseconds.
mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }

    pub mod option {
        use std::time::Duration;

        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(d: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
            match d {
                Some(d) => super::serialize(d, s),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
            Ok(Option::<u64>::deserialize(d)?.map(Duration::from_millis))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = RegistryConfig::default();
        config.validate().unwrap();
        assert_eq!(config.scheme, "vres");
        assert_eq!(config.limits(), Limits::UNBOUNDED);
    }

    #[test]
    fn test_from_json() {
        let config = RegistryConfig::from_json(
            r#"{"scheme": "geo-blob", "default_ttl": 60000, "max_bytes": 1048576}"#,
        )
        .unwrap();
        assert_eq!(config.scheme, "geo-blob");
        assert_eq!(config.default_ttl, Some(Duration::from_secs(60)));
        assert_eq!(config.idle_timeout, None);
        assert_eq!(config.max_bytes, Some(1 << 20));
        assert_eq!(config.sweep_interval, Duration::from_secs(30));
    }

    #[test]
    fn test_json_roundtrip_uses_millis() {
        let config = RegistryConfig {
            idle_timeout: Some(Duration::from_millis(250)),
            ..RegistryConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"idle_timeout\":250"));
        assert!(json.contains("\"sweep_interval\":30000"));
        assert_eq!(RegistryConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_configs() {
        for json in [
            r#"{"scheme": "not a scheme"}"#,
            r#"{"default_ttl": 0}"#,
            r#"{"idle_timeout": 0}"#,
            r#"{"max_entries": 0}"#,
            r#"{"sweep_interval": 0}"#,
            r#"{"unknown_field": true}"#,
            r#"not json"#,
        ] {
            assert!(
                matches!(RegistryConfig::from_json(json), Err(RegistryError::Config(_))),
                "{} should be rejected",
                json
            );
        }
    }

    #[test]
    fn test_sub_millisecond_windows_rejected() {
        let config = RegistryConfig {
            default_ttl: Some(Duration::from_micros(1)),
            ..RegistryConfig::default()
        };
        assert!(matches!(config.validate(), Err(RegistryError::Config(_))));

        let config = RegistryConfig {
            idle_timeout: Some(Duration::from_micros(999)),
            ..RegistryConfig::default()
        };
        assert!(matches!(config.validate(), Err(RegistryError::Config(_))));

        let config = RegistryConfig {
            default_ttl: Some(Duration::from_millis(1)),
            idle_timeout: Some(Duration::from_millis(1)),
            ..RegistryConfig::default()
        };
        config.validate().unwrap();
    }

    #[test]
    fn test_publish_options_validate() {
        PublishOptions::new().validate().unwrap();
        PublishOptions::new()
            .ttl(Duration::from_millis(1))
            .idle_timeout(Duration::from_secs(5))
            .validate()
            .unwrap();

        for bad in [
            PublishOptions::new().ttl(Duration::ZERO),
            PublishOptions::new().ttl(Duration::from_micros(500)),
            PublishOptions::new().idle_timeout(Duration::from_nanos(1)),
        ] {
            assert!(
                matches!(bad.validate(), Err(RegistryError::InvalidOptions(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_publish_options_override_defaults() {
        let config = RegistryConfig {
            default_ttl: Some(Duration::from_secs(60)),
            idle_timeout: Some(Duration::from_secs(5)),
            ..RegistryConfig::default()
        };

        let inherited = PublishOptions::new().expiry(&config);
        assert_eq!(inherited.ttl, Some(Duration::from_secs(60)));
        assert_eq!(inherited.idle_timeout, Some(Duration::from_secs(5)));

        let overridden = PublishOptions::new()
            .ttl(Duration::from_secs(1))
            .expiry(&config);
        assert_eq!(overridden.ttl, Some(Duration::from_secs(1)));
        assert_eq!(overridden.idle_timeout, Some(Duration::from_secs(5)));
    }
}
