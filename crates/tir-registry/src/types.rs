//! Registry data types and configuration.

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value as JsonValue};

/// Minor version of the published registry data this client reads.
pub const MINOR_VERSION: &str = "0.0";

/// Production registry base URL for [`MINOR_VERSION`].
pub const DEFAULT_REGISTRY_URL: &str =
    "https://cdn.jsdelivr.net/npm/trusted-issuer-registry@0.0";

/// Default cache TTL (24 hours), in milliseconds.
pub const DEFAULT_CACHE_TTL_MS: u64 = 24 * 60 * 60 * 1000;

/// Root certificate whose key signs every published issuer record.
pub const PINNED_ROOT_CERTIFICATE: &str = "-----BEGIN CERTIFICATE-----
MIIBnDCCAUGgAwIBAgIURT5mnI9WbENrqzrB0RYtXGuc0n8wCgYIKoZIzj0EAwIw
IzEhMB8GA1UEAwwYVW5pdmVyc2FsIFZlcmlmeSBSb290IENBMB4XDTI1MDcwNDEz
NTY0OVoXDTM1MDcwMjEzNTY0OVowIzEhMB8GA1UEAwwYVW5pdmVyc2FsIFZlcmlm
eSBSb290IENBMFkwEwYHKoZIzj0CAQYIKoZIzj0DAQcDQgAEsOasxJHsq+tmAy5L
Yz0KeT2UyGo1PqS0mr7Z5zn7Ai7vCEzea57QiQMQVYpiQGvkr3bS2T2l6xK7Oduj
MhUWs6NTMFEwHQYDVR0OBBYEFPJpi7yR7+yf44xcCfHDypGmlDosMB8GA1UdIwQY
MBaAFPJpi7yR7+yf44xcCfHDypGmlDosMA8GA1UdEwEB/wQFMAMBAf8wCgYIKoZI
zj0EAwIDSQAwRgIhAJvh/bVs8EXtzYWZm4ijR9J0+BwtqzCXJE4dDML4JafpAiEA
/7cvgi4SoK+Xn6WRfsgg9BNymAfJbejzDrQbLqHh4v8=
-----END CERTIFICATE-----";

/// Trusted issuer record as published under `issuers/x509_aki/<aki>.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerRecord {
    /// `x509_aki:<base64url AKI>`.
    pub issuer_id: String,

    /// Issuer category, e.g. `government`.
    pub entity_type: String,

    pub entity_metadata: EntityMetadata,

    pub display: DisplayInfo,

    pub certificates: Vec<CertificateEntry>,

    /// Base64 DER ECDSA signature over the canonical record without this field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,

    /// Signed fields this client has no typed slot for.
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// Who the issuer is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMetadata {
    /// ISO 3166-1 alpha-2 country code.
    pub country: String,

    /// Subdivision, without the country prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// `state` or `national`.
    pub government_level: String,

    pub official_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayInfo {
    pub name: String,
}

/// One certificate held by an issuer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateEntry {
    /// PEM text.
    pub data: String,

    pub format: CertificateFormat,

    /// Names of the trust lists this certificate was seen in.
    pub trust_lists: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CertificateFormat {
    Pem,
}

/// Published deprecation notice for a registry minor version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeprecationNotice {
    /// Unix epoch seconds after which the version is unsupported.
    ///
    /// Fractional values are truncated toward zero.
    #[serde(deserialize_with = "epoch_seconds")]
    pub end_of_life: i64,

    /// `MAJOR.MINOR` the notice was issued for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl DeprecationNotice {
    /// Whether this notice covers a client reading `minor_version`.
    ///
    /// A notice without a parseable version covers nobody. Otherwise it covers
    /// every client whose `MAJOR.MINOR` is not newer than the notice's.
    pub fn applies_to(&self, minor_version: &str) -> bool {
        let Some(notice) = self.version.as_deref().and_then(parse_major_minor) else {
            return false;
        };
        let Some(client) = parse_major_minor(minor_version) else {
            return false;
        };
        client <= notice
    }

    /// `end_of_life` as a timestamp.
    pub fn end_of_life_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.end_of_life, 0).single()
    }
}

fn epoch_seconds<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let number = Number::deserialize(deserializer)?;
    if let Some(seconds) = number.as_i64() {
        return Ok(seconds);
    }
    match number.as_f64() {
        Some(seconds) if seconds.is_finite() && seconds.abs() < i64::MAX as f64 => {
            Ok(seconds.trunc() as i64)
        }
        _ => Err(D::Error::custom(format!("end_of_life out of range: {number}"))),
    }
}

fn parse_major_minor(version: &str) -> Option<(u64, u64)> {
    let mut parts = version.trim().split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    Some((major, minor))
}

/// Registry client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Base URL for published records.
    #[serde(default = "default_registry_url")]
    pub url: String,

    /// Base URL for test records. Defaults to `<url>/test`.
    #[serde(default)]
    pub test_url: Option<String>,

    /// Read from the test data set instead of production.
    #[serde(default)]
    pub use_test_data: bool,

    /// Enable the lookup cache.
    #[serde(default = "default_cache_enabled")]
    pub cache_enabled: bool,

    /// Cache TTL in milliseconds.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_ms: u64,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// PEM certificate used to verify record signatures.
    #[serde(default = "default_pinned_certificate")]
    pub pinned_certificate: String,
}

fn default_registry_url() -> String {
    DEFAULT_REGISTRY_URL.to_string()
}

fn default_cache_enabled() -> bool {
    true
}

fn default_cache_ttl() -> u64 {
    DEFAULT_CACHE_TTL_MS
}

fn default_timeout() -> u64 {
    30
}

fn default_pinned_certificate() -> String {
    PINNED_ROOT_CERTIFICATE.to_string()
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: default_registry_url(),
            test_url: None,
            use_test_data: false,
            cache_enabled: default_cache_enabled(),
            cache_ttl_ms: default_cache_ttl(),
            timeout_secs: default_timeout(),
            pinned_certificate: default_pinned_certificate(),
        }
    }
}

impl RegistryConfig {
    /// Create config from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `TIR_REGISTRY_URL` | Production base URL |
    /// | `TIR_REGISTRY_TEST_URL` | Test data base URL |
    /// | `TIR_USE_TEST_DATA` | Read test data (`1`/`true`) |
    /// | `TIR_CACHE_ENABLED` | Enable the lookup cache (default: true) |
    /// | `TIR_CACHE_TTL_SECS` | Cache TTL (default: 86400) |
    /// | `TIR_REGISTRY_TIMEOUT` | Request timeout in seconds (default: 30) |
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("TIR_REGISTRY_URL").unwrap_or_else(|_| default_registry_url()),
            test_url: std::env::var("TIR_REGISTRY_TEST_URL").ok(),
            use_test_data: env_flag("TIR_USE_TEST_DATA").unwrap_or(false),
            cache_enabled: env_flag("TIR_CACHE_ENABLED").unwrap_or_else(default_cache_enabled),
            cache_ttl_ms: std::env::var("TIR_CACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .map(|secs| secs.saturating_mul(1000))
                .unwrap_or_else(default_cache_ttl),
            timeout_secs: std::env::var("TIR_REGISTRY_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_timeout),
            pinned_certificate: default_pinned_certificate(),
        }
    }

    /// Base URL records are read from, honoring `use_test_data`.
    pub fn base_url(&self) -> String {
        let base = if self.use_test_data {
            self.test_url
                .clone()
                .unwrap_or_else(|| format!("{}/test", self.url.trim_end_matches('/')))
        } else {
            self.url.clone()
        };
        base.trim_end_matches('/').to_string()
    }

    /// Set the production base URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the test data base URL.
    pub fn with_test_url(mut self, url: impl Into<String>) -> Self {
        self.test_url = Some(url.into());
        self
    }

    /// Read from the test data set.
    pub fn with_test_data(mut self, enabled: bool) -> Self {
        self.use_test_data = enabled;
        self
    }

    /// Enable or disable the cache.
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    /// Cache TTL as a duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    /// Set the cache TTL, kept to millisecond precision.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the request timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Pin a different verification certificate.
    pub fn with_pinned_certificate(mut self, pem: impl Into<String>) -> Self {
        self.pinned_certificate = pem.into();
        self
    }
}
