//! Trusted issuer registry client.
//!
//! Public API: no status code knowledge. All HTTP/status mapping in http.rs.
//!
//! Lookup outcomes per AKI:
//!
//! | Response | Returned | Cached |
//! |----------|----------|--------|
//! | 2xx, signature verifies | record | yes, positive |
//! | 2xx, bad JSON or signature | `None` | no |
//! | non-2xx or transport error | `None` | yes, negative |

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

use crate::cache::IssuerCache;
use crate::error::{RegistryError, RegistryResult};
use crate::pem::pem_to_der;
use crate::types::{DeprecationNotice, IssuerRecord, RegistryConfig, MINOR_VERSION};
use crate::verify::verify_record_signature;

mod http;

use http::{FetchOutcome, HttpBackend};

const USER_AGENT_VALUE: &str = concat!("tir-registry/", env!("CARGO_PKG_VERSION"));

/// Resolves AKIs to signed issuer records.
///
/// Owns its cache and pinned certificate; separate instances (for example
/// production and test data) never share state.
#[derive(Debug, Clone)]
pub struct TrustedIssuerRegistry {
    http: HttpBackend,
    cache: IssuerCache,
    cache_enabled: bool,
    pinned_certificate: String,
}

impl TrustedIssuerRegistry {
    pub fn new(config: RegistryConfig) -> RegistryResult<Self> {
        pem_to_der(&config.pinned_certificate).map_err(|e| RegistryError::Config {
            message: format!("pinned certificate: {}", e),
        })?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(default_headers)
            .build()
            .map_err(|e| RegistryError::Network {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http: HttpBackend {
                client,
                base_url: config.base_url(),
            },
            cache: IssuerCache::new(config.cache_ttl()),
            cache_enabled: config.cache_enabled,
            pinned_certificate: config.pinned_certificate,
        })
    }

    pub fn from_env() -> RegistryResult<Self> {
        Self::new(RegistryConfig::from_env())
    }

    /// Registry data version this client reads.
    pub fn minor_version() -> &'static str {
        MINOR_VERSION
    }

    /// Base URL requests go to.
    pub fn base_url(&self) -> &str {
        &self.http.base_url
    }

    /// Look up the issuer for an AKI.
    ///
    /// Returns a verified record or `None`. Callers cannot tell "unknown" from
    /// "published but invalid"; the reason is logged.
    pub async fn lookup(&self, aki: &str) -> Option<IssuerRecord> {
        if self.cache_enabled {
            if let Some(hit) = self.cache.get(aki).await {
                debug!(aki = %aki, "issuer cache hit");
                return hit.into_record();
            }
        }

        let url = self.http.issuer_url(aki);
        debug!(url = %url, "fetching issuer record");

        let body = match self.http.fetch(&url).await {
            Ok(FetchOutcome::Found(body)) => body,
            Ok(FetchOutcome::Missing { status }) => {
                debug!(aki = %aki, status = status.as_u16(), "issuer not found");
                self.remember_not_found(aki).await;
                return None;
            }
            Err(e) => {
                warn!(aki = %aki, error = %e, "issuer fetch failed");
                self.remember_not_found(aki).await;
                return None;
            }
        };

        let record = self.verify_body(aki, &body)?;

        if self.cache_enabled {
            self.cache.put_found(aki, record.clone()).await;
        }
        Some(record)
    }

    /// End-of-life date announced for this client's registry version.
    ///
    /// `Ok(None)` when no notice is published or the notice targets an older
    /// version. Never cached.
    pub async fn end_of_life(&self) -> RegistryResult<Option<DateTime<Utc>>> {
        let url = self.http.deprecation_notice_url();
        debug!(url = %url, "fetching deprecation notice");

        let body = match self.http.fetch(&url).await? {
            FetchOutcome::Found(body) => body,
            FetchOutcome::Missing { .. } => return Ok(None),
        };

        let notice: DeprecationNotice =
            serde_json::from_str(&body).map_err(|e| RegistryError::InvalidResponse {
                message: format!("failed to parse deprecation notice: {}", e),
            })?;

        if !notice.applies_to(MINOR_VERSION) {
            debug!(version = ?notice.version, "deprecation notice does not apply");
            return Ok(None);
        }

        let end_of_life = notice
            .end_of_life_at()
            .ok_or_else(|| RegistryError::InvalidResponse {
                message: format!("end_of_life out of range: {}", notice.end_of_life),
            })?;
        info!(end_of_life = %end_of_life, "registry version is deprecated");
        Ok(Some(end_of_life))
    }

    /// Parse and verify a fetched record. Failures are not cached.
    fn verify_body(&self, aki: &str, body: &str) -> Option<IssuerRecord> {
        let value: JsonValue = match serde_json::from_str(body) {
            Ok(value) => value,
            Err(e) => {
                warn!(aki = %aki, error = %e, "issuer record is not valid JSON");
                return None;
            }
        };

        if !verify_record_signature(&self.pinned_certificate, &value) {
            return None;
        }

        match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(aki = %aki, error = %e, "signed issuer record has an unexpected shape");
                None
            }
        }
    }

    async fn remember_not_found(&self, aki: &str) {
        if self.cache_enabled {
            self.cache.put_not_found(aki).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_unusable_pinned_certificate() {
        let config = RegistryConfig::default().with_pinned_certificate("not a certificate");
        assert!(matches!(
            TrustedIssuerRegistry::new(config),
            Err(RegistryError::Config { .. })
        ));
    }

    #[test]
    fn test_base_url_follows_test_data_flag() {
        let prod = TrustedIssuerRegistry::new(RegistryConfig::default()).unwrap();
        let test =
            TrustedIssuerRegistry::new(RegistryConfig::default().with_test_data(true)).unwrap();
        assert_eq!(
            prod.base_url(),
            "https://cdn.jsdelivr.net/npm/trusted-issuer-registry@0.0"
        );
        assert_eq!(
            test.base_url(),
            "https://cdn.jsdelivr.net/npm/trusted-issuer-registry@0.0/test"
        );
        assert_eq!(TrustedIssuerRegistry::minor_version(), "0.0");
    }
}
