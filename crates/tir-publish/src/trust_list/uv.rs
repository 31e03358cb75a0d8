//! Universal Verify JSON trust list.
//!
//! The list is a flat array of issuer records in the registry's own shape.
//! Only `issuer_id` and `certificates[].data` are read; the AKI used for
//! merging is always re-derived from the certificate itself.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tir_registry::aki_from_issuer_id;
use tracing::{info, warn};

use super::TrustListSource;
use crate::error::{PublishError, PublishResult};
use crate::fetch::fetch_bytes;

/// Provenance tag for the Universal Verify list.
pub const UV_SOURCE: &str = "uv";

/// Decode the UV trust list into PEM certificates.
pub fn parse_uv_trust_list(body: &[u8]) -> PublishResult<Vec<String>> {
    let list: JsonValue = serde_json::from_slice(body)
        .map_err(|e| PublishError::trust_list(UV_SOURCE, format!("invalid JSON: {e}")))?;
    let JsonValue::Array(issuers) = list else {
        return Err(PublishError::trust_list(UV_SOURCE, "Trust list is not an array"));
    };

    let mut pems = Vec::new();
    for issuer in &issuers {
        let Some(issuer_id) = issuer
            .get("issuer_id")
            .and_then(JsonValue::as_str)
            .filter(|id| aki_from_issuer_id(id).is_some())
        else {
            warn!(
                issuer_id = ?issuer.get("issuer_id"),
                "skipping issuer with invalid issuer_id format"
            );
            continue;
        };

        let certificates = issuer
            .get("certificates")
            .and_then(JsonValue::as_array)
            .filter(|certs| !certs.is_empty());
        let Some(certificates) = certificates else {
            warn!(issuer_id = %issuer_id, "skipping issuer without certificates");
            continue;
        };

        for cert in certificates {
            let data = cert.get("data").and_then(JsonValue::as_str).ok_or_else(|| {
                PublishError::trust_list(
                    UV_SOURCE,
                    format!("certificate of {issuer_id} has no PEM data"),
                )
            })?;
            pems.push(data.to_string());
        }
    }
    Ok(pems)
}

/// Universal Verify trust list fetched over HTTP.
#[derive(Debug, Clone)]
pub struct UvTrustList {
    client: reqwest::Client,
    url: String,
}

impl UvTrustList {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl TrustListSource for UvTrustList {
    fn name(&self) -> &str {
        UV_SOURCE
    }

    async fn certificates(&self) -> PublishResult<Vec<String>> {
        info!(url = %self.url, "fetching issuer data from Universal Verify trust list");
        let body = fetch_bytes(&self.client, &self.url).await?;
        parse_uv_trust_list(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_collects_pems_in_order() {
        let body = br#"[
            {"issuer_id": "x509_aki:AAA", "certificates": [{"data": "pem-1"}, {"data": "pem-2"}]},
            {"issuer_id": "x509_aki:BBB", "certificates": [{"data": "pem-3", "format": "pem"}]}
        ]"#;
        assert_eq!(
            parse_uv_trust_list(body).unwrap(),
            vec!["pem-1", "pem-2", "pem-3"]
        );
    }

    #[test]
    fn test_parse_skips_bad_issuer_ids_and_empty_issuers() {
        let body = br#"[
            {"issuer_id": "did:web:example", "certificates": [{"data": "skipped"}]},
            {"certificates": [{"data": "skipped"}]},
            {"issuer_id": "x509_aki:", "certificates": [{"data": "skipped"}]},
            {"issuer_id": "x509_aki:CCC", "certificates": []},
            {"issuer_id": "x509_aki:DDD"},
            {"issuer_id": "x509_aki:EEE", "certificates": [{"data": "kept"}]}
        ]"#;
        assert_eq!(parse_uv_trust_list(body).unwrap(), vec!["kept"]);
    }

    #[test]
    fn test_parse_rejects_non_array() {
        let err = parse_uv_trust_list(br#"{"issuers": []}"#).unwrap_err();
        assert!(err.to_string().contains("not an array"));
        assert!(parse_uv_trust_list(b"not json").is_err());
    }

    #[test]
    fn test_parse_rejects_certificate_without_data() {
        let body = br#"[{"issuer_id": "x509_aki:AAA", "certificates": [{"format": "pem"}]}]"#;
        assert!(matches!(
            parse_uv_trust_list(body),
            Err(PublishError::TrustList { .. })
        ));
    }
}
