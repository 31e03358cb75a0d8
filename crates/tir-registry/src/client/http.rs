//! HTTP layer: the only place status codes are interpreted.
//!
//! Every non-success status maps to [`FetchOutcome::Missing`]; transport
//! errors surface as [`RegistryError::Network`]. No retries.

use reqwest::StatusCode;
use tracing::debug;

use crate::error::{RegistryError, RegistryResult};

/// Outcome of a GET against the registry.
#[derive(Debug)]
pub(crate) enum FetchOutcome {
    /// 2xx with its body.
    Found(String),
    /// Any other status.
    Missing { status: StatusCode },
}

/// HTTP backend (reqwest client plus resolved base URL).
#[derive(Debug, Clone)]
pub(crate) struct HttpBackend {
    pub(crate) client: reqwest::Client,
    pub(crate) base_url: String,
}

impl HttpBackend {
    pub(crate) fn issuer_url(&self, aki: &str) -> String {
        format!("{}/issuers/x509_aki/{}.json", self.base_url, aki)
    }

    pub(crate) fn deprecation_notice_url(&self) -> String {
        format!("{}/deprecation_notice.json", self.base_url)
    }

    pub(crate) async fn fetch(&self, url: &str) -> RegistryResult<FetchOutcome> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            debug!(url = %url, status = status.as_u16(), "registry returned non-success");
            return Ok(FetchOutcome::Missing { status });
        }

        let body = response.text().await.map_err(|e| RegistryError::Network {
            message: format!("failed to read response body: {}", e),
        })?;
        Ok(FetchOutcome::Found(body))
    }
}
