//! Trust-list downloads.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::debug;

use crate::error::{PublishError, PublishResult};

const USER_AGENT_VALUE: &str = concat!("tir-publish/", env!("CARGO_PKG_VERSION"));

/// HTTP client shared by the trust-list sources.
pub fn http_client(timeout_secs: u64) -> PublishResult<reqwest::Client> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .default_headers(default_headers)
        .build()
        .map_err(|e| PublishError::Fetch {
            url: String::new(),
            message: format!("failed to create HTTP client: {}", e),
        })
}

/// GET `url`, failing on transport errors and non-success statuses.
pub async fn fetch_bytes(client: &reqwest::Client, url: &str) -> PublishResult<Vec<u8>> {
    debug!(url = %url, "fetching trust list");

    let fetch_err = |message: String| PublishError::Fetch {
        url: url.to_string(),
        message,
    };

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| fetch_err(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(fetch_err(format!("HTTP {}", status)));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| fetch_err(format!("failed to read response body: {}", e)))?;
    if body.is_empty() {
        return Err(fetch_err("empty response body".to_string()));
    }
    Ok(body.to_vec())
}
