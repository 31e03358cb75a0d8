//! Publisher configuration and project layout.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Universal Verify trust list.
pub const DEFAULT_UV_TRUST_LIST_URL: &str =
    "https://cdn.jsdelivr.net/npm/@universal-verify/trust-list@0.1/trust-list.json";

/// AAMVA Digital Trust Service VICAL.
pub const DEFAULT_AAMVA_VICAL_URL: &str = "https://vical.dts.aamva.org/vical/vc";

pub const DEPRECATION_NOTICE_FILE: &str = "deprecation_notice.json";

/// Publisher configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Registry project root (holds `issuers/` and `test/issuers/`).
    #[serde(default = "default_root")]
    pub root: PathBuf,

    #[serde(default = "default_uv_url")]
    pub uv_url: String,

    #[serde(default = "default_aamva_url")]
    pub aamva_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_uv_url() -> String {
    DEFAULT_UV_TRUST_LIST_URL.to_string()
}

fn default_aamva_url() -> String {
    DEFAULT_AAMVA_VICAL_URL.to_string()
}

fn default_timeout() -> u64 {
    60
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            uv_url: default_uv_url(),
            aamva_url: default_aamva_url(),
            timeout_secs: default_timeout(),
        }
    }
}

impl PublishConfig {
    /// Create config from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `TIR_ROOT` | Project root |
    /// | `TIR_UV_TRUST_LIST_URL` | UV trust list URL |
    /// | `TIR_AAMVA_VICAL_URL` | AAMVA VICAL URL |
    /// | `TIR_FETCH_TIMEOUT` | Request timeout in seconds (default: 60) |
    pub fn from_env() -> Self {
        Self {
            root: std::env::var("TIR_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_root()),
            uv_url: std::env::var("TIR_UV_TRUST_LIST_URL").unwrap_or_else(|_| default_uv_url()),
            aamva_url: std::env::var("TIR_AAMVA_VICAL_URL")
                .unwrap_or_else(|_| default_aamva_url()),
            timeout_secs: std::env::var("TIR_FETCH_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_timeout),
        }
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_uv_url(mut self, url: impl Into<String>) -> Self {
        self.uv_url = url.into();
        self
    }

    pub fn with_aamva_url(mut self, url: impl Into<String>) -> Self {
        self.aamva_url = url.into();
        self
    }

    /// `<root>/issuers/x509_aki`, the directory reconciled by updates.
    pub fn issuer_dir(&self) -> PathBuf {
        issuer_dir(&self.root)
    }

    /// Directories walked by signing and signature checks.
    pub fn signed_roots(&self) -> Vec<PathBuf> {
        signed_roots(&self.root)
    }

    pub fn deprecation_notice_path(&self) -> PathBuf {
        self.root.join(DEPRECATION_NOTICE_FILE)
    }
}

pub fn issuer_dir(root: &Path) -> PathBuf {
    root.join("issuers").join("x509_aki")
}

/// `<root>/issuers` and `<root>/test/issuers`.
pub fn signed_roots(root: &Path) -> Vec<PathBuf> {
    vec![root.join("issuers"), root.join("test").join("issuers")]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let config = PublishConfig::default().with_root("/srv/registry");
        assert_eq!(
            config.issuer_dir(),
            PathBuf::from("/srv/registry/issuers/x509_aki")
        );
        assert_eq!(
            config.signed_roots(),
            vec![
                PathBuf::from("/srv/registry/issuers"),
                PathBuf::from("/srv/registry/test/issuers")
            ]
        );
        assert_eq!(
            config.deprecation_notice_path(),
            PathBuf::from("/srv/registry/deprecation_notice.json")
        );
    }
}
