//! External trust-list sources.
//!
//! Each source yields the PEM certificates it lists; metadata extraction and
//! merging happen in [`crate::aggregate`].

use async_trait::async_trait;

use crate::error::PublishResult;

pub mod uv;
pub mod vical;

pub use uv::{parse_uv_trust_list, UvTrustList, UV_SOURCE};
pub use vical::{parse_vical, AamvaVical, AAMVA_SOURCE};

/// A trust list certificates are ingested from.
#[async_trait]
pub trait TrustListSource: Send + Sync {
    /// Provenance tag written into `trust_lists`.
    fn name(&self) -> &str;

    /// Fetch and decode the list into PEM certificates.
    async fn certificates(&self) -> PublishResult<Vec<String>>;
}

/// Per-source ingestion counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Certificates merged into the issuer map.
    pub ingested: usize,
    /// Certificates dropped for lacking CRL distribution points.
    pub missing_crl: usize,
}
