//! Fetch every trust list, merge, and reconcile the issuer directory.

use tracing::info;

use crate::aggregate::{ingest, IssuerMap};
use crate::config::PublishConfig;
use crate::error::PublishResult;
use crate::fetch::http_client;
use crate::inspect::CertificateInspector;
use crate::store::{IssuerStore, ReconcileSummary};
use crate::trust_list::{AamvaVical, IngestStats, TrustListSource, UvTrustList};

/// Result of one update run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// Ingestion counts per source, in fetch order.
    pub sources: Vec<(String, IngestStats)>,
    /// Distinct issuers after merging.
    pub issuers: usize,
    pub reconcile: ReconcileSummary,
}

/// Ingest `sources` in order into one map, then reconcile `store`.
///
/// Any source failure aborts before the store is touched.
pub async fn update_from_sources(
    sources: &[&dyn TrustListSource],
    inspector: &dyn CertificateInspector,
    store: &IssuerStore,
) -> PublishResult<UpdateReport> {
    info!("starting issuer update");

    let mut issuers = IssuerMap::new();
    let mut report = UpdateReport::default();
    for source in sources {
        let stats = ingest(&mut issuers, *source, inspector).await?;
        report.sources.push((source.name().to_string(), stats));
    }

    report.issuers = issuers.len();
    info!(issuers = report.issuers, "total issuers collected from sources");

    report.reconcile = store.reconcile(&issuers).await?;
    Ok(report)
}

/// Update `issuers/x509_aki` from the UV list, then the AAMVA VICAL.
pub async fn update_issuers(
    config: &PublishConfig,
    inspector: &dyn CertificateInspector,
) -> PublishResult<UpdateReport> {
    let client = http_client(config.timeout_secs)?;
    let uv = UvTrustList::new(client.clone(), config.uv_url.clone());
    let aamva = AamvaVical::new(client, config.aamva_url.clone());
    let store = IssuerStore::new(config.issuer_dir());

    let sources: [&dyn TrustListSource; 2] = [&uv, &aamva];
    update_from_sources(&sources, inspector, &store).await
}
