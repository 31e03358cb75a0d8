//! Per-AKI merge of certificates from several trust lists.

use std::collections::BTreeMap;

use tir_registry::{
    issuer_id, CertificateEntry, CertificateFormat, DisplayInfo, EntityMetadata, IssuerRecord,
};
use tracing::{info, warn};

use crate::error::PublishResult;
use crate::inspect::{CertificateInfo, CertificateInspector, SubjectInfo};
use crate::trust_list::{IngestStats, TrustListSource};

const ENTITY_TYPE: &str = "government";
const REGION_PREFIX: &str = "US-";

/// Aggregated issuers keyed by AKI.
pub type IssuerMap = BTreeMap<String, IssuerRecord>;

/// What [`add_certificate`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// First certificate for this AKI; a record was created.
    NewIssuer,
    /// Record existed; the certificate was appended.
    NewCertificate,
    /// Identical PEM already present; only provenance may have changed.
    Duplicate,
}

/// Subdivision with the `US-` prefix removed, `None` when nothing is left.
pub fn region_from_state(state: Option<&str>) -> Option<String> {
    let state = state?;
    let region = state.strip_prefix(REGION_PREFIX).unwrap_or(state);
    (!region.is_empty()).then(|| region.to_string())
}

fn display_name(subject: &SubjectInfo) -> String {
    subject
        .organization
        .clone()
        .or_else(|| subject.common_name.clone())
        .unwrap_or_default()
}

fn certificate_entry(pem: &str, source: &str) -> CertificateEntry {
    CertificateEntry {
        data: pem.to_string(),
        format: CertificateFormat::Pem,
        trust_lists: vec![source.to_string()],
    }
}

fn new_record(cert: &CertificateInfo, source: &str) -> IssuerRecord {
    let region = region_from_state(cert.subject.state.as_deref());
    let government_level = if region.is_some() { "state" } else { "national" };
    let name = display_name(&cert.subject);

    IssuerRecord {
        issuer_id: issuer_id(&cert.aki),
        entity_type: ENTITY_TYPE.to_string(),
        entity_metadata: EntityMetadata {
            country: cert.subject.country.clone().unwrap_or_default(),
            region,
            government_level: government_level.to_string(),
            official_name: name.clone(),
        },
        display: DisplayInfo { name },
        certificates: vec![certificate_entry(&cert.pem, source)],
        signature: None,
        extra: Default::default(),
    }
}

/// Merge one certificate seen in `source` into `issuers`.
///
/// Metadata comes from whichever source first introduced the AKI and is
/// never overwritten.
pub fn add_certificate(issuers: &mut IssuerMap, cert: &CertificateInfo, source: &str) -> MergeOutcome {
    let Some(record) = issuers.get_mut(&cert.aki) else {
        issuers.insert(cert.aki.clone(), new_record(cert, source));
        return MergeOutcome::NewIssuer;
    };

    if let Some(entry) = record.certificates.iter_mut().find(|e| e.data == cert.pem) {
        if !entry.trust_lists.iter().any(|name| name == source) {
            entry.trust_lists.push(source.to_string());
        }
        return MergeOutcome::Duplicate;
    }

    record.certificates.push(certificate_entry(&cert.pem, source));
    MergeOutcome::NewCertificate
}

/// Inspect and merge already-decoded PEM certificates from `source`.
///
/// Certificates without CRL distribution points are counted and dropped.
pub fn ingest_certificates(
    issuers: &mut IssuerMap,
    source: &str,
    pems: &[String],
    inspector: &dyn CertificateInspector,
) -> PublishResult<IngestStats> {
    let mut stats = IngestStats::default();
    for pem in pems {
        let cert = inspector.inspect(pem)?;
        if cert.crl_missing {
            stats.missing_crl += 1;
            continue;
        }
        add_certificate(issuers, &cert, source);
        stats.ingested += 1;
    }

    if stats.missing_crl > 0 {
        warn!(
            source = source,
            missing_crl = stats.missing_crl,
            "certificate(s) have missing CRLs"
        );
    }
    info!(
        source = source,
        ingested = stats.ingested,
        "ingested certificates from trust list"
    );
    Ok(stats)
}

/// Fetch `source` and merge everything it lists.
pub async fn ingest(
    issuers: &mut IssuerMap,
    source: &dyn TrustListSource,
    inspector: &dyn CertificateInspector,
) -> PublishResult<IngestStats> {
    let pems = source.certificates().await?;
    ingest_certificates(issuers, source.name(), &pems, inspector)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PublishError;

    /// Inspector that reads a fixed table instead of parsing X.509.
    struct TableInspector(Vec<CertificateInfo>);

    impl CertificateInspector for TableInspector {
        fn inspect(&self, pem: &str) -> PublishResult<CertificateInfo> {
            self.0
                .iter()
                .find(|c| c.pem == pem)
                .cloned()
                .ok_or_else(|| PublishError::Certificate {
                    message: "Subject Key Identifier not found in certificate".to_string(),
                })
        }
    }

    fn cert(aki: &str, pem: &str, state: Option<&str>, org: Option<&str>) -> CertificateInfo {
        CertificateInfo {
            aki: aki.to_string(),
            subject: SubjectInfo {
                country: Some("US".to_string()),
                state: state.map(str::to_string),
                organization: org.map(str::to_string),
                common_name: Some("Issuing CA".to_string()),
                ..SubjectInfo::default()
            },
            pem: pem.to_string(),
            crl_missing: false,
        }
    }

    #[test]
    fn test_region_from_state() {
        assert_eq!(region_from_state(Some("US-CA")).as_deref(), Some("CA"));
        assert_eq!(region_from_state(Some("Ontario")).as_deref(), Some("Ontario"));
        assert_eq!(region_from_state(Some("US-")), None);
        assert_eq!(region_from_state(Some("")), None);
        assert_eq!(region_from_state(None), None);
    }

    #[test]
    fn test_new_issuer_metadata() {
        let mut issuers = IssuerMap::new();
        let outcome = add_certificate(
            &mut issuers,
            &cert("AKI1", "pem-a", Some("US-CA"), Some("California DMV")),
            "uv",
        );
        assert_eq!(outcome, MergeOutcome::NewIssuer);

        let record = &issuers["AKI1"];
        assert_eq!(record.issuer_id, "x509_aki:AKI1");
        assert_eq!(record.entity_type, "government");
        assert_eq!(record.entity_metadata.country, "US");
        assert_eq!(record.entity_metadata.region.as_deref(), Some("CA"));
        assert_eq!(record.entity_metadata.government_level, "state");
        assert_eq!(record.entity_metadata.official_name, "California DMV");
        assert_eq!(record.display.name, "California DMV");
        assert_eq!(record.certificates.len(), 1);
        assert_eq!(record.certificates[0].trust_lists, vec!["uv"]);
        assert!(record.signature.is_none());
    }

    #[test]
    fn test_national_issuer_falls_back_to_common_name() {
        let mut issuers = IssuerMap::new();
        add_certificate(&mut issuers, &cert("AKI2", "pem-b", None, None), "aamva_dts");

        let record = &issuers["AKI2"];
        assert_eq!(record.entity_metadata.region, None);
        assert_eq!(record.entity_metadata.government_level, "national");
        assert_eq!(record.display.name, "Issuing CA");
    }

    #[test]
    fn test_duplicate_pem_gains_provenance_once() {
        let mut issuers = IssuerMap::new();
        let c = cert("AKI1", "pem-a", Some("US-CA"), Some("California DMV"));

        add_certificate(&mut issuers, &c, "uv");
        assert_eq!(add_certificate(&mut issuers, &c, "aamva_dts"), MergeOutcome::Duplicate);
        assert_eq!(add_certificate(&mut issuers, &c, "aamva_dts"), MergeOutcome::Duplicate);

        let record = &issuers["AKI1"];
        assert_eq!(record.certificates.len(), 1);
        assert_eq!(record.certificates[0].trust_lists, vec!["uv", "aamva_dts"]);
    }

    #[test]
    fn test_new_pem_appends_without_touching_metadata() {
        let mut issuers = IssuerMap::new();
        add_certificate(
            &mut issuers,
            &cert("AKI1", "pem-a", Some("US-CA"), Some("California DMV")),
            "uv",
        );
        let outcome = add_certificate(
            &mut issuers,
            &cert("AKI1", "pem-renewed", Some("US-NV"), Some("Other Org")),
            "aamva_dts",
        );
        assert_eq!(outcome, MergeOutcome::NewCertificate);

        let record = &issuers["AKI1"];
        assert_eq!(record.display.name, "California DMV");
        assert_eq!(record.entity_metadata.region.as_deref(), Some("CA"));
        assert_eq!(record.certificates.len(), 2);
        assert_eq!(record.certificates[1].data, "pem-renewed");
        assert_eq!(record.certificates[1].trust_lists, vec!["aamva_dts"]);
    }

    #[test]
    fn test_ingest_drops_missing_crl_and_counts() {
        let mut no_crl = cert("AKI3", "pem-no-crl", None, Some("Org"));
        no_crl.crl_missing = true;
        let inspector = TableInspector(vec![
            cert("AKI1", "pem-a", Some("US-CA"), Some("California DMV")),
            no_crl,
        ]);

        let mut issuers = IssuerMap::new();
        let stats = ingest_certificates(
            &mut issuers,
            "uv",
            &["pem-a".to_string(), "pem-no-crl".to_string()],
            &inspector,
        )
        .unwrap();

        assert_eq!(
            stats,
            IngestStats {
                ingested: 1,
                missing_crl: 1
            }
        );
        assert!(issuers.contains_key("AKI1"));
        assert!(!issuers.contains_key("AKI3"));
    }

    #[test]
    fn test_ingest_aborts_on_uninspectable_certificate() {
        let inspector = TableInspector(Vec::new());
        let mut issuers = IssuerMap::new();
        let err = ingest_certificates(&mut issuers, "uv", &["???".to_string()], &inspector)
            .unwrap_err();
        assert!(err.to_string().contains("Subject Key Identifier"));
    }
}
