//! Certificate metadata extraction.

use tir_registry::{aki_from_key_identifier, pem_to_der};
use x509_parser::certificate::X509Certificate;
use x509_parser::extensions::ParsedExtension;
use x509_parser::x509::{AttributeTypeAndValue, X509Name};

use crate::error::{PublishError, PublishResult};

/// Subject attributes used to build issuer metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectInfo {
    pub country: Option<String>,
    pub state: Option<String>,
    pub locality: Option<String>,
    pub organization: Option<String>,
    pub organizational_unit: Option<String>,
    pub common_name: Option<String>,
}

/// What aggregation needs to know about one certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateInfo {
    /// URL-safe base64 of the Subject Key Identifier.
    pub aki: String,
    pub subject: SubjectInfo,
    /// PEM text as received.
    pub pem: String,
    /// No CRL Distribution Points extension.
    pub crl_missing: bool,
}

/// Extracts [`CertificateInfo`] from PEM text.
pub trait CertificateInspector: Send + Sync {
    fn inspect(&self, pem: &str) -> PublishResult<CertificateInfo>;
}

/// [`CertificateInspector`] backed by `x509-parser`.
#[derive(Debug, Clone, Copy, Default)]
pub struct X509Inspector;

impl CertificateInspector for X509Inspector {
    fn inspect(&self, pem: &str) -> PublishResult<CertificateInfo> {
        let der = pem_to_der(pem).map_err(|e| PublishError::Certificate {
            message: e.to_string(),
        })?;
        let (_, cert) =
            x509_parser::parse_x509_certificate(&der).map_err(|e| PublishError::Certificate {
                message: format!("invalid X.509: {e}"),
            })?;

        let key_id = subject_key_identifier(&cert).ok_or_else(|| PublishError::Certificate {
            message: "Subject Key Identifier not found in certificate".to_string(),
        })?;

        Ok(CertificateInfo {
            aki: aki_from_key_identifier(key_id),
            subject: subject_info(cert.subject()),
            pem: pem.to_string(),
            crl_missing: !has_crl_distribution_points(&cert),
        })
    }
}

fn subject_key_identifier<'a>(cert: &'a X509Certificate<'_>) -> Option<&'a [u8]> {
    cert.extensions()
        .iter()
        .find_map(|ext| match ext.parsed_extension() {
            ParsedExtension::SubjectKeyIdentifier(key_id) => Some(key_id.0),
            _ => None,
        })
}

fn has_crl_distribution_points(cert: &X509Certificate<'_>) -> bool {
    cert.extensions()
        .iter()
        .any(|ext| matches!(ext.parsed_extension(), ParsedExtension::CRLDistributionPoints(_)))
}

fn subject_info(name: &X509Name<'_>) -> SubjectInfo {
    fn first<'s, 'a: 's>(
        mut attrs: impl Iterator<Item = &'s AttributeTypeAndValue<'a>>,
    ) -> Option<String> {
        attrs
            .find_map(|attr| attr.as_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }

    SubjectInfo {
        country: first(name.iter_country()),
        state: first(name.iter_state_or_province()),
        locality: first(name.iter_locality()),
        organization: first(name.iter_organization()),
        organizational_unit: first(name.iter_organizational_unit()),
        common_name: first(name.iter_common_name()),
    }
}
