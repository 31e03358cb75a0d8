//! Publishing side of the trusted issuer registry.
//!
//! - Trust-list adapters (Universal Verify JSON, AAMVA DTS VICAL)
//! - Per-AKI aggregation with trust-list provenance
//! - Reconciliation of `issuers/x509_aki/<aki>.json`
//! - Record signing and signature checks
//! - Deprecation notice authoring
//!
//! # Update
//!
//! ```no_run
//! use tir_publish::{update_issuers, PublishConfig, X509Inspector};
//!
//! # async fn example() -> Result<(), tir_publish::PublishError> {
//! let config = PublishConfig::from_env();
//! let report = update_issuers(&config, &X509Inspector).await?;
//! println!("{} issuers", report.issuers);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `TIR_ROOT` | Registry project root (default: `.`) |
//! | `TIR_UV_TRUST_LIST_URL` | Universal Verify trust list |
//! | `TIR_AAMVA_VICAL_URL` | AAMVA DTS VICAL |
//! | `TIR_FETCH_TIMEOUT` | Request timeout in seconds (default: 60) |

pub mod aggregate;
pub mod config;
pub mod deprecation;
pub mod error;
pub mod fetch;
pub mod inspect;
pub mod signing;
pub mod store;
pub mod trust_list;
pub mod update;

pub use aggregate::{add_certificate, ingest, ingest_certificates, IssuerMap, MergeOutcome};
pub use config::PublishConfig;
pub use deprecation::{add_deprecation_notice, add_deprecation_notice_at};
pub use error::{PublishError, PublishResult, SignatureFailure};
pub use inspect::{CertificateInfo, CertificateInspector, SubjectInfo, X509Inspector};
pub use signing::{check_signatures, sign_issuers, CheckSummary, RecordSigningKey, SignSummary};
pub use store::{IssuerStore, ReconcileSummary};
pub use trust_list::{AamvaVical, IngestStats, TrustListSource, UvTrustList};
pub use update::{update_from_sources, update_issuers, UpdateReport};
