//! Trusted issuer registry client.
//!
//! Resolves a certificate Authority Key Identifier (AKI) to a signed issuer
//! record, providing:
//!
//! - Public key algorithm resolution from SPKI OIDs
//! - DER to raw (IEEE P1363) ECDSA signature conversion
//! - Signature verification against a pinned certificate
//! - JCS canonicalization of records for signing
//! - A per-instance TTL cache with negative entries
//!
//! # Quick Start
//!
//! ```no_run
//! use tir_registry::{RegistryConfig, TrustedIssuerRegistry};
//!
//! # async fn example() -> Result<(), tir_registry::RegistryError> {
//! let registry = TrustedIssuerRegistry::new(RegistryConfig::default())?;
//!
//! if let Some(issuer) = registry.lookup("q2Ub4FbCkFPx3X9s5Ie-aN5gyfU").await {
//!     println!("{}", issuer.display.name);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `TIR_REGISTRY_URL` | Base URL (default: `https://cdn.jsdelivr.net/npm/trusted-issuer-registry@0.0`) |
//! | `TIR_REGISTRY_TEST_URL` | Test data base URL (default: `<url>/test`) |
//! | `TIR_USE_TEST_DATA` | Read test data |
//! | `TIR_CACHE_ENABLED` | Enable the lookup cache (default: true) |
//! | `TIR_CACHE_TTL_SECS` | Cache TTL in seconds (default: 86400) |
//! | `TIR_REGISTRY_TIMEOUT` | Request timeout in seconds (default: 30) |

pub mod aki;
pub mod algorithm;
pub mod cache;
pub mod canonicalize;
pub mod client;
pub mod error;
pub mod pem;
pub mod signature;
pub mod types;
pub mod verify;

// Re-export main types
pub use aki::{aki_from_hex, aki_from_issuer_id, aki_from_key_identifier, issuer_id, AkiError};
pub use algorithm::{
    resolve_algorithm, AlgorithmDescriptor, AlgorithmIdentifier, AlgorithmParameters,
    HashAlgorithm, NamedCurve, SignatureFamily,
};
pub use cache::{CacheEntry, CachedLookup, IssuerCache};
pub use canonicalize::{signing_payload, to_canonical_jcs_bytes, SIGNATURE_FIELD};
pub use client::TrustedIssuerRegistry;
pub use error::{CanonicalizeError, RegistryError, RegistryResult, VerifyError};
pub use pem::{der_to_pem, pem_to_der};
pub use signature::{der_to_raw, normalize_signature};
pub use types::{
    CertificateEntry, CertificateFormat, DeprecationNotice, DisplayInfo, EntityMetadata,
    IssuerRecord, RegistryConfig, DEFAULT_REGISTRY_URL, MINOR_VERSION, PINNED_ROOT_CERTIFICATE,
};
pub use verify::{
    check_record_signature, check_signature_with_pem, verify_record_signature,
    verify_signature_with_pem,
};
