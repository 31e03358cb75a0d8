//! Error types for verification and the registry client.

/// Verification errors.
///
/// These never escape [`crate::verify::verify_signature_with_pem`]; they are
/// collapsed into `false` there and only surface through
/// [`crate::verify::check_signature_with_pem`] and the diagnostic log.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    /// Public key algorithm or EC curve OID is not in the resolver table.
    #[error("unsupported algorithm: {oid}")]
    UnsupportedAlgorithm { oid: String },

    /// Signature text or DER structure could not be decoded.
    #[error("malformed signature: {reason}")]
    MalformedSignature { reason: String },

    /// PEM armor, DER or X.509 structure could not be decoded.
    #[error("malformed certificate: {reason}")]
    MalformedCertificate { reason: String },

    /// Inputs decoded fine but the signature does not match the payload.
    #[error("signature verification failed: {reason}")]
    VerificationFailure { reason: String },
}

impl VerifyError {
    pub(crate) fn malformed_signature(reason: impl Into<String>) -> Self {
        Self::MalformedSignature {
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed_certificate(reason: impl Into<String>) -> Self {
        Self::MalformedCertificate {
            reason: reason.into(),
        }
    }

    pub(crate) fn verification_failure(reason: impl Into<String>) -> Self {
        Self::VerificationFailure {
            reason: reason.into(),
        }
    }
}

/// Canonicalization errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CanonicalizeError {
    /// The value to canonicalize was not a JSON object.
    #[error("expected a JSON object, got {kind}")]
    NotAnObject { kind: &'static str },

    /// JCS serialization failed.
    #[error("canonical serialization failed: {message}")]
    Serialize { message: String },
}

/// Registry errors.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Endpoint unreachable or answered with a non-success status.
    #[error("network error: {message}")]
    Network { message: String },

    /// Response body could not be parsed.
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl From<reqwest::Error> for RegistryError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network {
            message: err.to_string(),
        }
    }
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
