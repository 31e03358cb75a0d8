//! Public key algorithm resolution.
//!
//! Maps the algorithm identifier of a SubjectPublicKeyInfo to the signature
//! scheme used to verify issuer records. Both lookups are table driven: a new
//! key type or curve is one row in [`KEY_ALGORITHMS`] or [`NAMED_CURVES`].

use std::fmt;

use crate::error::VerifyError;

/// id-ecPublicKey (RFC 5480).
pub const OID_EC_PUBLIC_KEY: &str = "1.2.840.10045.2.1";
/// rsaEncryption (RFC 8017).
pub const OID_RSA_ENCRYPTION: &str = "1.2.840.113549.1.1.1";
/// id-RSASSA-PSS (RFC 8017).
pub const OID_RSASSA_PSS: &str = "1.2.840.113549.1.1.10";
/// secp256r1 / prime256v1.
pub const OID_SECP256R1: &str = "1.2.840.10045.3.1.7";
/// secp384r1.
pub const OID_SECP384R1: &str = "1.3.132.0.34";
/// secp521r1.
pub const OID_SECP521R1: &str = "1.3.132.0.35";

/// Signature scheme family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureFamily {
    Ecdsa,
    RsassaPkcs1v15,
    RsaPss,
}

impl SignatureFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ecdsa => "ECDSA",
            Self::RsassaPkcs1v15 => "RSASSA-PKCS1-v1_5",
            Self::RsaPss => "RSA-PSS",
        }
    }
}

/// Message digest applied before signing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "SHA-256",
            Self::Sha384 => "SHA-384",
            Self::Sha512 => "SHA-512",
        }
    }
}

/// NIST named curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedCurve {
    P256,
    P384,
    P521,
}

impl NamedCurve {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::P256 => "P-256",
            Self::P384 => "P-384",
            Self::P521 => "P-521",
        }
    }

    /// Hash paired with the curve.
    pub fn hash(&self) -> HashAlgorithm {
        match self {
            Self::P256 => HashAlgorithm::Sha256,
            Self::P384 => HashAlgorithm::Sha384,
            Self::P521 => HashAlgorithm::Sha512,
        }
    }

    /// Byte width of each of `r` and `s` in a raw (IEEE P1363) signature.
    pub fn signature_half_len(&self) -> usize {
        match self {
            Self::P256 => 32,
            Self::P384 => 48,
            Self::P521 => 66,
        }
    }
}

/// Concrete verification algorithm for a public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AlgorithmDescriptor {
    pub family: SignatureFamily,
    pub hash: HashAlgorithm,
    /// Present for ECDSA only.
    pub curve: Option<NamedCurve>,
}

impl AlgorithmDescriptor {
    pub const fn ecdsa(curve: NamedCurve) -> Self {
        let hash = match curve {
            NamedCurve::P256 => HashAlgorithm::Sha256,
            NamedCurve::P384 => HashAlgorithm::Sha384,
            NamedCurve::P521 => HashAlgorithm::Sha512,
        };
        Self {
            family: SignatureFamily::Ecdsa,
            hash,
            curve: Some(curve),
        }
    }

    /// RSA keys do not carry a hash; SHA-256 is used for both RSA families.
    pub const fn rsa(family: SignatureFamily) -> Self {
        Self {
            family,
            hash: HashAlgorithm::Sha256,
            curve: None,
        }
    }

    /// Raw signature half-length for ECDSA, `None` otherwise.
    pub fn signature_half_len(&self) -> Option<usize> {
        self.curve.map(|c| c.signature_half_len())
    }
}

impl fmt::Display for AlgorithmDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.curve {
            Some(curve) => write!(
                f,
                "{}/{}/{}",
                self.family.as_str(),
                curve.as_str(),
                self.hash.as_str()
            ),
            None => write!(f, "{}/{}", self.family.as_str(), self.hash.as_str()),
        }
    }
}

/// Algorithm parameters as found in the SPKI `AlgorithmIdentifier`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlgorithmParameters {
    /// Parameters field omitted.
    Absent,
    /// Explicit ASN.1 NULL (the usual RSA encoding).
    Null,
    /// An OBJECT IDENTIFIER, i.e. an EC named curve.
    NamedCurve(String),
    /// Anything else (explicit EC domain parameters, PSS parameter sequences).
    Other,
}

/// Decoded public key algorithm identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmIdentifier {
    pub oid: String,
    pub parameters: AlgorithmParameters,
}

impl AlgorithmIdentifier {
    pub fn new(oid: impl Into<String>, parameters: AlgorithmParameters) -> Self {
        Self {
            oid: oid.into(),
            parameters,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum KeyAlgorithm {
    /// Descriptor depends on the named curve parameter.
    EllipticCurve,
    Fixed(AlgorithmDescriptor),
}

const KEY_ALGORITHMS: &[(&str, KeyAlgorithm)] = &[
    (OID_EC_PUBLIC_KEY, KeyAlgorithm::EllipticCurve),
    (
        OID_RSA_ENCRYPTION,
        KeyAlgorithm::Fixed(AlgorithmDescriptor::rsa(SignatureFamily::RsassaPkcs1v15)),
    ),
    (
        OID_RSASSA_PSS,
        KeyAlgorithm::Fixed(AlgorithmDescriptor::rsa(SignatureFamily::RsaPss)),
    ),
];

const NAMED_CURVES: &[(&str, NamedCurve)] = &[
    (OID_SECP256R1, NamedCurve::P256),
    (OID_SECP384R1, NamedCurve::P384),
    (OID_SECP521R1, NamedCurve::P521),
];

/// Curve assumed when an EC key omits its parameters.
const DEFAULT_CURVE: NamedCurve = NamedCurve::P256;

/// Resolve a public key algorithm identifier to a verification algorithm.
pub fn resolve_algorithm(id: &AlgorithmIdentifier) -> Result<AlgorithmDescriptor, VerifyError> {
    let kind = KEY_ALGORITHMS
        .iter()
        .find(|(oid, _)| *oid == id.oid)
        .map(|(_, kind)| *kind)
        .ok_or_else(|| VerifyError::UnsupportedAlgorithm {
            oid: id.oid.clone(),
        })?;

    match kind {
        KeyAlgorithm::Fixed(descriptor) => Ok(descriptor),
        KeyAlgorithm::EllipticCurve => {
            let curve = match &id.parameters {
                AlgorithmParameters::Absent | AlgorithmParameters::Null => DEFAULT_CURVE,
                AlgorithmParameters::NamedCurve(curve_oid) => resolve_curve(curve_oid)?,
                AlgorithmParameters::Other => {
                    return Err(VerifyError::UnsupportedAlgorithm {
                        oid: format!("{} (explicit curve parameters)", id.oid),
                    })
                }
            };
            Ok(AlgorithmDescriptor::ecdsa(curve))
        }
    }
}

fn resolve_curve(curve_oid: &str) -> Result<NamedCurve, VerifyError> {
    NAMED_CURVES
        .iter()
        .find(|(oid, _)| *oid == curve_oid)
        .map(|(_, curve)| *curve)
        .ok_or_else(|| VerifyError::UnsupportedAlgorithm {
            oid: curve_oid.to_string(),
        })
}
