//! Certificate-based signature verification.
//!
//! [`verify_signature_with_pem`] is the boundary used by the registry and the
//! publishing tools: it never returns an error, every failure becomes `false`
//! plus a `warn!` event. [`check_signature_with_pem`] exposes the same steps
//! with the typed [`VerifyError`] for callers that want the reason.
//!
//! Steps:
//!
//! 1. Strip PEM armor and whitespace, decode to DER
//! 2. Parse the X.509 certificate and take its SubjectPublicKeyInfo
//! 3. Resolve the key algorithm ([`resolve_algorithm`])
//! 4. Normalize the signature ([`normalize_signature`])
//! 5. Verify with the primitive for the resolved algorithm

use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::pkcs8::DecodePublicKey;
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::sha2::Sha256;
use rsa::signature::Verifier;
use rsa::{pkcs1v15, pss, RsaPublicKey};
use serde_json::Value as JsonValue;
use tracing::{debug, warn};
use x509_parser::der_parser::asn1_rs::Tag;
use x509_parser::prelude::FromDer;
use x509_parser::x509::SubjectPublicKeyInfo;

use crate::algorithm::{
    resolve_algorithm, AlgorithmDescriptor, AlgorithmIdentifier, AlgorithmParameters,
    NamedCurve, SignatureFamily,
};
use crate::canonicalize::{record_signature, signing_payload};
use crate::error::VerifyError;
use crate::pem::pem_to_der;
use crate::signature::normalize_signature;

/// Verify `signature` (base64) over `payload` with the key of a PEM certificate.
///
/// Returns `false` on any failure and logs the reason.
pub fn verify_signature_with_pem(certificate_pem: &str, signature: &str, payload: &[u8]) -> bool {
    match check_signature_with_pem(certificate_pem, signature, payload) {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "signature verification failed");
            false
        }
    }
}

/// Verify `signature` over `payload`, reporting why it failed.
pub fn check_signature_with_pem(
    certificate_pem: &str,
    signature: &str,
    payload: &[u8],
) -> Result<(), VerifyError> {
    let der = pem_to_der(certificate_pem)?;
    let (_, cert) = x509_parser::parse_x509_certificate(&der)
        .map_err(|e| VerifyError::malformed_certificate(format!("invalid X.509: {e}")))?;
    check_signature_with_spki(cert.public_key(), signature, payload)
}

/// Verify `signature` over `payload` with a bare DER SubjectPublicKeyInfo.
pub fn check_signature_with_spki_der(
    spki_der: &[u8],
    signature: &str,
    payload: &[u8],
) -> Result<(), VerifyError> {
    let (_, spki) = SubjectPublicKeyInfo::from_der(spki_der)
        .map_err(|e| VerifyError::malformed_certificate(format!("invalid SPKI: {e}")))?;
    check_signature_with_spki(&spki, signature, payload)
}

fn check_signature_with_spki(
    spki: &SubjectPublicKeyInfo<'_>,
    signature: &str,
    payload: &[u8],
) -> Result<(), VerifyError> {
    let algorithm = algorithm_identifier_from_spki(spki)?;
    let descriptor = resolve_algorithm(&algorithm)?;
    debug!(algorithm = %descriptor, "resolved key algorithm");

    let raw_signature = normalize_signature(&descriptor, signature)?;
    verify_with_spki(&descriptor, spki, &raw_signature, payload)
}

/// Check the detached signature of an issuer record.
///
/// The payload is the record's canonical form without `signature`.
pub fn check_record_signature(certificate_pem: &str, record: &JsonValue) -> Result<(), VerifyError> {
    let signature = record_signature(record)
        .ok_or_else(|| VerifyError::malformed_signature("record has no signature"))?;
    let payload = signing_payload(record)
        .map_err(|e| VerifyError::malformed_signature(format!("cannot canonicalize record: {e}")))?;
    check_signature_with_pem(certificate_pem, signature, &payload)
}

/// [`check_record_signature`] collapsed to a bool, logging the reason.
pub fn verify_record_signature(certificate_pem: &str, record: &JsonValue) -> bool {
    match check_record_signature(certificate_pem, record) {
        Ok(()) => true,
        Err(e) => {
            warn!(
                issuer_id = record.get("issuer_id").and_then(JsonValue::as_str).unwrap_or(""),
                error = %e,
                "issuer record signature verification failed"
            );
            false
        }
    }
}

/// Build the closed algorithm identifier from a decoded SPKI.
pub fn algorithm_identifier_from_spki(
    spki: &SubjectPublicKeyInfo<'_>,
) -> Result<AlgorithmIdentifier, VerifyError> {
    let oid = spki.algorithm.algorithm.to_id_string();
    let parameters = match &spki.algorithm.parameters {
        None => AlgorithmParameters::Absent,
        Some(any) if any.tag() == Tag::Null => AlgorithmParameters::Null,
        Some(any) => match any.as_oid() {
            Ok(curve) => AlgorithmParameters::NamedCurve(curve.to_id_string()),
            Err(_) => AlgorithmParameters::Other,
        },
    };
    Ok(AlgorithmIdentifier::new(oid, parameters))
}

fn verify_with_spki(
    descriptor: &AlgorithmDescriptor,
    spki: &SubjectPublicKeyInfo<'_>,
    raw_signature: &[u8],
    payload: &[u8],
) -> Result<(), VerifyError> {
    match (descriptor.family, descriptor.curve) {
        (SignatureFamily::Ecdsa, Some(NamedCurve::P256)) => {
            verify_p256(spki.raw, raw_signature, payload)
        }
        (SignatureFamily::Ecdsa, Some(NamedCurve::P384)) => {
            verify_p384(spki.raw, raw_signature, payload)
        }
        (SignatureFamily::Ecdsa, Some(NamedCurve::P521)) => {
            verify_p521(spki.raw, raw_signature, payload)
        }
        (SignatureFamily::Ecdsa, None) => Err(VerifyError::malformed_certificate(
            "ECDSA key without a curve",
        )),
        (SignatureFamily::RsassaPkcs1v15, _) => {
            let key = rsa_public_key(spki)?;
            let vk = pkcs1v15::VerifyingKey::<Sha256>::new(key);
            let signature = pkcs1v15::Signature::try_from(raw_signature)
                .map_err(|e| VerifyError::malformed_signature(format!("bad RSA signature: {e}")))?;
            vk.verify(payload, &signature)
                .map_err(|_| VerifyError::verification_failure("RSASSA-PKCS1-v1_5 mismatch"))
        }
        (SignatureFamily::RsaPss, _) => {
            let key = rsa_public_key(spki)?;
            let vk = pss::VerifyingKey::<Sha256>::new(key);
            let signature = pss::Signature::try_from(raw_signature)
                .map_err(|e| VerifyError::malformed_signature(format!("bad RSA signature: {e}")))?;
            vk.verify(payload, &signature)
                .map_err(|_| VerifyError::verification_failure("RSA-PSS mismatch"))
        }
    }
}

fn verify_p256(spki_der: &[u8], raw: &[u8], payload: &[u8]) -> Result<(), VerifyError> {
    let pk = p256::PublicKey::from_public_key_der(spki_der)
        .map_err(|e| VerifyError::malformed_certificate(format!("bad P-256 public key: {e}")))?;
    let ep = pk.to_encoded_point(false);
    let vk = p256::ecdsa::VerifyingKey::from_sec1_bytes(ep.as_bytes())
        .map_err(|e| VerifyError::malformed_certificate(format!("bad P-256 public key: {e}")))?;
    let signature = p256::ecdsa::Signature::from_slice(raw)
        .map_err(|e| VerifyError::malformed_signature(format!("bad P-256 signature: {e}")))?;
    vk.verify(payload, &signature)
        .map_err(|_| VerifyError::verification_failure("ECDSA P-256 mismatch"))
}

fn verify_p384(spki_der: &[u8], raw: &[u8], payload: &[u8]) -> Result<(), VerifyError> {
    let pk = p384::PublicKey::from_public_key_der(spki_der)
        .map_err(|e| VerifyError::malformed_certificate(format!("bad P-384 public key: {e}")))?;
    let ep = pk.to_encoded_point(false);
    let vk = p384::ecdsa::VerifyingKey::from_sec1_bytes(ep.as_bytes())
        .map_err(|e| VerifyError::malformed_certificate(format!("bad P-384 public key: {e}")))?;
    let signature = p384::ecdsa::Signature::from_slice(raw)
        .map_err(|e| VerifyError::malformed_signature(format!("bad P-384 signature: {e}")))?;
    vk.verify(payload, &signature)
        .map_err(|_| VerifyError::verification_failure("ECDSA P-384 mismatch"))
}

fn verify_p521(spki_der: &[u8], raw: &[u8], payload: &[u8]) -> Result<(), VerifyError> {
    let pk = p521::PublicKey::from_public_key_der(spki_der)
        .map_err(|e| VerifyError::malformed_certificate(format!("bad P-521 public key: {e}")))?;
    let ep = pk.to_encoded_point(false);
    let vk = p521::ecdsa::VerifyingKey::from_sec1_bytes(ep.as_bytes())
        .map_err(|e| VerifyError::malformed_certificate(format!("bad P-521 public key: {e}")))?;
    let signature = p521::ecdsa::Signature::from_slice(raw)
        .map_err(|e| VerifyError::malformed_signature(format!("bad P-521 signature: {e}")))?;
    vk.verify(payload, &signature)
        .map_err(|_| VerifyError::verification_failure("ECDSA P-521 mismatch"))
}

/// RSA keys are decoded from the PKCS#1 bit string so `id-RSASSA-PSS` keys
/// load the same way as `rsaEncryption` ones.
fn rsa_public_key(spki: &SubjectPublicKeyInfo<'_>) -> Result<RsaPublicKey, VerifyError> {
    RsaPublicKey::from_pkcs1_der(&spki.subject_public_key.data)
        .map_err(|e| VerifyError::malformed_certificate(format!("bad RSA public key: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PINNED_ROOT_CERTIFICATE;
    use base64::{engine::general_purpose::STANDARD, Engine};
    use p256::pkcs8::DecodePrivateKey;
    use rsa::signature::{RandomizedSigner, SignatureEncoding, Signer};

    struct EcFixture {
        pem: String,
        key_der: Vec<u8>,
    }

    fn ec_cert(alg: &'static rcgen::SignatureAlgorithm) -> EcFixture {
        let key_pair = rcgen::KeyPair::generate_for(alg).unwrap();
        let params = rcgen::CertificateParams::new(vec!["issuer.test".to_string()]).unwrap();
        let cert = params.self_signed(&key_pair).unwrap();
        EcFixture {
            pem: cert.pem(),
            key_der: key_pair.serialize_der(),
        }
    }

    fn rsa_spki(private_key: &rsa::RsaPrivateKey) -> Vec<u8> {
        use rsa::pkcs8::EncodePublicKey;
        private_key
            .to_public_key()
            .to_public_key_der()
            .unwrap()
            .as_bytes()
            .to_vec()
    }

    /// `rsa_spki` with the algorithm OID switched to id-RSASSA-PSS.
    fn rsa_pss_spki(private_key: &rsa::RsaPrivateKey) -> Vec<u8> {
        const RSA_ENCRYPTION: [u8; 11] =
            [0x06, 0x09, 0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01, 0x01];
        let mut spki = rsa_spki(private_key);
        let at = spki
            .windows(RSA_ENCRYPTION.len())
            .position(|w| w == RSA_ENCRYPTION)
            .unwrap();
        spki[at + RSA_ENCRYPTION.len() - 1] = 0x0a;
        spki
    }

    #[test]
    fn test_p256_roundtrip_and_tamper() {
        let fixture = ec_cert(&rcgen::PKCS_ECDSA_P256_SHA256);
        let signing_key = p256::ecdsa::SigningKey::from_pkcs8_der(&fixture.key_der).unwrap();
        let payload = br#"{"issuer_id":"x509_aki:abc"}"#;

        let signature: p256::ecdsa::Signature = signing_key.sign(payload);
        let text = STANDARD.encode(signature.to_der().as_bytes());

        assert!(verify_signature_with_pem(&fixture.pem, &text, payload));

        let mut tampered = payload.to_vec();
        tampered[3] ^= 0x01;
        assert!(!verify_signature_with_pem(&fixture.pem, &text, &tampered));
        assert!(matches!(
            check_signature_with_pem(&fixture.pem, &text, &tampered),
            Err(VerifyError::VerificationFailure { .. })
        ));
    }

    #[test]
    fn test_record_signature_roundtrip() {
        let fixture = ec_cert(&rcgen::PKCS_ECDSA_P256_SHA256);
        let signing_key = p256::ecdsa::SigningKey::from_pkcs8_der(&fixture.key_der).unwrap();

        let mut record = serde_json::json!({
            "issuer_id": "x509_aki:abc",
            "display": { "name": "Test" }
        });
        assert!(matches!(
            check_record_signature(&fixture.pem, &record),
            Err(VerifyError::MalformedSignature { .. })
        ));

        let payload = signing_payload(&record).unwrap();
        let signature: p256::ecdsa::Signature = signing_key.sign(&payload);
        record["signature"] = STANDARD.encode(signature.to_der().as_bytes()).into();
        assert!(verify_record_signature(&fixture.pem, &record));

        record["display"]["name"] = "Tampered".into();
        assert!(!verify_record_signature(&fixture.pem, &record));
    }

    #[test]
    fn test_p384_roundtrip() {
        let fixture = ec_cert(&rcgen::PKCS_ECDSA_P384_SHA384);
        let signing_key = p384::ecdsa::SigningKey::from_pkcs8_der(&fixture.key_der).unwrap();
        let payload = b"payload bytes";

        let signature: p384::ecdsa::Signature = signing_key.sign(payload);
        let text = STANDARD.encode(signature.to_der().as_bytes());

        assert!(verify_signature_with_pem(&fixture.pem, &text, payload));
        assert!(!verify_signature_with_pem(&fixture.pem, &text, b"payload bytez"));
    }

    #[test]
    fn test_rsa_pkcs1v15_roundtrip() {
        let mut rng = rand::thread_rng();
        let private_key = rsa::RsaPrivateKey::new(&mut rng, 1024).unwrap();
        let spki = rsa_spki(&private_key);

        let signing_key = pkcs1v15::SigningKey::<Sha256>::new(private_key);
        let payload = b"rsa payload";
        let signature = signing_key.sign(payload);
        let text = STANDARD.encode(signature.to_bytes());

        assert!(check_signature_with_spki_der(&spki, &text, payload).is_ok());
        assert!(matches!(
            check_signature_with_spki_der(&spki, &text, b"rsa paylaod"),
            Err(VerifyError::VerificationFailure { .. })
        ));
    }

    #[test]
    fn test_p521_roundtrip_and_tamper() {
        use p521::pkcs8::EncodePublicKey;

        let secret = p521::SecretKey::random(&mut rand::thread_rng());
        let spki = secret.public_key().to_public_key_der().unwrap();
        let signing_key = p521::ecdsa::SigningKey::from_bytes(&secret.to_bytes()).unwrap();
        let payload = br#"{"issuer_id":"x509_aki:p521"}"#;

        let signature: p521::ecdsa::Signature = signing_key.sign(payload);
        let der = signature.to_der();
        let text = STANDARD.encode(der.as_bytes());

        assert!(check_signature_with_spki_der(spki.as_bytes(), &text, payload).is_ok());
        assert!(matches!(
            check_signature_with_spki_der(spki.as_bytes(), &text, br#"{"issuer_id":"x509_aki:p52l"}"#),
            Err(VerifyError::VerificationFailure { .. })
        ));
    }

    #[test]
    fn test_rsa_pss_key_roundtrip() {
        let mut rng = rand::thread_rng();
        let private_key = rsa::RsaPrivateKey::new(&mut rng, 1024).unwrap();
        let spki = rsa_pss_spki(&private_key);

        let (_, parsed) = SubjectPublicKeyInfo::from_der(&spki).unwrap();
        assert_eq!(
            resolve_algorithm(&algorithm_identifier_from_spki(&parsed).unwrap()).unwrap(),
            AlgorithmDescriptor::rsa(SignatureFamily::RsaPss)
        );

        let signing_key = pss::SigningKey::<Sha256>::new(private_key);
        let payload = b"rsa pss payload";
        let signature = signing_key.sign_with_rng(&mut rng, payload);
        let text = STANDARD.encode(signature.to_bytes());

        assert!(check_signature_with_spki_der(&spki, &text, payload).is_ok());
        assert!(matches!(
            check_signature_with_spki_der(&spki, &text, b"rsa pss paylaod"),
            Err(VerifyError::VerificationFailure { .. })
        ));
    }

    #[test]
    fn test_rsa_encryption_key_rejects_pss_signature() {
        let mut rng = rand::thread_rng();
        let private_key = rsa::RsaPrivateKey::new(&mut rng, 1024).unwrap();
        let spki = rsa_spki(&private_key);

        // rsaEncryption keys resolve to PKCS#1 v1.5.
        let signing_key = pss::SigningKey::<Sha256>::new(private_key);
        let payload = b"rsa payload";
        let signature = signing_key.sign_with_rng(&mut rng, payload);
        let text = STANDARD.encode(signature.to_bytes());

        assert!(check_signature_with_spki_der(&spki, &text, payload).is_err());
    }

    #[test]
    fn test_pinned_root_is_p256() {
        let der = pem_to_der(PINNED_ROOT_CERTIFICATE).unwrap();
        let (_, cert) = x509_parser::parse_x509_certificate(&der).unwrap();
        let id = algorithm_identifier_from_spki(cert.public_key()).unwrap();
        assert_eq!(
            resolve_algorithm(&id).unwrap(),
            AlgorithmDescriptor::ecdsa(NamedCurve::P256)
        );
        assert_eq!(
            id.parameters,
            AlgorithmParameters::NamedCurve(crate::algorithm::OID_SECP256R1.to_string())
        );
    }

    #[test]
    fn test_garbage_inputs_are_false() {
        assert!(!verify_signature_with_pem("not a pem", "AAAA", b"x"));
        assert!(!verify_signature_with_pem(PINNED_ROOT_CERTIFICATE, "", b"x"));
        assert!(!verify_signature_with_pem(PINNED_ROOT_CERTIFICATE, "AAAA", b"x"));
        assert!(matches!(
            check_signature_with_pem(PINNED_ROOT_CERTIFICATE, "AAAA", b"x"),
            Err(VerifyError::MalformedSignature { .. })
        ));
        assert!(matches!(
            check_signature_with_pem(
                "-----BEGIN CERTIFICATE-----\nAAAA\n-----END CERTIFICATE-----",
                "AAAA",
                b"x"
            ),
            Err(VerifyError::MalformedCertificate { .. })
        ));
    }
}
