//! Signature text decoding and DER-to-raw ECDSA conversion.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use x509_parser::der_parser::ber::{parse_ber_sequence, BerObjectContent};

use crate::algorithm::{AlgorithmDescriptor, SignatureFamily};
use crate::error::VerifyError;

/// Standard alphabet with optional padding and lenient trailing bits.
const SIGNATURE_TEXT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Decode base64 signature text, ignoring embedded whitespace.
///
/// Padded, unpadded and URL-safe (`-`, `_`) text are all accepted.
pub fn decode_signature_text(signature: &str) -> Result<Vec<u8>, VerifyError> {
    let compact: String = signature
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    if compact.is_empty() {
        return Err(VerifyError::malformed_signature("empty signature"));
    }
    SIGNATURE_TEXT
        .decode(compact.as_bytes())
        .map_err(|e| VerifyError::malformed_signature(format!("invalid base64: {e}")))
}

/// Convert a DER `SEQUENCE { r INTEGER, s INTEGER }` into `r || s` with each
/// integer right-aligned in `half_len` bytes.
///
/// Integers longer than `half_len` (sign guard byte) lose their leading bytes;
/// shorter ones are zero padded on the left.
pub fn der_to_raw(der: &[u8], half_len: usize) -> Result<Vec<u8>, VerifyError> {
    let (_, sequence) = parse_ber_sequence(der)
        .map_err(|e| VerifyError::malformed_signature(format!("not a DER sequence: {e}")))?;

    let items = match &sequence.content {
        BerObjectContent::Sequence(items) => items,
        _ => return Err(VerifyError::malformed_signature("not a DER sequence")),
    };

    if items.len() != 2 {
        return Err(VerifyError::malformed_signature(format!(
            "expected 2 integers, found {} elements",
            items.len()
        )));
    }

    let mut raw = Vec::with_capacity(half_len * 2);
    for item in items {
        match &item.content {
            BerObjectContent::Integer(bytes) => raw.extend(fit_to_width(bytes, half_len)),
            _ => return Err(VerifyError::malformed_signature("element is not an INTEGER")),
        }
    }
    Ok(raw)
}

fn fit_to_width(bytes: &[u8], width: usize) -> Vec<u8> {
    if bytes.len() >= width {
        bytes[bytes.len() - width..].to_vec()
    } else {
        let mut out = vec![0u8; width - bytes.len()];
        out.extend_from_slice(bytes);
        out
    }
}

/// Decode signature text into the byte form the primitive for `descriptor`
/// expects: raw `r || s` for ECDSA, untouched bytes for RSA.
pub fn normalize_signature(
    descriptor: &AlgorithmDescriptor,
    signature: &str,
) -> Result<Vec<u8>, VerifyError> {
    let bytes = decode_signature_text(signature)?;
    match (descriptor.family, descriptor.signature_half_len()) {
        (SignatureFamily::Ecdsa, Some(half_len)) => der_to_raw(&bytes, half_len),
        (SignatureFamily::Ecdsa, None) => {
            Err(VerifyError::malformed_signature("ECDSA descriptor without a curve"))
        }
        _ => Ok(bytes),
    }
}
