//! PEM armor for single certificates.

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::error::VerifyError;

const PEM_LINE_WIDTH: usize = 64;
const BEGIN_CERTIFICATE: &str = "-----BEGIN CERTIFICATE-----";
const END_CERTIFICATE: &str = "-----END CERTIFICATE-----";

/// Strip the armor of a PEM block and decode its body.
///
/// Any `-----BEGIN ...-----` / `-----END ...-----` markers are dropped along with
/// all whitespace. Only the first block is decoded.
pub fn pem_to_der(pem: &str) -> Result<Vec<u8>, VerifyError> {
    let mut body = String::with_capacity(pem.len());
    let mut in_block = false;
    let mut saw_marker = false;

    for line in pem.lines().map(str::trim) {
        if line.starts_with("-----BEGIN ") && line.ends_with("-----") {
            in_block = true;
            saw_marker = true;
            continue;
        }
        if line.starts_with("-----END ") && line.ends_with("-----") {
            break;
        }
        if in_block || !saw_marker {
            body.extend(line.chars().filter(|c| !c.is_whitespace()));
        }
    }

    if body.is_empty() {
        return Err(VerifyError::malformed_certificate("empty PEM body"));
    }

    STANDARD
        .decode(body.as_bytes())
        .map_err(|e| VerifyError::malformed_certificate(format!("invalid PEM base64: {e}")))
}

/// Armor DER certificate bytes as PEM, 64 characters per line, no trailing newline.
pub fn der_to_pem(der: &[u8]) -> String {
    let encoded = STANDARD.encode(der);
    let mut out = String::with_capacity(encoded.len() + encoded.len() / PEM_LINE_WIDTH + 64);
    out.push_str(BEGIN_CERTIFICATE);
    out.push('\n');
    for chunk in encoded.as_bytes().chunks(PEM_LINE_WIDTH) {
        // base64 output is ASCII
        out.push_str(&String::from_utf8_lossy(chunk));
        out.push('\n');
    }
    out.push_str(END_CERTIFICATE);
    out
}
