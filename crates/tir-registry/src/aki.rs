//! Authority Key Identifier text encoding.
//!
//! Issuers are keyed by the key identifier of their certificate, written as
//! URL-safe base64 without padding and prefixed with `x509_aki:` in records.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

/// Prefix of every `issuer_id`.
pub const ISSUER_ID_PREFIX: &str = "x509_aki:";

/// Key identifier text could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid key identifier '{input}': {reason}")]
pub struct AkiError {
    pub input: String,
    pub reason: String,
}

/// Encode raw key identifier bytes.
pub fn aki_from_key_identifier(key_id: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(key_id)
}

/// Encode a hex key identifier as printed by certificate tools
/// (`AB:CD:...`, case insensitive, colons optional).
pub fn aki_from_hex(hex_text: &str) -> Result<String, AkiError> {
    let compact: String = hex_text
        .chars()
        .filter(|c| *c != ':' && !c.is_whitespace())
        .collect();
    if compact.is_empty() {
        return Err(AkiError {
            input: hex_text.to_string(),
            reason: "empty".to_string(),
        });
    }
    let bytes = hex::decode(&compact).map_err(|e| AkiError {
        input: hex_text.to_string(),
        reason: e.to_string(),
    })?;
    Ok(aki_from_key_identifier(&bytes))
}

/// `x509_aki:<aki>`.
pub fn issuer_id(aki: &str) -> String {
    format!("{ISSUER_ID_PREFIX}{aki}")
}

/// AKI part of an `issuer_id`, or `None` if the prefix is missing or nothing follows it.
pub fn aki_from_issuer_id(issuer_id: &str) -> Option<&str> {
    issuer_id
        .strip_prefix(ISSUER_ID_PREFIX)
        .filter(|aki| !aki.is_empty())
}
