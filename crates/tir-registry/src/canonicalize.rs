//! Canonical signing payload for issuer records.
//!
//! The payload is the record without its `signature` field, serialized with
//! JCS (RFC 8785): keys sorted, no whitespace, fixed number formatting.

use serde_json::Value as JsonValue;

use crate::error::CanonicalizeError;

/// Name of the detached signature field.
pub const SIGNATURE_FIELD: &str = "signature";

/// Convert a JSON value to JCS bytes.
pub fn to_canonical_jcs_bytes(value: &JsonValue) -> Result<Vec<u8>, CanonicalizeError> {
    serde_jcs::to_vec(value).map_err(|e| CanonicalizeError::Serialize {
        message: e.to_string(),
    })
}

/// Bytes that are signed for `record`: JCS of the record minus `signature`.
pub fn signing_payload(record: &JsonValue) -> Result<Vec<u8>, CanonicalizeError> {
    let JsonValue::Object(map) = record else {
        return Err(CanonicalizeError::NotAnObject {
            kind: json_kind(record),
        });
    };

    let mut unsigned = map.clone();
    unsigned.remove(SIGNATURE_FIELD);
    to_canonical_jcs_bytes(&JsonValue::Object(unsigned))
}

/// The record's `signature` string, if present.
pub fn record_signature(record: &JsonValue) -> Option<&str> {
    record.get(SIGNATURE_FIELD).and_then(JsonValue::as_str)
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
