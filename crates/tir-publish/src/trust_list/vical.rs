//! AAMVA Digital Trust Service VICAL (ISO/IEC 18013-5 Annex C).
//!
//! The VICAL is a COSE_Sign1 message whose payload is a CBOR map holding
//! `certificateInfos`, an array of maps each carrying a DER `certificate`.
//! The COSE signature is not checked here.

use async_trait::async_trait;
use minicbor::data::{Tag, Type};
use minicbor::Decoder;
use tir_registry::der_to_pem;
use tracing::info;

use super::TrustListSource;
use crate::error::{PublishError, PublishResult};
use crate::fetch::fetch_bytes;

/// Provenance tag for the AAMVA DTS list.
pub const AAMVA_SOURCE: &str = "aamva_dts";

const COSE_SIGN1_TAG: u64 = 18;
const ENCODED_CBOR_TAG: u64 = 24;

fn vical_err(message: impl Into<String>) -> PublishError {
    PublishError::trust_list(AAMVA_SOURCE, message)
}

fn cbor_err(context: &str) -> impl Fn(minicbor::decode::Error) -> PublishError + '_ {
    move |e| vical_err(format!("{context}: {e}"))
}

/// Decode a VICAL into PEM certificates.
pub fn parse_vical(input: &[u8]) -> PublishResult<Vec<String>> {
    let payload = cose_sign1_payload(input)?;
    let ders = certificate_infos(&payload)?;
    Ok(ders.iter().map(|der| der_to_pem(der)).collect())
}

/// Payload of a COSE_Sign1 `[protected, unprotected, payload, signature]`.
fn cose_sign1_payload(input: &[u8]) -> PublishResult<Vec<u8>> {
    if input.is_empty() {
        return Err(vical_err("VICAL is empty"));
    }

    let mut dec = Decoder::new(input);

    if dec.datatype().map_err(cbor_err("COSE_Sign1"))? == Type::Tag {
        let tag = dec.tag().map_err(cbor_err("COSE_Sign1 tag"))?;
        if tag != Tag::new(COSE_SIGN1_TAG) {
            return Err(vical_err("unexpected CBOR tag (expected COSE_Sign1 tag 18)"));
        }
    }

    let len = dec
        .array()
        .map_err(cbor_err("COSE_Sign1 is not an array"))?
        .ok_or_else(|| vical_err("indefinite-length COSE_Sign1 arrays are not supported"))?;
    if len != 4 {
        return Err(vical_err(format!("COSE_Sign1 has {len} elements, expected 4")));
    }

    dec.skip().map_err(cbor_err("protected header"))?;
    dec.skip().map_err(cbor_err("unprotected header"))?;

    match dec.datatype().map_err(cbor_err("payload"))? {
        Type::Bytes => Ok(dec.bytes().map_err(cbor_err("payload"))?.to_vec()),
        Type::Null => Err(vical_err("detached payloads are not supported")),
        other => Err(vical_err(format!("payload is {other}, expected a byte string"))),
    }
}

/// DER certificates listed under `certificateInfos`.
fn certificate_infos(payload: &[u8]) -> PublishResult<Vec<Vec<u8>>> {
    let mut dec = Decoder::new(payload);

    // Payload may itself be wrapped as #6.24(bstr .cbor VICAL).
    if dec.datatype().map_err(cbor_err("VICAL"))? == Type::Tag {
        let tag = dec.tag().map_err(cbor_err("VICAL tag"))?;
        if tag != Tag::new(ENCODED_CBOR_TAG) {
            return Err(vical_err("unexpected CBOR tag on VICAL payload"));
        }
        let inner = dec.bytes().map_err(cbor_err("embedded VICAL"))?;
        return certificate_infos(inner);
    }

    let mut certificates = None;
    for_each_map_entry(&mut dec, "VICAL", |dec, key| {
        if key == Some("certificateInfos") {
            certificates = Some(read_certificate_infos(dec)?);
        } else {
            dec.skip().map_err(cbor_err("VICAL entry"))?;
        }
        Ok(())
    })?;

    certificates.ok_or_else(|| vical_err("VICAL has no certificateInfos"))
}

fn read_certificate_infos(dec: &mut Decoder<'_>) -> PublishResult<Vec<Vec<u8>>> {
    let mut out = Vec::new();
    let len = dec.array().map_err(cbor_err("certificateInfos"))?;
    let mut remaining = len;

    loop {
        match remaining {
            Some(0) => break,
            Some(n) => remaining = Some(n - 1),
            None => {
                if dec.datatype().map_err(cbor_err("certificateInfos"))? == Type::Break {
                    dec.set_position(dec.position() + 1);
                    break;
                }
            }
        }

        let mut certificate = None;
        for_each_map_entry(dec, "certificateInfo", |dec, key| {
            if key == Some("certificate") {
                certificate = Some(dec.bytes().map_err(cbor_err("certificate"))?.to_vec());
            } else {
                dec.skip().map_err(cbor_err("certificateInfo entry"))?;
            }
            Ok(())
        })?;

        let certificate =
            certificate.ok_or_else(|| vical_err("certificateInfo has no certificate"))?;
        out.push(certificate);
    }
    Ok(out)
}

/// Walk a CBOR map (definite or indefinite). `visit` receives text keys and
/// must consume the value; non-text keys are passed as `None`.
fn for_each_map_entry<'b, F>(dec: &mut Decoder<'b>, what: &str, mut visit: F) -> PublishResult<()>
where
    F: FnMut(&mut Decoder<'b>, Option<&str>) -> PublishResult<()>,
{
    let len = dec
        .map()
        .map_err(|e| vical_err(format!("{what} is not a map: {e}")))?;
    let mut remaining = len;

    loop {
        match remaining {
            Some(0) => return Ok(()),
            Some(n) => remaining = Some(n - 1),
            None => {
                if dec.datatype().map_err(cbor_err(what))? == Type::Break {
                    dec.set_position(dec.position() + 1);
                    return Ok(());
                }
            }
        }

        match dec.datatype().map_err(cbor_err(what))? {
            Type::String => {
                let key = dec.str().map_err(cbor_err(what))?.to_string();
                visit(dec, Some(&key))?;
            }
            _ => {
                dec.skip().map_err(cbor_err(what))?;
                visit(dec, None)?;
            }
        }
    }
}

/// AAMVA DTS VICAL fetched over HTTP.
#[derive(Debug, Clone)]
pub struct AamvaVical {
    client: reqwest::Client,
    url: String,
}

impl AamvaVical {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl TrustListSource for AamvaVical {
    fn name(&self) -> &str {
        AAMVA_SOURCE
    }

    async fn certificates(&self) -> PublishResult<Vec<String>> {
        info!(url = %self.url, "fetching issuer data from AAMVA DTS trust list");
        let body = fetch_bytes(&self.client, &self.url).await?;
        parse_vical(&body)
    }
}
