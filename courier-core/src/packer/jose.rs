use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

use rst_common::standard::serde::de::DeserializeOwned;
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json;

use super::types::PackerError;

pub(crate) const COMPACT_SEPARATOR: char = '.';

/// `TypHeader` is the only header field read while sniffing an envelope
#[derive(Serialize, Deserialize, Debug)]
#[serde(crate = "self::serde")]
pub(crate) struct TypHeader {
    pub typ: Option<String>,
}

pub(crate) fn encode_segment(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

pub(crate) fn decode_segment(segment: &str) -> Result<Vec<u8>, PackerError> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|err| PackerError::InvalidEnvelope(format!("base64url: {}", err)))
}

pub(crate) fn encode_json<T: Serialize>(value: &T) -> Result<String, PackerError> {
    let json =
        serde_json::to_vec(value).map_err(|err| PackerError::InvalidEnvelope(err.to_string()))?;
    Ok(encode_segment(&json))
}

pub(crate) fn decode_json<T: DeserializeOwned>(segment: &str) -> Result<T, PackerError> {
    let bytes = decode_segment(segment)?;
    serde_json::from_slice(&bytes).map_err(|err| PackerError::InvalidEnvelope(err.to_string()))
}

/// `split_compact` splits a compact token into its three non-empty segments
pub(crate) fn split_compact(envelope: &[u8]) -> Result<[&str; 3], PackerError> {
    let token = std::str::from_utf8(envelope)
        .map_err(|err| PackerError::InvalidEnvelope(err.to_string()))?
        .trim();

    let parts: Vec<&str> = token.split(COMPACT_SEPARATOR).collect();
    if parts.len() != 3 {
        return Err(PackerError::InvalidEnvelope(format!(
            "expected 3 segments, found {}",
            parts.len()
        )));
    }

    if parts.iter().any(|part| part.is_empty()) {
        return Err(PackerError::InvalidEnvelope("empty segment".to_string()));
    }

    Ok([parts[0], parts[1], parts[2]])
}
