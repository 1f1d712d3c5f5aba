//! Field element helpers
//!
//! Public signals are decimal strings of field elements. The values handled here always fit
//! in 31 bytes so they stay below the field modulus without any reduction.
use sha2::{Digest, Sha256};

use super::types::{IdentityDecoder, ZkpError};

pub const CHALLENGE_SIZE: usize = 31;

/// `challenge_of` computes the challenge bound into a proof: the first 31 bytes of the
/// `SHA-256` digest of the payload, read as a big-endian integer
pub fn challenge_of(payload: &[u8]) -> String {
    let digest = Sha256::digest(payload);
    bytes_to_decimal(&digest[..CHALLENGE_SIZE])
}

/// `is_challenge_of` compares a challenge signal with the payload challenge by value, so a
/// signal rendered with leading zeros still matches
pub fn is_challenge_of(signal: &str, payload: &[u8]) -> bool {
    let value = match decimal_to_bytes(signal) {
        Ok(value) => value,
        Err(_) => return false,
    };

    let digest = Sha256::digest(payload);
    let expected = digest[..CHALLENGE_SIZE].iter().skip_while(|b| **b == 0);

    value.iter().eq(expected)
}

/// `bytes_to_decimal` renders big-endian bytes as a decimal string
pub fn bytes_to_decimal(bytes: &[u8]) -> String {
    let mut number: Vec<u8> = bytes.iter().copied().skip_while(|b| *b == 0).collect();
    if number.is_empty() {
        return "0".to_string();
    }

    let mut digits = Vec::new();
    while !number.is_empty() {
        let mut remainder: u32 = 0;
        for byte in number.iter_mut() {
            let acc = (remainder << 8) | (*byte as u32);
            *byte = (acc / 10) as u8;
            remainder = acc % 10;
        }

        digits.push(char::from(b'0' + remainder as u8));

        let leading = number.iter().take_while(|b| **b == 0).count();
        number.drain(..leading);
    }

    digits.iter().rev().collect()
}

/// `decimal_to_bytes` parses a decimal string into big-endian bytes, without leading zeros
pub fn decimal_to_bytes(decimal: &str) -> Result<Vec<u8>, ZkpError> {
    if decimal.is_empty() || !decimal.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ZkpError::InvalidSignal(format!(
            "not a decimal value: {}",
            decimal
        )));
    }

    let mut bytes: Vec<u8> = Vec::new();
    for digit in decimal.bytes().map(|b| (b - b'0') as u32) {
        let mut carry = digit;
        for byte in bytes.iter_mut().rev() {
            let acc = (*byte as u32) * 10 + carry;
            *byte = (acc & 0xff) as u8;
            carry = acc >> 8;
        }

        while carry > 0 {
            bytes.insert(0, (carry & 0xff) as u8);
            carry >>= 8;
        }
    }

    Ok(bytes)
}

/// `DidIdentityDecoder` maps the identity signal to `<method_prefix>:<id>` where the signal
/// holds the method specific id as big-endian bytes
#[derive(Debug, Clone)]
pub struct DidIdentityDecoder {
    method_prefix: String,
}

impl DidIdentityDecoder {
    pub fn new(method_prefix: &str) -> Self {
        Self {
            method_prefix: method_prefix.trim_end_matches(':').to_string(),
        }
    }

    /// `encode` is the inverse of [`IdentityDecoder::decode`], used by proof services to fill
    /// the identity input of a circuit
    pub fn encode(&self, did: &str) -> Result<String, ZkpError> {
        let id = did
            .strip_prefix(&self.method_prefix)
            .and_then(|rest| rest.strip_prefix(':'))
            .filter(|id| !id.is_empty())
            .ok_or(ZkpError::InvalidSignal(format!(
                "did {} does not use method {}",
                did, self.method_prefix
            )))?;

        if id.len() > CHALLENGE_SIZE {
            return Err(ZkpError::InvalidSignal(format!(
                "method specific id too long: {}",
                id
            )));
        }

        Ok(bytes_to_decimal(id.as_bytes()))
    }
}

impl IdentityDecoder for DidIdentityDecoder {
    fn decode(&self, signal: &str) -> Result<String, ZkpError> {
        let bytes = decimal_to_bytes(signal)?;
        let id =
            String::from_utf8(bytes).map_err(|err| ZkpError::InvalidSignal(err.to_string()))?;

        if id.is_empty() {
            return Err(ZkpError::InvalidSignal("empty identity".to_string()));
        }

        Ok(format!("{}:{}", self.method_prefix, id))
    }
}
