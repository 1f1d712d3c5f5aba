use std::fmt;
use std::str::FromStr;

use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::with_errors::thiserror::{self, Error};

pub const MEDIA_TYPE_PLAIN: &str = "application/iden3comm-plain-json";
pub const MEDIA_TYPE_SIGNED: &str = "application/iden3comm-signed-json";
pub const MEDIA_TYPE_ZKP: &str = "application/iden3-zkp-json";
pub const MEDIA_TYPE_ENCRYPTED: &str = "application/iden3comm-encrypted-json";

#[derive(Debug, PartialEq, Error, Clone)]
pub enum EnvelopeError {
    #[error("unknown envelope type: {0}")]
    UnknownEnvelopeType(String),

    #[error("unable to generate json: {0}")]
    GenerateJSONError(String),

    #[error("unable to unserialize message: {0}")]
    UnserializeError(String),
}

/// `EnvelopeType` is the closed set of supported transport wrappers
///
/// Each variant maps 1:1 to the media tag carried by the envelope `typ` header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub enum EnvelopeType {
    #[serde(rename = "application/iden3comm-plain-json")]
    Plain,

    #[serde(rename = "application/iden3comm-signed-json")]
    Signed,

    #[serde(rename = "application/iden3-zkp-json")]
    ZeroKnowledgeProof,

    #[serde(rename = "application/iden3comm-encrypted-json")]
    Encrypted,
}

impl EnvelopeType {
    pub fn all() -> [EnvelopeType; 4] {
        [
            EnvelopeType::Plain,
            EnvelopeType::Signed,
            EnvelopeType::ZeroKnowledgeProof,
            EnvelopeType::Encrypted,
        ]
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            EnvelopeType::Plain => MEDIA_TYPE_PLAIN,
            EnvelopeType::Signed => MEDIA_TYPE_SIGNED,
            EnvelopeType::ZeroKnowledgeProof => MEDIA_TYPE_ZKP,
            EnvelopeType::Encrypted => MEDIA_TYPE_ENCRYPTED,
        }
    }
}

impl fmt::Display for EnvelopeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

impl FromStr for EnvelopeType {
    type Err = EnvelopeError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            MEDIA_TYPE_PLAIN => Ok(EnvelopeType::Plain),
            MEDIA_TYPE_SIGNED => Ok(EnvelopeType::Signed),
            MEDIA_TYPE_ZKP => Ok(EnvelopeType::ZeroKnowledgeProof),
            MEDIA_TYPE_ENCRYPTED => Ok(EnvelopeType::Encrypted),
            _ => Err(EnvelopeError::UnknownEnvelopeType(tag.to_string())),
        }
    }
}
