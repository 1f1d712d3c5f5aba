use std::fmt;
use std::str::FromStr;

use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::with_errors::thiserror::{self, Error};

use crate::envelope::EnvelopeType;

use super::parser;

pub const PROTOCOL_VERSION_V1: &str = "iden3comm/v1";

#[derive(Debug, PartialEq, Error, Clone)]
pub enum ProfileError {
    #[error("malformed profile: {0}")]
    MalformedProfile(String),

    #[error("no matching profile: {0}")]
    NoMatchingProfile(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub enum ProtocolVersion {
    #[serde(rename = "iden3comm/v1")]
    V1,
}

impl ProtocolVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProtocolVersion::V1 => PROTOCOL_VERSION_V1,
        }
    }
}

impl Default for ProtocolVersion {
    fn default() -> Self {
        ProtocolVersion::V1
    }
}

impl FromStr for ProtocolVersion {
    type Err = ProfileError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            PROTOCOL_VERSION_V1 => Ok(ProtocolVersion::V1),
            _ => Err(ProfileError::MalformedProfile(format!(
                "unknown protocol version: {}",
                value
            ))),
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `Algorithm` is the closed set of algorithm tags known by the negotiation grammar
///
/// Each envelope type recognizes its own subset, see [`Algorithm::recognized_for`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub enum Algorithm {
    #[serde(rename = "groth16")]
    Groth16,

    #[serde(rename = "EdDSA")]
    EdDSA,

    #[serde(rename = "ES256K")]
    ES256K,

    #[serde(rename = "ES256K-R")]
    ES256KR,

    #[serde(rename = "ECDH-ES+XC20PKW")]
    EcdhEsXc20pkw,

    #[serde(rename = "ECDH-ES+A256KW")]
    EcdhEsA256kw,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Groth16 => "groth16",
            Algorithm::EdDSA => "EdDSA",
            Algorithm::ES256K => "ES256K",
            Algorithm::ES256KR => "ES256K-R",
            Algorithm::EcdhEsXc20pkw => "ECDH-ES+XC20PKW",
            Algorithm::EcdhEsA256kw => "ECDH-ES+A256KW",
        }
    }

    pub fn recognized_for(env: EnvelopeType) -> &'static [Algorithm] {
        match env {
            EnvelopeType::Plain => &[],
            EnvelopeType::Signed => &[Algorithm::EdDSA, Algorithm::ES256K, Algorithm::ES256KR],
            EnvelopeType::ZeroKnowledgeProof => &[Algorithm::Groth16],
            EnvelopeType::Encrypted => &[Algorithm::EcdhEsXc20pkw, Algorithm::EcdhEsA256kw],
        }
    }
}

impl FromStr for Algorithm {
    type Err = ProfileError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "groth16" => Ok(Algorithm::Groth16),
            "EdDSA" => Ok(Algorithm::EdDSA),
            "ES256K" => Ok(Algorithm::ES256K),
            "ES256K-R" => Ok(Algorithm::ES256KR),
            "ECDH-ES+XC20PKW" => Ok(Algorithm::EcdhEsXc20pkw),
            "ECDH-ES+A256KW" => Ok(Algorithm::EcdhEsA256kw),
            _ => Err(ProfileError::MalformedProfile(format!(
                "unknown algorithm: {}",
                value
            ))),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `SignalLayout` tells where a circuit puts the values used to bind a proof to its sender
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalLayout {
    pub identity: usize,
    pub challenge: usize,
}

/// `CircuitId` is the closed set of proving circuits understood by the proving backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub enum CircuitId {
    #[serde(rename = "authV2")]
    AuthV2,

    #[serde(rename = "authV3")]
    AuthV3,

    #[serde(rename = "authV3-8-32")]
    AuthV3_8_32,

    #[serde(rename = "credentialAtomicQueryV3OnChain-beta.1")]
    AtomicQueryV3OnChain,
}

impl CircuitId {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitId::AuthV2 => "authV2",
            CircuitId::AuthV3 => "authV3",
            CircuitId::AuthV3_8_32 => "authV3-8-32",
            CircuitId::AtomicQueryV3OnChain => "credentialAtomicQueryV3OnChain-beta.1",
        }
    }

    /// `is_auth` marks the circuits proving the ownership of an identity, they use a shorter
    /// accepted state transition delay than the credential query circuits
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            CircuitId::AuthV2 | CircuitId::AuthV3 | CircuitId::AuthV3_8_32
        )
    }

    pub fn signal_layout(&self) -> SignalLayout {
        match self {
            CircuitId::AuthV2 | CircuitId::AuthV3 | CircuitId::AuthV3_8_32 => SignalLayout {
                identity: 0,
                challenge: 1,
            },
            CircuitId::AtomicQueryV3OnChain => SignalLayout {
                identity: 0,
                challenge: 8,
            },
        }
    }
}

impl FromStr for CircuitId {
    type Err = ProfileError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "authV2" => Ok(CircuitId::AuthV2),
            "authV3" => Ok(CircuitId::AuthV3),
            "authV3-8-32" => Ok(CircuitId::AuthV3_8_32),
            "credentialAtomicQueryV3OnChain-beta.1" => Ok(CircuitId::AtomicQueryV3OnChain),
            _ => Err(ProfileError::MalformedProfile(format!(
                "unknown circuit: {}",
                value
            ))),
        }
    }
}

impl fmt::Display for CircuitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `AcceptProfile` is the structured form of an accept-profile string
///
/// Only the [`EnvelopeType::ZeroKnowledgeProof`] envelope may carry `circuits`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptProfile {
    pub protocol_version: ProtocolVersion,
    pub env: EnvelopeType,
    pub circuits: Option<Vec<CircuitId>>,
    pub alg: Option<Vec<Algorithm>>,
}

impl AcceptProfile {
    pub fn new(env: EnvelopeType) -> Self {
        Self {
            protocol_version: ProtocolVersion::default(),
            env,
            circuits: None,
            alg: None,
        }
    }

    pub fn with_circuits(mut self, circuits: Vec<CircuitId>) -> Self {
        self.circuits = Some(circuits);
        self
    }

    pub fn with_alg(mut self, alg: Vec<Algorithm>) -> Self {
        self.alg = Some(alg);
        self
    }

    /// `is_satisfied_by` checks the protocol version, the envelope type and, for each constraint
    /// present in the profile, that at least one value is supported by the packer.
    /// An absent constraint matches anything
    pub fn is_satisfied_by(&self, capabilities: &PackerCapabilities) -> bool {
        if self.protocol_version != capabilities.protocol_version || self.env != capabilities.env
        {
            return false;
        }

        let circuits_match = self.circuits.as_ref().map_or(true, |circuits| {
            circuits
                .iter()
                .any(|circuit| capabilities.circuits.contains(circuit))
        });

        let alg_match = self.alg.as_ref().map_or(true, |algs| {
            algs.iter().any(|alg| capabilities.algorithms.contains(alg))
        });

        circuits_match && alg_match
    }
}

impl FromStr for AcceptProfile {
    type Err = ProfileError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        parser::parse(value)
    }
}

impl fmt::Display for AcceptProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&parser::build_one(self))
    }
}

/// `PackerCapabilities` describes what a packer is configured with, the accept profiles it
/// advertises are computed from it and never persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackerCapabilities {
    pub protocol_version: ProtocolVersion,
    pub env: EnvelopeType,
    pub algorithms: Vec<Algorithm>,
    pub circuits: Vec<CircuitId>,
}

impl PackerCapabilities {
    pub fn new(env: EnvelopeType) -> Self {
        Self {
            protocol_version: ProtocolVersion::default(),
            env,
            algorithms: Vec::new(),
            circuits: Vec::new(),
        }
    }

    pub fn with_algorithms(mut self, algorithms: Vec<Algorithm>) -> Self {
        self.algorithms = algorithms;
        self
    }

    pub fn with_circuits(mut self, circuits: Vec<CircuitId>) -> Self {
        self.circuits = circuits;
        self
    }

    pub fn profile(&self) -> AcceptProfile {
        AcceptProfile {
            protocol_version: self.protocol_version,
            env: self.env,
            circuits: (!self.circuits.is_empty()).then(|| self.circuits.clone()),
            alg: (!self.algorithms.is_empty()).then(|| self.algorithms.clone()),
        }
    }

    pub fn profiles(&self) -> Vec<String> {
        parser::build(&[self.profile()])
    }

    /// `supports` parses given profile string and checks it against these capabilities,
    /// a malformed profile is never supported
    pub fn supports(&self, profile: &str) -> bool {
        parser::parse(profile)
            .map(|accept| accept.is_satisfied_by(self))
            .unwrap_or(false)
    }
}
