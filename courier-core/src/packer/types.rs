use rst_common::standard::async_trait::async_trait;
use rst_common::with_errors::thiserror::{self, Error};

use crate::envelope::{EnvelopeType, Message};
use crate::identity::{IdentityError, KeyID};
use crate::profile::{Algorithm, PackerCapabilities, ProfileError};

use super::zkp::ZkpParams;

/// `PackerError` covers every failure raised while packing, sniffing or unpacking an envelope
///
/// Format errors (`UnrecognizedEnvelope`, `InvalidEnvelope`) are always raised before any
/// cryptographic check runs
#[derive(Debug, PartialEq, Error, Clone)]
pub enum PackerError {
    #[error("profile error: {0}")]
    ProfileError(#[from] ProfileError),

    #[error("unrecognized envelope: {0}")]
    UnrecognizedEnvelope(String),

    #[error("no packer registered for type: {0}")]
    NoPackerForType(String),

    #[error("missing parameter: {0}")]
    MissingParameter(String),

    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("invalid envelope: {0}")]
    InvalidEnvelope(String),

    #[error("signature invalid: {0}")]
    SignatureInvalid(String),

    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("recipient key not found: {0}")]
    RecipientKeyNotFound(String),

    #[error("verification key not found: {0}")]
    VerificationKeyNotFound(String),

    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("unknown circuit: {0}")]
    UnknownCircuit(String),

    #[error("proof invalid: {0}")]
    ProofInvalid(String),

    #[error("state verification failed: {0}")]
    StateVerificationFailed(String),

    #[error("sender mismatch: {0}")]
    SenderMismatch(String),

    #[error("resolver error: {0}")]
    ResolverError(String),

    #[error("key store error: {0}")]
    KeyStoreError(String),

    #[error("prover error: {0}")]
    ProverError(String),

    #[error("encryption error: {0}")]
    EncryptionError(String),
}

impl From<IdentityError> for PackerError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::KeyStoreError(msg) => PackerError::KeyStoreError(msg),
            IdentityError::InvalidKey(msg) => PackerError::KeyNotFound(msg),
            other => PackerError::ResolverError(other.to_string()),
        }
    }
}

/// `SigningParams` used by the [`super::SignedPacker`]
///
/// When `kid` is empty, the first `Ed25519` authentication method of the sender is used
#[derive(Debug, Clone, PartialEq)]
pub struct SigningParams {
    pub alg: Algorithm,
    pub kid: Option<KeyID>,
}

impl Default for SigningParams {
    fn default() -> Self {
        Self {
            alg: Algorithm::EdDSA,
            kid: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recipient {
    pub did: String,
    pub kid: Option<KeyID>,
}

impl Recipient {
    pub fn new(did: &str) -> Self {
        Self {
            did: did.to_string(),
            kid: None,
        }
    }
}

/// `EncryptionParams` used by the [`super::EncryptedPacker`]
#[derive(Debug, Clone, PartialEq)]
pub struct EncryptionParams {
    pub alg: Algorithm,
    pub recipients: Vec<Recipient>,
}

impl EncryptionParams {
    pub fn new(recipients: Vec<Recipient>) -> Self {
        Self {
            alg: Algorithm::EcdhEsXc20pkw,
            recipients,
        }
    }
}

/// `PackerParams` carries the packer specific parameters, each variant belongs to one
/// envelope type and a packer rejects any other variant with [`PackerError::MissingParameter`]
#[derive(Debug, Clone, PartialEq)]
pub enum PackerParams {
    Plain,
    Signed(SigningParams),
    ZeroKnowledgeProof(ZkpParams),
    Encrypted(EncryptionParams),
}

impl PackerParams {
    pub fn envelope_type(&self) -> EnvelopeType {
        match self {
            PackerParams::Plain => EnvelopeType::Plain,
            PackerParams::Signed(_) => EnvelopeType::Signed,
            PackerParams::ZeroKnowledgeProof(_) => EnvelopeType::ZeroKnowledgeProof,
            PackerParams::Encrypted(_) => EnvelopeType::Encrypted,
        }
    }
}

/// `Packer` is the uniform contract implemented by each envelope codec
#[async_trait]
pub trait Packer: Send + Sync {
    fn envelope_type(&self) -> EnvelopeType;

    /// `capabilities` describes the algorithms and circuits this packer is configured with
    fn capabilities(&self) -> PackerCapabilities;

    /// `pack` wraps the message into this packer's wire format
    async fn pack(&self, message: &Message, params: &PackerParams) -> Result<Vec<u8>, PackerError>;

    /// `unpack` parses the envelope and runs every integrity and identity check owned by
    /// this packer, the message is only returned when all of them succeed
    async fn unpack(&self, envelope: &[u8]) -> Result<Message, PackerError>;

    fn supported_profiles(&self) -> Vec<String> {
        self.capabilities().profiles()
    }

    fn supports(&self, profile: &str) -> bool {
        self.capabilities().supports(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_envelope_type() {
        assert_eq!(PackerParams::Plain.envelope_type(), EnvelopeType::Plain);
        assert_eq!(
            PackerParams::Signed(SigningParams::default()).envelope_type(),
            EnvelopeType::Signed
        );
        assert_eq!(
            PackerParams::Encrypted(EncryptionParams::new(vec![])).envelope_type(),
            EnvelopeType::Encrypted
        );
    }

    #[test]
    fn test_identity_error_mapping() {
        let err: PackerError = IdentityError::NotFound("did:example:bob".to_string()).into();
        assert!(matches!(err, PackerError::ResolverError(_)));

        let err: PackerError = IdentityError::KeyStoreError("locked".to_string()).into();
        assert!(matches!(err, PackerError::KeyStoreError(_)));
    }
}
