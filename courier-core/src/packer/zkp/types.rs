use std::time::Duration;

use rst_common::standard::async_trait::async_trait;
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json::Value;
use rst_common::with_errors::thiserror::{self, Error};

use crate::profile::{Algorithm, CircuitId};

#[derive(Debug, PartialEq, Error, Clone)]
pub enum ZkpError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("backend error: {0}")]
    BackendError(String),

    #[error("invalid signal: {0}")]
    InvalidSignal(String),
}

/// `ProvingBinding` identifies the proving system and circuit used to produce, and later
/// verify, a proof
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProvingBinding {
    pub alg: Algorithm,
    pub circuit: CircuitId,
}

impl ProvingBinding {
    pub fn new(alg: Algorithm, circuit: CircuitId) -> Self {
        Self { alg, circuit }
    }

    pub fn groth16(circuit: CircuitId) -> Self {
        Self::new(Algorithm::Groth16, circuit)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ZkpParams {
    pub binding: ProvingBinding,

    /// defaults to the message `from` when empty
    pub sender: Option<String>,
}

impl ZkpParams {
    pub fn new(binding: ProvingBinding) -> Self {
        Self {
            binding,
            sender: None,
        }
    }

    pub fn with_sender(mut self, sender: &str) -> Self {
        self.sender = Some(sender.to_string());
        self
    }
}

/// `ZkProof` is the proof segment of the envelope
///
/// `proof` is opaque for this crate, only two positions of `pub_signals` are read,
/// see [`crate::profile::SignalLayout`]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(crate = "self::serde")]
pub struct ZkProof {
    pub proof: Value,
    pub pub_signals: Vec<String>,
}

#[async_trait]
pub trait ProvingBackend: Send + Sync {
    async fn prove(
        &self,
        binding: &ProvingBinding,
        inputs: &[u8],
        proving_key: &[u8],
    ) -> Result<ZkProof, ZkpError>;

    async fn verify(
        &self,
        binding: &ProvingBinding,
        proof: &ZkProof,
        verification_key: &[u8],
    ) -> Result<bool, ZkpError>;
}

/// `KeyLoader` fetches the key material of a proving binding, results are cached by
/// [`super::KeyCache`]
#[async_trait]
pub trait KeyLoader: Send + Sync {
    async fn proving_key(&self, binding: &ProvingBinding) -> Result<Vec<u8>, ZkpError>;
    async fn verification_key(&self, binding: &ProvingBinding) -> Result<Vec<u8>, ZkpError>;
}

/// `InputsPreparer` builds the circuit inputs bound to the challenge and the sender identity
#[async_trait]
pub trait InputsPreparer: Send + Sync {
    async fn prepare(
        &self,
        challenge: &str,
        sender: &str,
        circuit: CircuitId,
    ) -> Result<Vec<u8>, ZkpError>;
}

/// `StateVerifier` checks the identity state referenced by the public signals is still
/// acceptable given the allowed transition delay
#[async_trait]
pub trait StateVerifier: Send + Sync {
    async fn verify(
        &self,
        circuit: CircuitId,
        pub_signals: &[String],
        delay: Duration,
    ) -> Result<bool, ZkpError>;
}

/// `IdentityDecoder` turns the identity public signal into a `DID`
pub trait IdentityDecoder: Send + Sync {
    fn decode(&self, signal: &str) -> Result<String, ZkpError>;
}
