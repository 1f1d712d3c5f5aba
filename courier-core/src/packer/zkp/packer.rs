use std::str::FromStr;
use std::sync::Arc;

use rst_common::standard::async_trait::async_trait;
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json;
use rst_common::with_logging::log::{debug, warn};

use crate::config::ZkpConfig;
use crate::envelope::{EnvelopeType, Message};
use crate::packer::jose;
use crate::packer::types::{Packer, PackerError, PackerParams};
use crate::profile::{Algorithm, CircuitId, PackerCapabilities};

use super::cache::KeyCache;
use super::field::{challenge_of, is_challenge_of};
use super::types::{
    IdentityDecoder, InputsPreparer, KeyLoader, ProvingBackend, ProvingBinding, StateVerifier,
    ZkProof,
};

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(crate = "self::serde")]
struct ZkpHeader {
    alg: String,
    circuit: String,
    typ: String,
}

/// `ProofToken` is the decoded compact token, only built once every format check passed
struct ProofToken {
    binding: ProvingBinding,
    payload: Vec<u8>,
    message: Message,
    proof: ZkProof,
}

/// `ZkpPacker` produces a compact token `header.payload.proof`
///
/// The proof commits to a challenge derived from the exact payload bytes, and to the sender
/// identity. Unpack runs its checks in a fixed order, each one terminal:
///
/// 1. token format, including a registered circuit
/// 2. proof validity against the verification key
/// 3. identity state freshness
/// 4. sender binding, challenge and identity signals against the payload
pub struct ZkpPacker {
    bindings: Vec<ProvingBinding>,
    backend: Arc<dyn ProvingBackend>,
    preparer: Arc<dyn InputsPreparer>,
    state_verifier: Arc<dyn StateVerifier>,
    identity_decoder: Arc<dyn IdentityDecoder>,
    keys: KeyCache,
    config: ZkpConfig,
}

impl ZkpPacker {
    pub fn new(
        backend: Arc<dyn ProvingBackend>,
        loader: Arc<dyn KeyLoader>,
        preparer: Arc<dyn InputsPreparer>,
        state_verifier: Arc<dyn StateVerifier>,
        identity_decoder: Arc<dyn IdentityDecoder>,
    ) -> Self {
        Self {
            bindings: Vec::new(),
            backend,
            preparer,
            state_verifier,
            identity_decoder,
            keys: KeyCache::new(loader),
            config: ZkpConfig::default(),
        }
    }

    pub fn with_binding(mut self, binding: ProvingBinding) -> Self {
        if !self.bindings.contains(&binding) {
            self.bindings.push(binding);
        }

        self
    }

    pub fn with_config(mut self, config: ZkpConfig) -> Self {
        self.config = config;
        self
    }

    fn registered(&self, binding: &ProvingBinding) -> Result<(), PackerError> {
        if self.bindings.contains(binding) {
            return Ok(());
        }

        Err(PackerError::UnknownCircuit(format!(
            "{} with {} is not registered",
            binding.circuit, binding.alg
        )))
    }

    fn decode_token(&self, envelope: &[u8]) -> Result<ProofToken, PackerError> {
        let [header_segment, payload_segment, proof_segment] = jose::split_compact(envelope)?;

        let header: ZkpHeader = jose::decode_json(header_segment)?;
        if header.typ != EnvelopeType::ZeroKnowledgeProof.as_tag() {
            return Err(PackerError::InvalidEnvelope(format!(
                "unexpected envelope tag: {}",
                header.typ
            )));
        }

        let alg = Algorithm::from_str(&header.alg)
            .map_err(|_| PackerError::UnsupportedAlgorithm(header.alg.clone()))?;
        let circuit = CircuitId::from_str(&header.circuit)
            .map_err(|_| PackerError::UnknownCircuit(header.circuit.clone()))?;

        let binding = ProvingBinding::new(alg, circuit);
        self.registered(&binding)?;

        let payload = jose::decode_segment(payload_segment)?;
        let message = Message::try_from(payload.clone())
            .map_err(|err| PackerError::InvalidEnvelope(err.to_string()))?;

        let proof: ZkProof = jose::decode_json(proof_segment)?;

        Ok(ProofToken {
            binding,
            payload,
            message,
            proof,
        })
    }

    async fn verify_proof(&self, token: &ProofToken) -> Result<(), PackerError> {
        let verification_key = self
            .keys
            .verification_key(&token.binding)
            .await
            .map_err(|err| PackerError::VerificationKeyNotFound(err.to_string()))?;

        let verified = self
            .backend
            .verify(&token.binding, &token.proof, &verification_key)
            .await
            .map_err(|err| PackerError::ProofInvalid(err.to_string()))?;

        if !verified {
            return Err(PackerError::ProofInvalid(format!(
                "proof rejected for circuit {}",
                token.binding.circuit
            )));
        }

        Ok(())
    }

    async fn verify_state(&self, token: &ProofToken) -> Result<(), PackerError> {
        let circuit = token.binding.circuit;
        let delay = self.config.delay_for(circuit);

        let accepted = self
            .state_verifier
            .verify(circuit, &token.proof.pub_signals, delay)
            .await
            .map_err(|err| PackerError::StateVerificationFailed(err.to_string()))?;

        if !accepted {
            return Err(PackerError::StateVerificationFailed(format!(
                "identity state rejected for circuit {}",
                circuit
            )));
        }

        Ok(())
    }

    fn verify_sender(&self, token: &ProofToken) -> Result<(), PackerError> {
        let layout = token.binding.circuit.signal_layout();
        let signals = &token.proof.pub_signals;

        let challenge = signals
            .get(layout.challenge)
            .ok_or(PackerError::SenderMismatch(
                "missing challenge signal".to_string(),
            ))?;

        if !is_challenge_of(challenge, &token.payload) {
            return Err(PackerError::SenderMismatch(
                "challenge does not match payload".to_string(),
            ));
        }

        let identity_signal = signals
            .get(layout.identity)
            .ok_or(PackerError::SenderMismatch(
                "missing identity signal".to_string(),
            ))?;

        let identity = self
            .identity_decoder
            .decode(identity_signal)
            .map_err(|err| PackerError::SenderMismatch(err.to_string()))?;

        let from = token
            .message
            .from()
            .ok_or(PackerError::SenderMismatch("missing sender".to_string()))?;

        if identity != from {
            return Err(PackerError::SenderMismatch(format!(
                "proof identity {} is not the sender {}",
                identity, from
            )));
        }

        Ok(())
    }

    async fn verify(&self, envelope: &[u8]) -> Result<Message, PackerError> {
        let token = self.decode_token(envelope)?;

        self.verify_proof(&token).await?;
        self.verify_state(&token).await?;
        self.verify_sender(&token)?;

        Ok(token.message)
    }
}

#[async_trait]
impl Packer for ZkpPacker {
    fn envelope_type(&self) -> EnvelopeType {
        EnvelopeType::ZeroKnowledgeProof
    }

    fn capabilities(&self) -> PackerCapabilities {
        let mut algorithms: Vec<Algorithm> = Vec::new();
        let mut circuits: Vec<CircuitId> = Vec::new();

        for binding in self.bindings.iter() {
            if !algorithms.contains(&binding.alg) {
                algorithms.push(binding.alg);
            }

            if !circuits.contains(&binding.circuit) {
                circuits.push(binding.circuit);
            }
        }

        PackerCapabilities::new(EnvelopeType::ZeroKnowledgeProof)
            .with_algorithms(algorithms)
            .with_circuits(circuits)
    }

    async fn pack(&self, message: &Message, params: &PackerParams) -> Result<Vec<u8>, PackerError> {
        let params = match params {
            PackerParams::ZeroKnowledgeProof(params) => params,
            _ => {
                return Err(PackerError::MissingParameter(
                    "zkp packer requires proving params".to_string(),
                ))
            }
        };

        let binding = params.binding;
        self.registered(&binding)?;

        let sender = params
            .sender
            .as_deref()
            .or(message.from())
            .ok_or(PackerError::MissingParameter("sender".to_string()))?;

        let payload = serde_json::to_vec(&message.stamp(EnvelopeType::ZeroKnowledgeProof))
            .map_err(|err| PackerError::InvalidEnvelope(err.to_string()))?;

        let challenge = challenge_of(&payload);
        let inputs = self
            .preparer
            .prepare(&challenge, sender, binding.circuit)
            .await
            .map_err(|err| PackerError::ProverError(err.to_string()))?;

        let proving_key = self
            .keys
            .proving_key(&binding)
            .await
            .map_err(|err| PackerError::ProverError(err.to_string()))?;

        let proof = self
            .backend
            .prove(&binding, &inputs, &proving_key)
            .await
            .map_err(|err| PackerError::ProverError(err.to_string()))?;

        let header = ZkpHeader {
            alg: binding.alg.to_string(),
            circuit: binding.circuit.to_string(),
            typ: EnvelopeType::ZeroKnowledgeProof.to_string(),
        };

        debug!(
            "[packer:zkp] proved message {} with {}",
            message.id(),
            binding.circuit
        );

        let token = [
            jose::encode_json(&header)?,
            jose::encode_segment(&payload),
            jose::encode_json(&proof)?,
        ]
        .join(&jose::COMPACT_SEPARATOR.to_string());

        Ok(token.into_bytes())
    }

    async fn unpack(&self, envelope: &[u8]) -> Result<Message, PackerError> {
        match self.verify(envelope).await {
            Ok(message) => {
                debug!("[packer:zkp] verified message {}", message.id());
                Ok(message)
            }
            Err(err) => {
                warn!("[packer:zkp] rejected envelope: {}", err);
                Err(err)
            }
        }
    }
}
