use std::time::Duration;

use ed25519_dalek::SigningKey;
use mockall::mock;
use x25519_dalek::{PublicKey, StaticSecret};

use rst_common::standard::async_trait::async_trait;
use rst_common::standard::serde_json::{self, json, Value};

use crate::identity::document::{CURVE_ED25519, CURVE_X25519};
use crate::identity::{
    DidDocument, DidResolver, IdentityError, Jwk, KeyID, KeyMaterial, KeyStore,
    VerificationMethod,
};
use crate::profile::CircuitId;

use super::zkp::{
    DidIdentityDecoder, InputsPreparer, KeyLoader, ProvingBackend, ProvingBinding, StateVerifier,
    ZkProof, ZkpError,
};

mock!(
    pub FakeResolver{}

    #[async_trait]
    impl DidResolver for FakeResolver {
        async fn resolve(&self, did: &str) -> Result<DidDocument, IdentityError>;
    }
);

mock!(
    pub FakeKeyStore{}

    #[async_trait]
    impl KeyStore for FakeKeyStore {
        async fn get(&self, kid: &KeyID) -> Result<Option<KeyMaterial>, IdentityError>;
    }
);

/// `TestIdentity` is a party holding one signing key and one agreement key,
/// both derived from a fixed seed
#[derive(Clone)]
pub struct TestIdentity {
    pub did: String,
    pub auth_kid: KeyID,
    pub agreement_kid: KeyID,
    pub signing_secret: [u8; 32],
    pub agreement_secret: [u8; 32],
    pub document: DidDocument,
}

impl TestIdentity {
    pub fn new(did: &str, seed: u8) -> Self {
        let signing_secret = [seed; 32];
        let agreement_secret = [seed.wrapping_add(100); 32];

        let auth_kid = KeyID::from(format!("{}#auth-1", did));
        let agreement_kid = KeyID::from(format!("{}#agreement-1", did));

        let verifying = SigningKey::from_bytes(&signing_secret).verifying_key();
        let agreement_public = PublicKey::from(&StaticSecret::from(agreement_secret));

        let mut document = DidDocument::new(did);
        document
            .add_authentication(VerificationMethod::new(
                &auth_kid,
                did,
                Jwk::okp(CURVE_ED25519, verifying.as_bytes()),
            ))
            .add_key_agreement(VerificationMethod::new(
                &agreement_kid,
                did,
                Jwk::okp(CURVE_X25519, agreement_public.as_bytes()),
            ));

        Self {
            did: did.to_string(),
            auth_kid,
            agreement_kid,
            signing_secret,
            agreement_secret,
            document,
        }
    }

    pub fn key(&self, kid: &KeyID) -> Option<KeyMaterial> {
        if kid == &self.auth_kid {
            return Some(KeyMaterial::Ed25519(self.signing_secret));
        }

        if kid == &self.agreement_kid {
            return Some(KeyMaterial::X25519(self.agreement_secret));
        }

        None
    }
}

/// `resolver_for` builds a resolver answering with the documents of given identities
pub fn resolver_for(identities: Vec<TestIdentity>) -> MockFakeResolver {
    let mut resolver = MockFakeResolver::new();
    resolver.expect_resolve().returning(move |did| {
        identities
            .iter()
            .find(|identity| identity.did == did)
            .map(|identity| identity.document.clone())
            .ok_or(IdentityError::NotFound(did.to_string()))
    });

    resolver
}

/// `key_store_for` builds a key store holding the private keys of given identities
pub fn key_store_for(identities: Vec<TestIdentity>) -> MockFakeKeyStore {
    let mut keys = MockFakeKeyStore::new();
    keys.expect_get().returning(move |kid| {
        Ok(identities.iter().find_map(|identity| identity.key(kid)))
    });

    keys
}

mock!(
    pub FakeBackend{}

    #[async_trait]
    impl ProvingBackend for FakeBackend {
        async fn prove(&self, binding: &ProvingBinding, inputs: &[u8], proving_key: &[u8]) -> Result<ZkProof, ZkpError>;
        async fn verify(&self, binding: &ProvingBinding, proof: &ZkProof, verification_key: &[u8]) -> Result<bool, ZkpError>;
    }
);

mock!(
    pub FakeLoader{}

    #[async_trait]
    impl KeyLoader for FakeLoader {
        async fn proving_key(&self, binding: &ProvingBinding) -> Result<Vec<u8>, ZkpError>;
        async fn verification_key(&self, binding: &ProvingBinding) -> Result<Vec<u8>, ZkpError>;
    }
);

mock!(
    pub FakePreparer{}

    #[async_trait]
    impl InputsPreparer for FakePreparer {
        async fn prepare(&self, challenge: &str, sender: &str, circuit: CircuitId) -> Result<Vec<u8>, ZkpError>;
    }
);

mock!(
    pub FakeStateVerifier{}

    #[async_trait]
    impl StateVerifier for FakeStateVerifier {
        async fn verify(&self, circuit: CircuitId, pub_signals: &[String], delay: Duration) -> Result<bool, ZkpError>;
    }
);

pub const ZKP_METHOD: &str = "did:example";

pub fn fake_preparer() -> MockFakePreparer {
    let mut preparer = MockFakePreparer::new();
    preparer
        .expect_prepare()
        .returning(|challenge, sender, circuit| {
            let identity = DidIdentityDecoder::new(ZKP_METHOD).encode(sender)?;
            let inputs = json!({
                "challenge": challenge,
                "identity": identity,
                "circuit": circuit.as_str(),
            });

            Ok(inputs.to_string().into_bytes())
        });

    preparer
}

/// `prove_inputs` places the identity and challenge inputs at the circuit positions, like a real
/// circuit exposing them as public signals
pub fn prove_inputs(binding: &ProvingBinding, inputs: &[u8]) -> Result<ZkProof, ZkpError> {
    let inputs: Value = serde_json::from_slice(inputs)
        .map_err(|err| ZkpError::BackendError(err.to_string()))?;

    let layout = binding.circuit.signal_layout();
    let mut pub_signals = vec!["0".to_string(); layout.identity.max(layout.challenge) + 1];
    pub_signals[layout.identity] = inputs["identity"].as_str().unwrap_or("0").to_string();
    pub_signals[layout.challenge] = inputs["challenge"].as_str().unwrap_or("0").to_string();

    Ok(ZkProof {
        proof: json!({"protocol": "groth16", "curve": "bn128"}),
        pub_signals,
    })
}

pub fn fake_backend(verified: bool) -> MockFakeBackend {
    let mut backend = MockFakeBackend::new();
    backend
        .expect_prove()
        .returning(|binding, inputs, _| prove_inputs(binding, inputs));
    backend
        .expect_verify()
        .returning(move |_, _, _| Ok(verified));

    backend
}

pub fn fake_loader() -> MockFakeLoader {
    let mut loader = MockFakeLoader::new();
    loader.expect_proving_key().returning(|_| Ok(vec![1, 1, 1]));
    loader
        .expect_verification_key()
        .returning(|_| Ok(vec![2, 2, 2]));

    loader
}

pub fn accepting_state() -> MockFakeStateVerifier {
    let mut state = MockFakeStateVerifier::new();
    state.expect_verify().returning(|_, _, _| Ok(true));
    state
}
