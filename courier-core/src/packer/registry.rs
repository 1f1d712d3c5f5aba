use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use rst_common::standard::serde_json::{self, Value};
use rst_common::with_logging::log::debug;

use crate::envelope::{EnvelopeType, Message};
use crate::profile::{self, AcceptProfile, ProfileError};

use super::jose::{self, TypHeader};
use super::types::{Packer, PackerError, PackerParams};

const JSON_OBJECT_PREFIX: char = '{';
const FIELD_TYP: &str = "typ";
const FIELD_PROTECTED: &str = "protected";

fn unrecognized(reason: &str) -> PackerError {
    PackerError::UnrecognizedEnvelope(reason.to_string())
}

fn header_typ(segment: &str) -> Result<String, PackerError> {
    let header: TypHeader =
        jose::decode_json(segment).map_err(|err| unrecognized(&err.to_string()))?;

    header.typ.ok_or(unrecognized("header without typ"))
}

/// `detect_envelope_type` reads the envelope tag from the raw bytes without running any
/// cryptographic check
///
/// A JSON object carries its tag in `typ`, or in its base64url encoded `protected` header.
/// Anything else is read as a compact token whose first segment is the header.
pub fn detect_envelope_type(envelope: &[u8]) -> Result<EnvelopeType, PackerError> {
    let text = std::str::from_utf8(envelope)
        .map_err(|_| unrecognized("envelope is not utf-8"))?
        .trim();

    if text.is_empty() {
        return Err(unrecognized("empty envelope"));
    }

    let tag = if text.starts_with(JSON_OBJECT_PREFIX) {
        let object: Value =
            serde_json::from_str(text).map_err(|err| unrecognized(&err.to_string()))?;

        match object.get(FIELD_TYP).and_then(Value::as_str) {
            Some(tag) => tag.to_string(),
            None => {
                let protected = object
                    .get(FIELD_PROTECTED)
                    .and_then(Value::as_str)
                    .ok_or(unrecognized("json envelope without typ"))?;

                header_typ(protected)?
            }
        }
    } else {
        let header = text
            .split(jose::COMPACT_SEPARATOR)
            .next()
            .filter(|segment| !segment.is_empty())
            .ok_or(unrecognized("missing header segment"))?;

        header_typ(header)?
    };

    EnvelopeType::from_str(&tag).map_err(|_| PackerError::UnrecognizedEnvelope(tag))
}

/// `Registry` owns one packer per envelope type and routes envelopes to them
#[derive(Default)]
pub struct Registry {
    packers: HashMap<EnvelopeType, Arc<dyn Packer>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `register` adds given packers, a later packer replaces any packer already registered
    /// for the same envelope type
    pub fn register(&mut self, packers: Vec<Arc<dyn Packer>>) -> &mut Self {
        for packer in packers {
            let env = packer.envelope_type();
            if self.packers.insert(env, packer).is_some() {
                debug!("[registry:register] replaced packer: {}", env);
            }
        }

        self
    }

    pub fn packer(&self, env: EnvelopeType) -> Result<Arc<dyn Packer>, PackerError> {
        self.packers
            .get(&env)
            .cloned()
            .ok_or(PackerError::NoPackerForType(env.to_string()))
    }

    pub fn envelope_types(&self) -> Vec<EnvelopeType> {
        EnvelopeType::all()
            .into_iter()
            .filter(|env| self.packers.contains_key(env))
            .collect()
    }

    pub fn detect_envelope_type(&self, envelope: &[u8]) -> Result<EnvelopeType, PackerError> {
        detect_envelope_type(envelope)
    }

    pub async fn pack(
        &self,
        env: EnvelopeType,
        message: &Message,
        params: &PackerParams,
    ) -> Result<Vec<u8>, PackerError> {
        let packer = self.packer(env)?;
        if params.envelope_type() != env {
            return Err(PackerError::MissingParameter(format!(
                "params for {} given to {}",
                params.envelope_type(),
                env
            )));
        }

        debug!("[registry:pack] packing message {} as {}", message.id(), env);
        packer.pack(message, params).await
    }

    /// `unpack` detects the envelope type, then delegates every verification to its packer
    pub async fn unpack(&self, envelope: &[u8]) -> Result<(Message, EnvelopeType), PackerError> {
        let env = detect_envelope_type(envelope)?;
        let packer = self.packer(env)?;

        debug!("[registry:unpack] detected envelope: {}", env);
        let message = packer.unpack(envelope).await?;
        Ok((message, env))
    }

    /// `supported_profiles` lists the profiles of every registered packer, ordered by
    /// envelope type
    pub fn supported_profiles(&self) -> Vec<String> {
        self.envelope_types()
            .into_iter()
            .filter_map(|env| self.packers.get(&env))
            .flat_map(|packer| packer.supported_profiles())
            .collect()
    }

    pub fn supports(&self, profile: &str) -> bool {
        self.packers.values().any(|packer| packer.supports(profile))
    }

    /// `negotiate` picks the first profile, in caller order, supported by a registered packer.
    /// Malformed profiles are skipped, an empty list falls back to the plain envelope
    pub fn negotiate(&self, accept: &[String]) -> Result<AcceptProfile, ProfileError> {
        if accept.is_empty() {
            if self.packers.contains_key(&EnvelopeType::Plain) {
                return Ok(AcceptProfile::new(EnvelopeType::Plain));
            }

            return Err(ProfileError::NoMatchingProfile(
                "empty accept list and no plain packer".to_string(),
            ));
        }

        for candidate in accept {
            let parsed = match profile::parse(candidate) {
                Ok(parsed) => parsed,
                Err(err) => {
                    debug!("[registry:negotiate] skip profile {}: {}", candidate, err);
                    continue;
                }
            };

            let supported = self
                .packers
                .get(&parsed.env)
                .map(|packer| parsed.is_satisfied_by(&packer.capabilities()))
                .unwrap_or(false);

            if supported {
                debug!("[registry:negotiate] selected profile: {}", candidate);
                return Ok(parsed);
            }
        }

        Err(ProfileError::NoMatchingProfile(accept.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use mockall::mock;

    use rst_common::standard::async_trait::async_trait;
    use rst_common::standard::serde_json::json;
    use rst_common::with_tokio::tokio;

    use crate::packer::testing::{
        accepting_state, fake_backend, fake_loader, fake_preparer, key_store_for, resolver_for,
        TestIdentity, ZKP_METHOD,
    };
    use crate::packer::types::{EncryptionParams, Recipient, SigningParams};
    use crate::packer::zkp::{DidIdentityDecoder, ProvingBinding, ZkpPacker, ZkpParams};
    use crate::packer::{EncryptedPacker, PlainPacker, SignedPacker};
    use crate::profile::{Algorithm, CircuitId, PackerCapabilities};

    mock!(
        FakePacker{}

        #[async_trait]
        impl Packer for FakePacker {
            fn envelope_type(&self) -> EnvelopeType;
            fn capabilities(&self) -> PackerCapabilities;
            async fn pack(&self, message: &Message, params: &PackerParams) -> Result<Vec<u8>, PackerError>;
            async fn unpack(&self, envelope: &[u8]) -> Result<Message, PackerError>;
            fn supported_profiles(&self) -> Vec<String>;
            fn supports(&self, profile: &str) -> bool;
        }
    );

    fn build_registry(alice: &TestIdentity, bob: &TestIdentity) -> Registry {
        let identities = vec![alice.clone(), bob.clone()];
        let resolver = Arc::new(resolver_for(identities.clone()));
        let keys = Arc::new(key_store_for(identities));

        let mut registry = Registry::new();
        registry.register(vec![
            Arc::new(PlainPacker::new()),
            Arc::new(SignedPacker::new(resolver.clone(), keys.clone())),
            Arc::new(EncryptedPacker::new(resolver, keys)),
        ]);

        registry
    }

    fn build_message() -> Message {
        Message::new("https://iden3-communication.io/authorization/1.0/request")
            .with_from("did:example:alice")
            .with_to("did:example:bob")
            .with_body(json!({"callbackUrl": "https://verifier.example/callback"}))
    }

    #[tokio::test]
    async fn test_detect_packed_envelopes() {
        let alice = TestIdentity::new("did:example:alice", 1);
        let bob = TestIdentity::new("did:example:bob", 2);
        let registry = build_registry(&alice, &bob);
        let message = build_message();

        let cases = vec![
            (EnvelopeType::Plain, PackerParams::Plain),
            (
                EnvelopeType::Signed,
                PackerParams::Signed(SigningParams::default()),
            ),
            (
                EnvelopeType::Encrypted,
                PackerParams::Encrypted(EncryptionParams::new(vec![Recipient::new(&bob.did)])),
            ),
        ];

        for (env, params) in cases {
            let packed = registry.pack(env, &message, &params).await;
            assert!(!packed.is_err());

            let packed = packed.unwrap();
            assert_eq!(registry.detect_envelope_type(&packed).unwrap(), env);

            let unpacked = registry.unpack(&packed).await;
            assert!(!unpacked.is_err());

            let (unpacked_message, unpacked_env) = unpacked.unwrap();
            assert_eq!(unpacked_env, env);
            assert_eq!(unpacked_message, message.stamp(env));
        }
    }

    #[tokio::test]
    async fn test_zkp_envelope_through_registry() {
        let zkp = ZkpPacker::new(
            Arc::new(fake_backend(true)),
            Arc::new(fake_loader()),
            Arc::new(fake_preparer()),
            Arc::new(accepting_state()),
            Arc::new(DidIdentityDecoder::new(ZKP_METHOD)),
        )
        .with_binding(ProvingBinding::groth16(CircuitId::AuthV2));

        let mut registry = Registry::new();
        registry.register(vec![Arc::new(PlainPacker::new()), Arc::new(zkp)]);

        let message = Message::new("ping")
            .with_from("did:example:alice")
            .with_body(json!({}));
        let params = PackerParams::ZeroKnowledgeProof(ZkpParams::new(ProvingBinding::groth16(
            CircuitId::AuthV2,
        )));

        let packed = registry
            .pack(EnvelopeType::ZeroKnowledgeProof, &message, &params)
            .await;
        assert!(!packed.is_err());

        let packed = packed.unwrap();
        assert_eq!(
            registry.detect_envelope_type(&packed).unwrap(),
            EnvelopeType::ZeroKnowledgeProof
        );

        let unpacked = registry.unpack(&packed).await;
        assert!(!unpacked.is_err());

        let (unpacked_message, env) = unpacked.unwrap();
        assert_eq!(env, EnvelopeType::ZeroKnowledgeProof);
        assert_eq!(unpacked_message.from(), Some("did:example:alice"));
        assert_eq!(
            unpacked_message,
            message.stamp(EnvelopeType::ZeroKnowledgeProof)
        );

        let token = String::from_utf8(packed).unwrap();
        let parts: Vec<&str> = token.split(jose::COMPACT_SEPARATOR).collect();
        let forged = message
            .clone()
            .with_from("did:example:alicf")
            .stamp(EnvelopeType::ZeroKnowledgeProof);
        let forged_payload = serde_json::to_vec(&forged).unwrap();
        let forged_token = format!(
            "{}.{}.{}",
            parts[0],
            jose::encode_segment(&forged_payload),
            parts[2]
        );

        let rejected = registry.unpack(forged_token.as_bytes()).await;
        assert!(matches!(
            rejected.unwrap_err(),
            PackerError::SenderMismatch(_)
        ))
    }

    #[test]
    fn test_detect_compact_zkp_header() {
        let header = jose::encode_json(&json!({
            "alg": "groth16",
            "circuit": "authV2",
            "typ": "application/iden3-zkp-json",
        }))
        .unwrap();

        let token = format!("{}.e30.e30", header);
        assert_eq!(
            detect_envelope_type(token.as_bytes()).unwrap(),
            EnvelopeType::ZeroKnowledgeProof
        )
    }

    #[test]
    fn test_detect_json_typ_field() {
        let envelope = json!({
            "typ": "application/iden3comm-encrypted-json",
            "ciphertext": "abc",
        });

        assert_eq!(
            detect_envelope_type(envelope.to_string().as_bytes()).unwrap(),
            EnvelopeType::Encrypted
        )
    }

    #[test]
    fn test_detect_same_header_in_both_shapes() {
        let header = jose::encode_json(&json!({
            "alg": "EdDSA",
            "kid": "did:example:alice#auth-1",
            "typ": "application/iden3comm-signed-json",
        }))
        .unwrap();

        let compact = format!("{}.e30.c2ln", header);
        let serialized = json!({
            "protected": header,
            "payload": "e30",
            "signature": "c2ln",
        });

        let from_compact = detect_envelope_type(compact.as_bytes()).unwrap();
        let from_json = detect_envelope_type(serialized.to_string().as_bytes()).unwrap();
        assert_eq!(from_compact, EnvelopeType::Signed);
        assert_eq!(from_compact, from_json)
    }

    #[test]
    fn test_detect_unrecognized() {
        let unknown_header = jose::encode_json(&json!({"typ": "text/plain"})).unwrap();
        let cases: Vec<Vec<u8>> = vec![
            b"".to_vec(),
            b"   ".to_vec(),
            b"{broken".to_vec(),
            b"{\"id\":\"1\"}".to_vec(),
            b"!!.payload.sig".to_vec(),
            format!("{}.e30.e30", unknown_header).into_bytes(),
            vec![0xff, 0xfe],
        ];

        for case in cases {
            assert!(matches!(
                detect_envelope_type(&case).unwrap_err(),
                PackerError::UnrecognizedEnvelope(_)
            ))
        }
    }

    #[tokio::test]
    async fn test_no_packer_for_type() {
        let mut registry = Registry::new();
        registry.register(vec![Arc::new(PlainPacker::new())]);

        let packed = registry
            .pack(
                EnvelopeType::Signed,
                &build_message(),
                &PackerParams::Signed(SigningParams::default()),
            )
            .await;
        assert!(matches!(
            packed.unwrap_err(),
            PackerError::NoPackerForType(_)
        ));

        let header = jose::encode_json(&json!({"typ": "application/iden3comm-signed-json"})).unwrap();
        let unpacked = registry
            .unpack(format!("{}.e30.e30", header).as_bytes())
            .await;
        assert!(matches!(
            unpacked.unwrap_err(),
            PackerError::NoPackerForType(_)
        ))
    }

    #[tokio::test]
    async fn test_pack_mismatched_params() {
        let mut registry = Registry::new();
        registry.register(vec![Arc::new(PlainPacker::new())]);

        let packed = registry
            .pack(
                EnvelopeType::Plain,
                &build_message(),
                &PackerParams::Signed(SigningParams::default()),
            )
            .await;
        assert!(matches!(
            packed.unwrap_err(),
            PackerError::MissingParameter(_)
        ))
    }

    #[tokio::test]
    async fn test_unrecognized_envelope_never_reaches_packer() {
        let mut packer = MockFakePacker::new();
        packer
            .expect_envelope_type()
            .return_const(EnvelopeType::Plain);
        packer.expect_unpack().never();

        let mut registry = Registry::new();
        registry.register(vec![Arc::new(packer)]);

        let unpacked = registry.unpack(b"not-an-envelope").await;
        assert!(matches!(
            unpacked.unwrap_err(),
            PackerError::UnrecognizedEnvelope(_)
        ))
    }

    #[tokio::test]
    async fn test_last_registration_wins() {
        let mut first = MockFakePacker::new();
        first
            .expect_envelope_type()
            .return_const(EnvelopeType::Plain);
        first.expect_unpack().never();

        let mut second = MockFakePacker::new();
        second
            .expect_envelope_type()
            .return_const(EnvelopeType::Plain);
        second
            .expect_unpack()
            .times(1)
            .returning(|_| Ok(Message::new("https://didcomm.org/discover-features/2.0/queries")));

        let mut registry = Registry::new();
        registry.register(vec![Arc::new(first)]);
        registry.register(vec![Arc::new(second)]);

        let envelope = json!({
            "id": "1",
            "typ": "application/iden3comm-plain-json",
            "type": "https://didcomm.org/discover-features/2.0/queries",
        });
        let unpacked = registry.unpack(envelope.to_string().as_bytes()).await;
        assert!(!unpacked.is_err());
        assert_eq!(unpacked.unwrap().1, EnvelopeType::Plain)
    }

    #[test]
    fn test_supported_profiles() {
        let alice = TestIdentity::new("did:example:alice", 1);
        let bob = TestIdentity::new("did:example:bob", 2);
        let registry = build_registry(&alice, &bob);

        assert_eq!(
            registry.supported_profiles(),
            vec![
                "iden3comm/v1;env=application/iden3comm-plain-json".to_string(),
                "iden3comm/v1;env=application/iden3comm-signed-json;alg=EdDSA".to_string(),
                "iden3comm/v1;env=application/iden3comm-encrypted-json;alg=ECDH-ES+XC20PKW"
                    .to_string(),
            ]
        );

        assert!(registry.supports("iden3comm/v1;env=application/iden3comm-signed-json"));
        assert!(!registry.supports("iden3comm/v1;env=application/iden3comm-signed-json;alg=ES256K"));
        assert!(!registry.supports("iden3comm/v1;env=application/iden3-zkp-json"));
    }

    #[test]
    fn test_negotiate() {
        let alice = TestIdentity::new("did:example:alice", 1);
        let bob = TestIdentity::new("did:example:bob", 2);
        let registry = build_registry(&alice, &bob);

        let accept = vec![
            "garbage".to_string(),
            "iden3comm/v1;env=application/iden3-zkp-json;circuits=authV2".to_string(),
            "iden3comm/v1;env=application/iden3comm-signed-json;alg=ES256K,EdDSA".to_string(),
            "iden3comm/v1;env=application/iden3comm-plain-json".to_string(),
        ];

        let selected = registry.negotiate(&accept);
        assert!(!selected.is_err());

        let selected = selected.unwrap();
        assert_eq!(selected.env, EnvelopeType::Signed);
        assert_eq!(
            selected.alg,
            Some(vec![Algorithm::ES256K, Algorithm::EdDSA])
        )
    }

    #[test]
    fn test_negotiate_fallback_and_failure() {
        let alice = TestIdentity::new("did:example:alice", 1);
        let bob = TestIdentity::new("did:example:bob", 2);
        let registry = build_registry(&alice, &bob);

        let selected = registry.negotiate(&[]);
        assert_eq!(selected.unwrap().env, EnvelopeType::Plain);

        let accept = vec!["iden3comm/v1;env=application/iden3-zkp-json".to_string()];
        assert!(matches!(
            registry.negotiate(&accept).unwrap_err(),
            ProfileError::NoMatchingProfile(_)
        ));

        let empty = Registry::new();
        assert!(matches!(
            empty.negotiate(&[]).unwrap_err(),
            ProfileError::NoMatchingProfile(_)
        ))
    }
}
