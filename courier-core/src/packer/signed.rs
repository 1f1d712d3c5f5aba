use std::sync::Arc;

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

use rst_common::standard::async_trait::async_trait;
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json;
use rst_common::with_logging::log::debug;

use crate::envelope::{EnvelopeType, Message};
use crate::identity::document::CURVE_ED25519;
use crate::identity::{DidResolver, KeyID, KeyMaterial, KeyStore};
use crate::profile::{Algorithm, PackerCapabilities};

use super::jose;
use super::types::{Packer, PackerError, PackerParams};

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(crate = "self::serde")]
struct SignedHeader {
    alg: String,
    kid: String,
    typ: String,
}

/// `SignedPacker` produces a compact token `header.payload.signature` where the signature is
/// computed with the sender's `Ed25519` authentication key
///
/// On unpack, the `kid` header must belong to the message sender and must be listed in the
/// sender's `authentication` methods
pub struct SignedPacker {
    resolver: Arc<dyn DidResolver>,
    keys: Arc<dyn KeyStore>,
}

impl SignedPacker {
    pub fn new(resolver: Arc<dyn DidResolver>, keys: Arc<dyn KeyStore>) -> Self {
        Self { resolver, keys }
    }

    async fn signing_key(
        &self,
        from: &str,
        kid: Option<&KeyID>,
    ) -> Result<(KeyID, SigningKey), PackerError> {
        let doc = self.resolver.resolve(from).await?;
        let method = match kid {
            Some(kid) => doc.find_authentication(kid),
            None => doc.first_authentication(CURVE_ED25519),
        }
        .ok_or(PackerError::KeyNotFound(format!(
            "no authentication method for: {}",
            from
        )))?;

        let kid = KeyID::from(method.id.clone());
        let material = self
            .keys
            .get(&kid)
            .await?
            .ok_or(PackerError::KeyNotFound(kid.as_str().to_string()))?;

        match material {
            KeyMaterial::Ed25519(secret) => Ok((kid, SigningKey::from_bytes(&secret))),
            _ => Err(PackerError::KeyNotFound(format!(
                "not an Ed25519 key: {}",
                kid.as_str()
            ))),
        }
    }

    async fn verifying_key(&self, from: &str, kid: &KeyID) -> Result<VerifyingKey, PackerError> {
        let doc = self.resolver.resolve(from).await?;
        let method = doc
            .find_authentication(kid)
            .filter(|method| method.has_curve(CURVE_ED25519))
            .ok_or(PackerError::KeyNotFound(kid.as_str().to_string()))?;

        let public_key = method.public_key_bytes()?;
        VerifyingKey::from_bytes(&public_key)
            .map_err(|err| PackerError::KeyNotFound(format!("{}: {}", kid.as_str(), err)))
    }
}

#[async_trait]
impl Packer for SignedPacker {
    fn envelope_type(&self) -> EnvelopeType {
        EnvelopeType::Signed
    }

    fn capabilities(&self) -> PackerCapabilities {
        PackerCapabilities::new(EnvelopeType::Signed).with_algorithms(vec![Algorithm::EdDSA])
    }

    async fn pack(&self, message: &Message, params: &PackerParams) -> Result<Vec<u8>, PackerError> {
        let params = match params {
            PackerParams::Signed(params) => params,
            _ => {
                return Err(PackerError::MissingParameter(
                    "signed packer requires signing params".to_string(),
                ))
            }
        };

        if params.alg != Algorithm::EdDSA {
            return Err(PackerError::UnsupportedAlgorithm(params.alg.to_string()));
        }

        let from = message
            .from()
            .ok_or(PackerError::MissingParameter("from".to_string()))?;

        if let Some(kid) = &params.kid {
            if kid.did() != from {
                return Err(PackerError::SenderMismatch(format!(
                    "key {} does not belong to {}",
                    kid.as_str(),
                    from
                )));
            }
        }

        let (kid, signing_key) = self.signing_key(from, params.kid.as_ref()).await?;

        let header = SignedHeader {
            alg: Algorithm::EdDSA.to_string(),
            kid: kid.as_str().to_string(),
            typ: EnvelopeType::Signed.to_string(),
        };

        let payload = serde_json::to_vec(&message.stamp(EnvelopeType::Signed))
            .map_err(|err| PackerError::InvalidEnvelope(err.to_string()))?;

        let signing_input = format!(
            "{}{}{}",
            jose::encode_json(&header)?,
            jose::COMPACT_SEPARATOR,
            jose::encode_segment(&payload)
        );

        let signature = signing_key.sign(signing_input.as_bytes());
        debug!("[packer:signed] signed message {} with {}", message.id(), kid.as_str());

        let token = format!(
            "{}{}{}",
            signing_input,
            jose::COMPACT_SEPARATOR,
            jose::encode_segment(&signature.to_bytes())
        );

        Ok(token.into_bytes())
    }

    async fn unpack(&self, envelope: &[u8]) -> Result<Message, PackerError> {
        let [header_segment, payload_segment, signature_segment] = jose::split_compact(envelope)?;

        let header: SignedHeader = jose::decode_json(header_segment)?;
        if header.typ != EnvelopeType::Signed.as_tag() {
            return Err(PackerError::InvalidEnvelope(format!(
                "unexpected envelope tag: {}",
                header.typ
            )));
        }

        if header.alg != Algorithm::EdDSA.as_str() {
            return Err(PackerError::UnsupportedAlgorithm(header.alg));
        }

        let payload = jose::decode_segment(payload_segment)?;
        let message = Message::try_from(payload)
            .map_err(|err| PackerError::InvalidEnvelope(err.to_string()))?;

        let signature_bytes = jose::decode_segment(signature_segment)?;
        let signature = Signature::from_slice(&signature_bytes)
            .map_err(|err| PackerError::InvalidEnvelope(err.to_string()))?;

        let from = message
            .from()
            .ok_or(PackerError::InvalidEnvelope("missing sender".to_string()))?;

        let kid = KeyID::from(header.kid);
        if kid.did() != from {
            return Err(PackerError::SenderMismatch(format!(
                "key {} does not belong to {}",
                kid.as_str(),
                from
            )));
        }

        let verifying_key = self.verifying_key(from, &kid).await?;
        let signing_input = format!(
            "{}{}{}",
            header_segment,
            jose::COMPACT_SEPARATOR,
            payload_segment
        );

        verifying_key
            .verify(signing_input.as_bytes(), &signature)
            .map_err(|err| PackerError::SignatureInvalid(err.to_string()))?;

        debug!("[packer:signed] verified message {} from {}", message.id(), from);
        Ok(message)
    }
}
