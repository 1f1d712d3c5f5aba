use std::sync::Arc;

use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};
use hkdf::Hkdf;
use rand::RngCore;
use sha2::Sha256;
use x25519_dalek::{PublicKey, StaticSecret};

use rst_common::standard::async_trait::async_trait;
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json;
use rst_common::with_logging::log::debug;

use crate::envelope::{EnvelopeType, Message};
use crate::identity::document::CURVE_X25519;
use crate::identity::{DidResolver, Jwk, KeyID, KeyMaterial, KeyStore};
use crate::profile::{Algorithm, PackerCapabilities};

use super::jose;
use super::types::{Packer, PackerError, PackerParams, Recipient};

const CONTENT_ENCRYPTION: &str = "XC20P";
const KEY_SIZE: usize = 32;
const NONCE_SIZE: usize = 24;
const TAG_SIZE: usize = 16;

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(crate = "self::serde")]
struct ProtectedHeader {
    typ: String,
    enc: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(crate = "self::serde")]
struct RecipientHeader {
    alg: String,
    kid: String,
    epk: Jwk,
    iv: String,
    tag: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(crate = "self::serde")]
struct RecipientEntry {
    header: RecipientHeader,
    encrypted_key: String,
}

/// `JsonWebEncryption` is the general JSON serialization of a multi-recipient envelope
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(crate = "self::serde")]
struct JsonWebEncryption {
    protected: String,
    recipients: Vec<RecipientEntry>,
    iv: String,
    ciphertext: String,
    tag: String,
}

struct Sealed {
    nonce: [u8; NONCE_SIZE],
    ciphertext: Vec<u8>,
    tag: Vec<u8>,
}

fn random_bytes<const N: usize>() -> [u8; N] {
    let mut bytes = [0u8; N];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}

fn seal(key: &[u8], plaintext: &[u8], aad: &[u8]) -> Result<Sealed, PackerError> {
    let cipher = XChaCha20Poly1305::new_from_slice(key)
        .map_err(|err| PackerError::EncryptionError(err.to_string()))?;

    let nonce = random_bytes::<NONCE_SIZE>();
    let mut ciphertext = cipher
        .encrypt(
            XNonce::from_slice(&nonce),
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|err| PackerError::EncryptionError(err.to_string()))?;

    let tag = ciphertext.split_off(ciphertext.len() - TAG_SIZE);
    Ok(Sealed {
        nonce,
        ciphertext,
        tag,
    })
}

fn open(
    key: &[u8],
    nonce: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>, PackerError> {
    if nonce.len() != NONCE_SIZE || tag.len() != TAG_SIZE {
        return Err(PackerError::InvalidEnvelope(
            "invalid nonce or tag length".to_string(),
        ));
    }

    let cipher = XChaCha20Poly1305::new_from_slice(key)
        .map_err(|err| PackerError::DecryptionFailed(err.to_string()))?;

    let mut sealed = ciphertext.to_vec();
    sealed.extend_from_slice(tag);

    cipher
        .decrypt(
            XNonce::from_slice(nonce),
            Payload {
                msg: &sealed,
                aad,
            },
        )
        .map_err(|err| PackerError::DecryptionFailed(err.to_string()))
}

/// `derive_kek` builds the per recipient key encryption key from the agreed secret, salted
/// with the ephemeral public key and bound to the algorithm and recipient key id
fn derive_kek(
    shared_secret: &[u8],
    ephemeral_public: &[u8],
    kid: &str,
) -> Result<[u8; KEY_SIZE], PackerError> {
    let info = format!("{}|{}", Algorithm::EcdhEsXc20pkw, kid);
    let hkdf = Hkdf::<Sha256>::new(Some(ephemeral_public), shared_secret);

    let mut kek = [0u8; KEY_SIZE];
    hkdf.expand(info.as_bytes(), &mut kek)
        .map_err(|err| PackerError::EncryptionError(err.to_string()))?;

    Ok(kek)
}

/// `EncryptedPacker` seals the message for one or more recipients
///
/// The content is encrypted once with a random content key, the content key is then wrapped
/// for each recipient using an ephemeral `X25519` agreement with the recipient's
/// `keyAgreement` key. The protected header is authenticated as additional data
pub struct EncryptedPacker {
    resolver: Arc<dyn DidResolver>,
    keys: Arc<dyn KeyStore>,
}

impl EncryptedPacker {
    pub fn new(resolver: Arc<dyn DidResolver>, keys: Arc<dyn KeyStore>) -> Self {
        Self { resolver, keys }
    }

    async fn recipient_key(&self, recipient: &Recipient) -> Result<(KeyID, PublicKey), PackerError> {
        let doc = self.resolver.resolve(&recipient.did).await?;
        let candidates = doc.key_agreements(CURVE_X25519);

        let method = match &recipient.kid {
            Some(kid) => candidates
                .into_iter()
                .find(|method| method.id == kid.as_str()),
            None => candidates.into_iter().next(),
        }
        .ok_or(PackerError::RecipientKeyNotFound(recipient.did.clone()))?;

        let public_key = method
            .public_key_bytes()
            .map_err(|err| PackerError::RecipientKeyNotFound(err.to_string()))?;

        Ok((KeyID::from(method.id.clone()), PublicKey::from(public_key)))
    }

    fn wrap_key(
        &self,
        cek: &[u8],
        kid: &KeyID,
        recipient_public: &PublicKey,
    ) -> Result<RecipientEntry, PackerError> {
        let ephemeral = StaticSecret::from(random_bytes::<KEY_SIZE>());
        let ephemeral_public = PublicKey::from(&ephemeral);
        let shared = ephemeral.diffie_hellman(recipient_public);

        let kek = derive_kek(shared.as_bytes(), ephemeral_public.as_bytes(), kid.as_str())?;
        let wrapped = seal(&kek, cek, &[])?;

        Ok(RecipientEntry {
            header: RecipientHeader {
                alg: Algorithm::EcdhEsXc20pkw.to_string(),
                kid: kid.as_str().to_string(),
                epk: Jwk::okp(CURVE_X25519, ephemeral_public.as_bytes()),
                iv: jose::encode_segment(&wrapped.nonce),
                tag: jose::encode_segment(&wrapped.tag),
            },
            encrypted_key: jose::encode_segment(&wrapped.ciphertext),
        })
    }

    fn unwrap_key(&self, entry: &RecipientEntry, secret: [u8; KEY_SIZE]) -> Result<Vec<u8>, PackerError> {
        if entry.header.alg != Algorithm::EcdhEsXc20pkw.as_str() {
            return Err(PackerError::UnsupportedAlgorithm(entry.header.alg.clone()));
        }

        let ephemeral_public = entry
            .header
            .epk
            .public_key_bytes()
            .map_err(|err| PackerError::InvalidEnvelope(err.to_string()))?;

        let shared = StaticSecret::from(secret).diffie_hellman(&PublicKey::from(ephemeral_public));
        let kek = derive_kek(shared.as_bytes(), &ephemeral_public, &entry.header.kid)?;

        open(
            &kek,
            &jose::decode_segment(&entry.header.iv)?,
            &jose::decode_segment(&entry.encrypted_key)?,
            &jose::decode_segment(&entry.header.tag)?,
            &[],
        )
    }

    /// `find_recipient` returns the first recipient entry the local key store holds a key for
    async fn find_recipient<'a>(
        &self,
        recipients: &'a [RecipientEntry],
    ) -> Result<(&'a RecipientEntry, [u8; KEY_SIZE]), PackerError> {
        for entry in recipients {
            let kid = KeyID::from(entry.header.kid.clone());
            if let Some(KeyMaterial::X25519(secret)) = self.keys.get(&kid).await? {
                return Ok((entry, secret));
            }
        }

        Err(PackerError::RecipientKeyNotFound(
            "no local key for any recipient".to_string(),
        ))
    }
}

#[async_trait]
impl Packer for EncryptedPacker {
    fn envelope_type(&self) -> EnvelopeType {
        EnvelopeType::Encrypted
    }

    fn capabilities(&self) -> PackerCapabilities {
        PackerCapabilities::new(EnvelopeType::Encrypted)
            .with_algorithms(vec![Algorithm::EcdhEsXc20pkw])
    }

    async fn pack(&self, message: &Message, params: &PackerParams) -> Result<Vec<u8>, PackerError> {
        let params = match params {
            PackerParams::Encrypted(params) => params,
            _ => {
                return Err(PackerError::MissingParameter(
                    "encrypted packer requires encryption params".to_string(),
                ))
            }
        };

        if params.alg != Algorithm::EcdhEsXc20pkw {
            return Err(PackerError::UnsupportedAlgorithm(params.alg.to_string()));
        }

        if params.recipients.is_empty() {
            return Err(PackerError::MissingParameter("recipients".to_string()));
        }

        let protected = jose::encode_json(&ProtectedHeader {
            typ: EnvelopeType::Encrypted.to_string(),
            enc: CONTENT_ENCRYPTION.to_string(),
        })?;

        let plaintext = serde_json::to_vec(&message.stamp(EnvelopeType::Encrypted))
            .map_err(|err| PackerError::InvalidEnvelope(err.to_string()))?;

        let cek = random_bytes::<KEY_SIZE>();
        let content = seal(&cek, &plaintext, protected.as_bytes())?;

        let mut recipients = Vec::with_capacity(params.recipients.len());
        for recipient in params.recipients.iter() {
            let (kid, public_key) = self.recipient_key(recipient).await?;
            recipients.push(self.wrap_key(&cek, &kid, &public_key)?);
        }

        debug!(
            "[packer:encrypted] sealed message {} for {} recipients",
            message.id(),
            recipients.len()
        );

        let jwe = JsonWebEncryption {
            protected,
            recipients,
            iv: jose::encode_segment(&content.nonce),
            ciphertext: jose::encode_segment(&content.ciphertext),
            tag: jose::encode_segment(&content.tag),
        };

        serde_json::to_vec(&jwe).map_err(|err| PackerError::InvalidEnvelope(err.to_string()))
    }

    async fn unpack(&self, envelope: &[u8]) -> Result<Message, PackerError> {
        let jwe: JsonWebEncryption = serde_json::from_slice(envelope)
            .map_err(|err| PackerError::InvalidEnvelope(err.to_string()))?;

        let protected: ProtectedHeader = jose::decode_json(&jwe.protected)?;
        if protected.typ != EnvelopeType::Encrypted.as_tag() {
            return Err(PackerError::InvalidEnvelope(format!(
                "unexpected envelope tag: {}",
                protected.typ
            )));
        }

        if protected.enc != CONTENT_ENCRYPTION {
            return Err(PackerError::UnsupportedAlgorithm(protected.enc));
        }

        let (entry, secret) = self.find_recipient(&jwe.recipients).await?;
        let cek = self.unwrap_key(entry, secret)?;

        let plaintext = open(
            &cek,
            &jose::decode_segment(&jwe.iv)?,
            &jose::decode_segment(&jwe.ciphertext)?,
            &jose::decode_segment(&jwe.tag)?,
            jwe.protected.as_bytes(),
        )?;

        let message = Message::try_from(plaintext)
            .map_err(|err| PackerError::InvalidEnvelope(err.to_string()))?;

        debug!(
            "[packer:encrypted] opened message {} with {}",
            message.id(),
            entry.header.kid
        );
        Ok(message)
    }
}
