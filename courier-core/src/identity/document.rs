use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

use rst_common::standard::serde::{self, Deserialize, Serialize};

use super::types::{IdentityError, KeyID};

pub const KTY_OKP: &str = "OKP";
pub const CURVE_ED25519: &str = "Ed25519";
pub const CURVE_X25519: &str = "X25519";

pub const METHOD_TYPE_JWK: &str = "JsonWebKey2020";

/// `Jwk` is the public key form used by the verification methods, only octet key pairs are
/// supported which means `x` holds the raw public key encoded with base64url
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(crate = "self::serde")]
pub struct Jwk {
    pub kty: String,
    pub crv: String,
    pub x: String,
}

impl Jwk {
    pub fn okp(crv: &str, public_key: &[u8]) -> Self {
        Self {
            kty: KTY_OKP.to_string(),
            crv: crv.to_string(),
            x: URL_SAFE_NO_PAD.encode(public_key),
        }
    }

    pub fn public_key_bytes(&self) -> Result<[u8; 32], IdentityError> {
        if self.kty != KTY_OKP {
            return Err(IdentityError::InvalidKey(format!(
                "unsupported key type: {}",
                self.kty
            )));
        }

        let decoded = URL_SAFE_NO_PAD
            .decode(&self.x)
            .map_err(|err| IdentityError::InvalidKey(err.to_string()))?;

        decoded.as_slice().try_into().map_err(|_| {
            IdentityError::InvalidKey(format!("invalid public key length: {}", decoded.len()))
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(crate = "self::serde")]
pub struct VerificationMethod {
    pub id: String,

    #[serde(rename = "type")]
    pub method_type: String,

    pub controller: String,

    #[serde(rename = "publicKeyJwk")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_jwk: Option<Jwk>,
}

impl VerificationMethod {
    pub fn new(kid: &KeyID, controller: &str, jwk: Jwk) -> Self {
        Self {
            id: kid.as_str().to_string(),
            method_type: METHOD_TYPE_JWK.to_string(),
            controller: controller.to_string(),
            public_key_jwk: Some(jwk),
        }
    }

    pub fn has_curve(&self, crv: &str) -> bool {
        self.public_key_jwk
            .as_ref()
            .map(|jwk| jwk.crv == crv)
            .unwrap_or(false)
    }

    pub fn public_key_bytes(&self) -> Result<[u8; 32], IdentityError> {
        self.public_key_jwk
            .as_ref()
            .ok_or(IdentityError::InvalidKey(format!(
                "missing public key for method: {}",
                self.id
            )))?
            .public_key_bytes()
    }
}

/// `DidDocument` is a minimal view of a resolved `DID Doc`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(crate = "self::serde")]
pub struct DidDocument {
    pub id: String,

    #[serde(default)]
    pub authentication: Vec<VerificationMethod>,

    #[serde(rename = "keyAgreement")]
    #[serde(default)]
    pub key_agreement: Vec<VerificationMethod>,
}

impl DidDocument {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            authentication: Vec::new(),
            key_agreement: Vec::new(),
        }
    }

    pub fn add_authentication(&mut self, method: VerificationMethod) -> &mut Self {
        self.authentication.push(method);
        self
    }

    pub fn add_key_agreement(&mut self, method: VerificationMethod) -> &mut Self {
        self.key_agreement.push(method);
        self
    }

    pub fn find_authentication(&self, kid: &KeyID) -> Option<&VerificationMethod> {
        self.authentication
            .iter()
            .find(|method| method.id == kid.as_str())
    }

    /// `first_authentication` returns the first authentication method using given curve
    pub fn first_authentication(&self, crv: &str) -> Option<&VerificationMethod> {
        self.authentication.iter().find(|method| method.has_curve(crv))
    }

    pub fn key_agreements(&self, crv: &str) -> Vec<&VerificationMethod> {
        self.key_agreement
            .iter()
            .filter(|method| method.has_curve(crv))
            .collect()
    }
}
