use std::fmt;

use derive_more::{AsRef, From, Into};
use the_newtype::Newtype;

use rst_common::standard::async_trait::async_trait;
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::with_errors::thiserror::{self, Error};

use super::document::DidDocument;

#[derive(Debug, PartialEq, Error, Clone)]
pub enum IdentityError {
    #[error("did not found: {0}")]
    NotFound(String),

    #[error("resolver error: {0}")]
    ResolverError(String),

    #[error("key store error: {0}")]
    KeyStoreError(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),
}

/// `KeyID` is a verification method identifier, a `DID URL` with a fragment
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Newtype, From, Into, AsRef)]
#[serde(crate = "self::serde")]
pub struct KeyID(String);

impl KeyID {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `did` returns the `DID` part of the key id, without its fragment
    pub fn did(&self) -> &str {
        self.0
            .split_once('#')
            .map(|(did, _)| did)
            .unwrap_or(&self.0)
    }
}

/// `KeyMaterial` is a private key returned by the [`KeyStore`]
#[derive(Clone, PartialEq)]
pub enum KeyMaterial {
    Ed25519([u8; 32]),
    X25519([u8; 32]),
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyMaterial::Ed25519(_) => f.write_str("KeyMaterial::Ed25519(..)"),
            KeyMaterial::X25519(_) => f.write_str("KeyMaterial::X25519(..)"),
        }
    }
}

/// `DidResolver` resolves a `DID` into its [`DidDocument`]
#[async_trait]
pub trait DidResolver: Send + Sync {
    async fn resolve(&self, did: &str) -> Result<DidDocument, IdentityError>;
}

/// `KeyStore` gives access to the local private keys, indexed by their verification method id.
/// A missing key is not an error, it returns `None`
#[async_trait]
pub trait KeyStore: Send + Sync {
    async fn get(&self, kid: &KeyID) -> Result<Option<KeyMaterial>, IdentityError>;
}
