//! `identity` defines the collaborator contracts used by the packers to reach identity data
//!
//! Resolving a `DID Document` over the network and storing private key material are not part
//! of this crate, both are consumed through [`DidResolver`] and [`KeyStore`]. The [`DidDocument`]
//! shape keeps only the verification relationships used by the packers: `authentication` for
//! signed envelopes and `keyAgreement` for encrypted envelopes.
pub mod document;
pub mod types;

pub use document::{DidDocument, Jwk, VerificationMethod};
pub use types::{DidResolver, IdentityError, KeyID, KeyMaterial, KeyStore};
