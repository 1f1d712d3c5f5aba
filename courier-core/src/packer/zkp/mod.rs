//! `zkp` implements the proof carrying envelope
//!
//! The proving system itself lives outside of this crate. The [`ZkpPacker`] only orchestrates
//! the collaborators ([`InputsPreparer`], [`ProvingBackend`], [`KeyLoader`], [`StateVerifier`],
//! [`IdentityDecoder`]) and owns the checks binding a proof to the message it travels with.
pub mod types;
pub use types::{
    IdentityDecoder, InputsPreparer, KeyLoader, ProvingBackend, ProvingBinding, StateVerifier,
    ZkProof, ZkpError, ZkpParams,
};

pub mod field;
pub use field::{challenge_of, is_challenge_of, DidIdentityDecoder};

mod cache;
pub use cache::KeyCache;

mod packer;
pub use packer::ZkpPacker;
