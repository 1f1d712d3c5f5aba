//! `packer` provides the envelope codecs and the [`Registry`] used to select them
//!
//! Each [`Packer`] owns exactly one [`EnvelopeType`](crate::envelope::EnvelopeType):
//!
//! - [`PlainPacker`], no protection at all, used as the negotiation baseline
//! - [`SignedPacker`], detached `EdDSA` signature over a compact token
//! - [`ZkpPacker`], proof-carrying compact token bound to a proving circuit
//! - [`EncryptedPacker`], multi-recipient sealed envelope
//!
//! On receipt, the [`Registry`] sniffs the envelope type from the raw bytes before any
//! cryptographic work happens and delegates to the matching packer.
pub mod types;
pub use types::{EncryptionParams, Packer, PackerError, PackerParams, Recipient, SigningParams};

mod jose;

#[cfg(test)]
pub(crate) mod testing;

mod plain;
pub use plain::PlainPacker;

mod signed;
pub use signed::SignedPacker;

mod encrypted;
pub use encrypted::EncryptedPacker;

pub mod zkp;
pub use zkp::ZkpPacker;

mod registry;
pub use registry::{detect_envelope_type, Registry};
