//! `profile` implements the accept-profile negotiation grammar
//!
//! An accept profile is a compact string used by two parties to agree on a mutually supported
//! combination of protocol version, envelope type, proving circuits and algorithms:
//!
//! ```text
//! iden3comm/v1;env=application/iden3-zkp-json;circuits=authV2,authV3;alg=groth16
//! ```
//!
//! The grammar is pure and synchronous, [`parser::parse`] and [`parser::build`] are inverse
//! of each other for well-formed input.
pub mod parser;
pub mod types;

pub use parser::{build, parse};
pub use types::{
    AcceptProfile, Algorithm, CircuitId, PackerCapabilities, ProfileError, ProtocolVersion,
    SignalLayout,
};
