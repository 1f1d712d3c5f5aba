//! `prople-courier-core` is the messaging core of `prople/courier`
//!
//! It provides the building blocks used by an agent to exchange protocol messages with
//! other identity holders, issuers and verifiers:
//!
//! - [`envelope`], the protocol [`envelope::Message`] shape and the closed set of envelope types
//! - [`profile`], the accept-profile negotiation grammar
//! - [`packer`], envelope codecs (plain, signed, zero-knowledge-proof, encrypted) and their registry
//! - [`dispatch`], the handler chain used to route an unpacked message and produce its reply
//! - [`identity`], the narrow collaborator contracts used to resolve DID documents and keys
//! - [`config`], the TOML configuration consumed by the packers
pub mod config;
pub mod dispatch;
pub mod envelope;
pub mod identity;
pub mod packer;
pub mod profile;
