//! `envelope` holds the protocol message shape shared by every packer and handler
//!
//! A [`Message`] is created by message builders, packed into one of the [`EnvelopeType`]
//! wire formats, and rebuilt from the envelope on the receiver side. The `body` is kept
//! opaque at this layer, business handlers own the typed schema per protocol message type.
pub mod types;
pub use types::{EnvelopeError, EnvelopeType};

mod message;
pub use message::{Attachment, Message};
