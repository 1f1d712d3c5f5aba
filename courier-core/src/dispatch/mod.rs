//! `dispatch` routes unpacked messages to their handlers
//!
//! The [`Dispatcher`] walks an ordered chain of [`Handler`]. The first handler declaring
//! the message's [`ProtocolMessageType`] handles it, every other handler forwards. A message
//! nobody claims fails with [`DispatchError::HandlerNotFound`].
//!
//! [`Exchange`] is the receiving side entry point: it unpacks raw bytes with the packer
//! [`Registry`](crate::packer::Registry), dispatches the message and packs the optional reply.
pub mod types;
pub use types::{DispatchError, Handler, HandlerContext, ProtocolMessageType};

mod dispatcher;
pub use dispatcher::Dispatcher;

mod exchange;
pub use exchange::{Exchange, ExchangeError};

pub mod handlers;
