use std::str::FromStr;
use std::sync::Arc;

use rst_common::standard::chrono::Utc;
use rst_common::with_logging::log::debug;

use crate::envelope::Message;

use super::types::{DispatchError, Handler, HandlerContext, ProtocolMessageType};

/// `Dispatcher` holds an ordered, immutable chain of handlers
pub struct Dispatcher {
    handlers: Vec<Arc<dyn Handler>>,
}

impl Dispatcher {
    pub fn new(handlers: Vec<Arc<dyn Handler>>) -> Self {
        Self { handlers }
    }

    /// `message_types` lists every protocol message type handled by the chain, following
    /// the handlers order
    pub fn message_types(&self) -> Vec<ProtocolMessageType> {
        let mut message_types: Vec<ProtocolMessageType> = Vec::new();
        for handler in self.handlers.iter() {
            for message_type in handler.message_types() {
                if !message_types.contains(&message_type) {
                    message_types.push(message_type);
                }
            }
        }

        message_types
    }

    pub fn handles(&self, message_type: ProtocolMessageType) -> bool {
        self.handlers
            .iter()
            .any(|handler| handler.message_types().contains(&message_type))
    }

    pub async fn dispatch(
        &self,
        message: &Message,
        ctx: &HandlerContext,
    ) -> Result<Option<Message>, DispatchError> {
        let message_type = ProtocolMessageType::from_str(message.message_type())?;

        if message.is_expired(Utc::now().timestamp()) {
            return Err(DispatchError::MessageExpired(message.id().to_string()));
        }

        for (position, handler) in self.handlers.iter().enumerate() {
            if !handler.message_types().contains(&message_type) {
                continue;
            }

            debug!(
                "[dispatcher] message {} handled by handler #{}",
                message.id(),
                position
            );
            return handler.handle(message, ctx).await;
        }

        Err(DispatchError::HandlerNotFound(message_type.to_string()))
    }
}
