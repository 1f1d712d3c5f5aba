use std::sync::Arc;

use rst_common::standard::async_trait::async_trait;
use rst_common::standard::serde_json::Value;
use rst_common::with_logging::log::debug;

use crate::dispatch::types::{DispatchError, Handler, HandlerContext, ProtocolMessageType};
use crate::envelope::Message;

/// `PaymentProcessor` settles payment requests and checks received payments
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// `pay` returns the payment body sent back to the requester
    async fn pay(&self, request: &Message, ctx: &HandlerContext) -> Result<Value, DispatchError>;

    async fn verify(&self, payment: &Message, ctx: &HandlerContext) -> Result<(), DispatchError>;
}

pub struct PaymentHandler {
    processor: Arc<dyn PaymentProcessor>,
}

impl PaymentHandler {
    pub fn new(processor: Arc<dyn PaymentProcessor>) -> Self {
        Self { processor }
    }
}

#[async_trait]
impl Handler for PaymentHandler {
    fn message_types(&self) -> Vec<ProtocolMessageType> {
        vec![
            ProtocolMessageType::PaymentRequest,
            ProtocolMessageType::Payment,
        ]
    }

    async fn handle(
        &self,
        message: &Message,
        ctx: &HandlerContext,
    ) -> Result<Option<Message>, DispatchError> {
        if message.message_type() == ProtocolMessageType::Payment.as_uri() {
            self.processor.verify(message, ctx).await?;
            debug!("[handler:payment] payment accepted: {}", message.id());
            return Ok(None);
        }

        let body = self.processor.pay(message, ctx).await?;
        let reply = message
            .reply(ProtocolMessageType::Payment.as_uri(), body)
            .with_from(&ctx.did);

        debug!("[handler:payment] paid request: {}", message.id());
        Ok(Some(reply))
    }
}
