use std::sync::Arc;

use rst_common::with_errors::thiserror::{self, Error};
use rst_common::with_logging::log::debug;

use crate::packer::{PackerError, Registry};

use super::dispatcher::Dispatcher;
use super::types::{DispatchError, HandlerContext};

#[derive(Debug, PartialEq, Error, Clone)]
pub enum ExchangeError {
    #[error("packer error: {0}")]
    PackerError(#[from] PackerError),

    #[error("dispatch error: {0}")]
    DispatchError(#[from] DispatchError),
}

/// `Exchange` glues the packer registry and the dispatcher for incoming envelopes
pub struct Exchange {
    registry: Arc<Registry>,
    dispatcher: Arc<Dispatcher>,
}

impl Exchange {
    pub fn new(registry: Arc<Registry>, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            registry,
            dispatcher,
        }
    }

    /// `process` unpacks the envelope, dispatches the message, and packs the reply produced
    /// by the handler using the envelope type and params from the context
    pub async fn process(
        &self,
        envelope: &[u8],
        ctx: &HandlerContext,
    ) -> Result<Option<Vec<u8>>, ExchangeError> {
        let (message, env) = self.registry.unpack(envelope).await?;
        debug!(
            "[exchange] received message {} through {}",
            message.id(),
            env
        );

        let reply = match self.dispatcher.dispatch(&message, ctx).await? {
            Some(reply) => reply,
            None => return Ok(None),
        };

        let packed = self
            .registry
            .pack(ctx.reply_envelope(), &reply, ctx.reply_params())
            .await?;

        debug!(
            "[exchange] replied to {} with {}",
            message.id(),
            reply.message_type()
        );
        Ok(Some(packed))
    }
}
