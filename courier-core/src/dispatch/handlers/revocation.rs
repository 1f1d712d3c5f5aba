use std::sync::Arc;

use rst_common::standard::async_trait::async_trait;
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json::{self, Value};
use rst_common::with_logging::log::debug;

use crate::dispatch::types::{DispatchError, Handler, HandlerContext, ProtocolMessageType};
use crate::envelope::Message;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(crate = "self::serde")]
struct StatusRequestBody {
    revocation_nonce: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(crate = "self::serde")]
struct StatusResponseBody {
    revocation_nonce: u64,
    status: Value,
}

/// `RevocationStatusProvider` looks up the revocation status of a credential nonce of the
/// local identity
#[async_trait]
pub trait RevocationStatusProvider: Send + Sync {
    async fn status(&self, did: &str, nonce: u64) -> Result<Value, DispatchError>;
}

pub struct RevocationStatusHandler {
    provider: Arc<dyn RevocationStatusProvider>,
}

impl RevocationStatusHandler {
    pub fn new(provider: Arc<dyn RevocationStatusProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Handler for RevocationStatusHandler {
    fn message_types(&self) -> Vec<ProtocolMessageType> {
        vec![ProtocolMessageType::RevocationStatusRequest]
    }

    async fn handle(
        &self,
        message: &Message,
        ctx: &HandlerContext,
    ) -> Result<Option<Message>, DispatchError> {
        let body: StatusRequestBody = message
            .body_as()
            .map_err(|err| DispatchError::InvalidBody(err.to_string()))?;

        debug!(
            "[handler:revocation] status request for nonce: {}",
            body.revocation_nonce
        );
        let status = self.provider.status(&ctx.did, body.revocation_nonce).await?;

        let reply_body = serde_json::to_value(StatusResponseBody {
            revocation_nonce: body.revocation_nonce,
            status,
        })
        .map_err(|err| DispatchError::InvalidBody(err.to_string()))?;

        let reply = message
            .reply(
                ProtocolMessageType::RevocationStatusResponse.as_uri(),
                reply_body,
            )
            .with_from(&ctx.did);

        Ok(Some(reply))
    }
}
