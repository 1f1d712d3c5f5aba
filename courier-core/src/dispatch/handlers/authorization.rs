use std::sync::Arc;

use rst_common::standard::async_trait::async_trait;
use rst_common::standard::serde_json::Value;
use rst_common::with_logging::log::debug;

use crate::dispatch::types::{DispatchError, Handler, HandlerContext, ProtocolMessageType};
use crate::envelope::Message;

/// `AuthorizationResponder` builds the response body for an authorization request, usually
/// the proofs requested by the verifier
#[async_trait]
pub trait AuthorizationResponder: Send + Sync {
    async fn respond(&self, request: &Message, ctx: &HandlerContext) -> Result<Value, DispatchError>;
}

/// `AuthorizationVerifier` checks an authorization response against the request it answers
#[async_trait]
pub trait AuthorizationVerifier: Send + Sync {
    async fn verify(&self, response: &Message, ctx: &HandlerContext) -> Result<(), DispatchError>;
}

pub struct AuthorizationHandler {
    responder: Arc<dyn AuthorizationResponder>,
    verifier: Arc<dyn AuthorizationVerifier>,
}

impl AuthorizationHandler {
    pub fn new(
        responder: Arc<dyn AuthorizationResponder>,
        verifier: Arc<dyn AuthorizationVerifier>,
    ) -> Self {
        Self {
            responder,
            verifier,
        }
    }
}

#[async_trait]
impl Handler for AuthorizationHandler {
    fn message_types(&self) -> Vec<ProtocolMessageType> {
        vec![
            ProtocolMessageType::AuthorizationRequest,
            ProtocolMessageType::AuthorizationResponse,
        ]
    }

    async fn handle(
        &self,
        message: &Message,
        ctx: &HandlerContext,
    ) -> Result<Option<Message>, DispatchError> {
        if message.message_type() == ProtocolMessageType::AuthorizationResponse.as_uri() {
            self.verifier.verify(message, ctx).await?;
            debug!("[handler:authorization] verified response: {}", message.id());
            return Ok(None);
        }

        let body = self.responder.respond(message, ctx).await?;
        let reply = message
            .reply(ProtocolMessageType::AuthorizationResponse.as_uri(), body)
            .with_from(&ctx.did);

        debug!("[handler:authorization] answered request: {}", message.id());
        Ok(Some(reply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use mockall::mock;

    use rst_common::standard::serde_json::json;
    use rst_common::with_tokio::tokio;

    mock!(
        FakeResponder{}

        #[async_trait]
        impl AuthorizationResponder for FakeResponder {
            async fn respond(&self, request: &Message, ctx: &HandlerContext) -> Result<Value, DispatchError>;
        }
    );

    mock!(
        FakeVerifier{}

        #[async_trait]
        impl AuthorizationVerifier for FakeVerifier {
            async fn verify(&self, response: &Message, ctx: &HandlerContext) -> Result<(), DispatchError>;
        }
    );

    #[tokio::test]
    async fn test_request_replied() {
        let mut responder = MockFakeResponder::new();
        responder
            .expect_respond()
            .times(1)
            .returning(|_, _| Ok(json!({"scope": [{"id": 1}]})));

        let mut verifier = MockFakeVerifier::new();
        verifier.expect_verify().never();

        let handler = AuthorizationHandler::new(Arc::new(responder), Arc::new(verifier));
        let request = Message::new(ProtocolMessageType::AuthorizationRequest.as_uri())
            .with_from("did:example:verifier")
            .with_thid("login-1");

        let reply = handler
            .handle(&request, &HandlerContext::new("did:example:holder"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            reply.message_type(),
            ProtocolMessageType::AuthorizationResponse.as_uri()
        );
        assert_eq!(reply.thid(), Some("login-1"));
        assert_eq!(reply.from(), Some("did:example:holder"));
        assert_eq!(reply.body()["scope"][0]["id"], json!(1))
    }

    #[tokio::test]
    async fn test_response_verified() {
        let mut responder = MockFakeResponder::new();
        responder.expect_respond().never();

        let mut verifier = MockFakeVerifier::new();
        verifier.expect_verify().times(1).returning(|_, _| Ok(()));

        let handler = AuthorizationHandler::new(Arc::new(responder), Arc::new(verifier));
        let response = Message::new(ProtocolMessageType::AuthorizationResponse.as_uri());

        let reply = handler
            .handle(&response, &HandlerContext::new("did:example:verifier"))
            .await;
        assert_eq!(reply.unwrap(), None)
    }

    #[tokio::test]
    async fn test_response_rejected() {
        let responder = MockFakeResponder::new();

        let mut verifier = MockFakeVerifier::new();
        verifier
            .expect_verify()
            .times(1)
            .returning(|_, _| Err(DispatchError::CollaboratorError("unknown request".to_string())));

        let handler = AuthorizationHandler::new(Arc::new(responder), Arc::new(verifier));
        let response = Message::new(ProtocolMessageType::AuthorizationResponse.as_uri());

        let reply = handler
            .handle(&response, &HandlerContext::new("did:example:verifier"))
            .await;
        assert!(matches!(
            reply.unwrap_err(),
            DispatchError::CollaboratorError(_)
        ))
    }
}
