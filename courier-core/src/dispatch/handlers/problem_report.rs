use rst_common::standard::async_trait::async_trait;
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::with_logging::log::warn;

use crate::dispatch::types::{DispatchError, Handler, HandlerContext, ProtocolMessageType};
use crate::envelope::Message;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(crate = "self::serde")]
struct ProblemReportBody {
    code: String,

    #[serde(default)]
    comment: Option<String>,
}

/// `ProblemReportHandler` surfaces a peer's problem report as an error of the exchange
#[derive(Debug, Clone, Default)]
pub struct ProblemReportHandler;

impl ProblemReportHandler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Handler for ProblemReportHandler {
    fn message_types(&self) -> Vec<ProtocolMessageType> {
        vec![ProtocolMessageType::ProblemReport]
    }

    async fn handle(
        &self,
        message: &Message,
        _: &HandlerContext,
    ) -> Result<Option<Message>, DispatchError> {
        let body: ProblemReportBody = message
            .body_as()
            .map_err(|err| DispatchError::InvalidBody(err.to_string()))?;

        warn!(
            "[handler:problem_report] {} reported by {}: {}",
            body.code,
            message.from().unwrap_or("unknown"),
            body.comment.as_deref().unwrap_or("-")
        );

        Err(DispatchError::ProblemReported(body.code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rst_common::standard::serde_json::json;
    use rst_common::with_tokio::tokio;

    #[tokio::test]
    async fn test_problem_reported() {
        let handler = ProblemReportHandler::new();
        let message = Message::new(ProtocolMessageType::ProblemReport.as_uri())
            .with_from("did:example:issuer")
            .with_body(json!({"code": "e.p.xfer.cant-use-endpoint", "comment": "offline"}));

        let result = handler
            .handle(&message, &HandlerContext::new("did:example:holder"))
            .await;
        assert_eq!(
            result.unwrap_err(),
            DispatchError::ProblemReported("e.p.xfer.cant-use-endpoint".to_string())
        )
    }

    #[tokio::test]
    async fn test_missing_code() {
        let handler = ProblemReportHandler::new();
        let message = Message::new(ProtocolMessageType::ProblemReport.as_uri())
            .with_body(json!({"comment": "offline"}));

        let result = handler
            .handle(&message, &HandlerContext::new("did:example:holder"))
            .await;
        assert!(matches!(result.unwrap_err(), DispatchError::InvalidBody(_)))
    }
}
