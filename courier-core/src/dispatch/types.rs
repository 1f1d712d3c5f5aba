use std::fmt;
use std::str::FromStr;

use rst_common::standard::async_trait::async_trait;
use rst_common::with_errors::thiserror::{self, Error};

use crate::envelope::{EnvelopeType, Message};
use crate::packer::PackerParams;

#[derive(Debug, PartialEq, Error, Clone)]
pub enum DispatchError {
    #[error("handler not found: {0}")]
    HandlerNotFound(String),

    #[error("message expired: {0}")]
    MessageExpired(String),

    #[error("problem reported: {0}")]
    ProblemReported(String),

    #[error("invalid body: {0}")]
    InvalidBody(String),

    #[error("collaborator error: {0}")]
    CollaboratorError(String),
}

/// `ProtocolMessageType` is the closed set of protocol message tags known by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolMessageType {
    AuthorizationRequest,
    AuthorizationResponse,
    ContractInvokeRequest,
    PaymentRequest,
    Payment,
    ProposalRequest,
    Proposal,
    RevocationStatusRequest,
    RevocationStatusResponse,
    DiscoverFeaturesQueries,
    DiscoverFeaturesDisclose,
    ProblemReport,
    EncryptedIssuanceResponse,
    Invitation,
}

impl ProtocolMessageType {
    pub fn all() -> [ProtocolMessageType; 14] {
        [
            ProtocolMessageType::AuthorizationRequest,
            ProtocolMessageType::AuthorizationResponse,
            ProtocolMessageType::ContractInvokeRequest,
            ProtocolMessageType::PaymentRequest,
            ProtocolMessageType::Payment,
            ProtocolMessageType::ProposalRequest,
            ProtocolMessageType::Proposal,
            ProtocolMessageType::RevocationStatusRequest,
            ProtocolMessageType::RevocationStatusResponse,
            ProtocolMessageType::DiscoverFeaturesQueries,
            ProtocolMessageType::DiscoverFeaturesDisclose,
            ProtocolMessageType::ProblemReport,
            ProtocolMessageType::EncryptedIssuanceResponse,
            ProtocolMessageType::Invitation,
        ]
    }

    pub fn as_uri(&self) -> &'static str {
        match self {
            ProtocolMessageType::AuthorizationRequest => {
                "https://iden3-communication.io/authorization/1.0/request"
            }
            ProtocolMessageType::AuthorizationResponse => {
                "https://iden3-communication.io/authorization/1.0/response"
            }
            ProtocolMessageType::ContractInvokeRequest => {
                "https://iden3-communication.io/proofs/1.0/contract-invoke-request"
            }
            ProtocolMessageType::PaymentRequest => {
                "https://iden3-communication.io/credentials/0.1/payment-request"
            }
            ProtocolMessageType::Payment => "https://iden3-communication.io/credentials/0.1/payment",
            ProtocolMessageType::ProposalRequest => {
                "https://iden3-communication.io/credentials/0.1/proposal-request"
            }
            ProtocolMessageType::Proposal => {
                "https://iden3-communication.io/credentials/0.1/proposal"
            }
            ProtocolMessageType::RevocationStatusRequest => {
                "https://iden3-communication.io/revocation/1.0/request-status"
            }
            ProtocolMessageType::RevocationStatusResponse => {
                "https://iden3-communication.io/revocation/1.0/status"
            }
            ProtocolMessageType::DiscoverFeaturesQueries => {
                "https://didcomm.org/discover-features/2.0/queries"
            }
            ProtocolMessageType::DiscoverFeaturesDisclose => {
                "https://didcomm.org/discover-features/2.0/disclose"
            }
            ProtocolMessageType::ProblemReport => {
                "https://didcomm.org/report-problem/2.0/problem-report"
            }
            ProtocolMessageType::EncryptedIssuanceResponse => {
                "https://iden3-communication.io/credentials/0.1/encrypted-issuance-response"
            }
            ProtocolMessageType::Invitation => "https://didcomm.org/out-of-band/2.0/invitation",
        }
    }
}

impl fmt::Display for ProtocolMessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_uri())
    }
}

impl FromStr for ProtocolMessageType {
    type Err = DispatchError;

    fn from_str(uri: &str) -> Result<Self, Self::Err> {
        ProtocolMessageType::all()
            .into_iter()
            .find(|message_type| message_type.as_uri() == uri)
            .ok_or(DispatchError::HandlerNotFound(uri.to_string()))
    }
}

/// `HandlerContext` carries the local agent data a handler may need to build its reply
///
/// The dispatcher never reads it, the [`super::Exchange`] packs the reply with
/// `reply_params`, the reply envelope type always follows from them
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerContext {
    pub did: String,
    reply_params: PackerParams,
}

impl HandlerContext {
    pub fn new(did: &str) -> Self {
        Self {
            did: did.to_string(),
            reply_params: PackerParams::Plain,
        }
    }

    pub fn with_reply(mut self, params: PackerParams) -> Self {
        self.reply_params = params;
        self
    }

    pub fn reply_envelope(&self) -> EnvelopeType {
        self.reply_params.envelope_type()
    }

    pub fn reply_params(&self) -> &PackerParams {
        &self.reply_params
    }
}

/// `Handler` is one link of the dispatcher chain
#[async_trait]
pub trait Handler: Send + Sync {
    /// `message_types` lists the protocol message types this handler is responsible for
    fn message_types(&self) -> Vec<ProtocolMessageType>;

    /// `handle` processes the message and optionally returns a reply, errors are propagated
    /// to the caller as is
    async fn handle(
        &self,
        message: &Message,
        ctx: &HandlerContext,
    ) -> Result<Option<Message>, DispatchError>;
}
