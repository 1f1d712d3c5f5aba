use rst_common::standard::async_trait::async_trait;
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json;
use rst_common::with_logging::log::debug;

use crate::dispatch::types::{DispatchError, Handler, HandlerContext, ProtocolMessageType};
use crate::envelope::Message;
use crate::packer::Registry;

pub const FEATURE_TYPE_PROTOCOL: &str = "protocol";
pub const FEATURE_TYPE_ACCEPT: &str = "accept";

const WILDCARD: char = '*';

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(crate = "self::serde")]
struct Query {
    #[serde(rename = "feature-type")]
    feature_type: String,

    #[serde(rename = "match")]
    #[serde(default)]
    pattern: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(crate = "self::serde")]
struct QueriesBody {
    queries: Vec<Query>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(crate = "self::serde")]
struct Disclosure {
    #[serde(rename = "feature-type")]
    feature_type: String,

    id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(crate = "self::serde")]
struct DiscloseBody {
    disclosures: Vec<Disclosure>,
}

fn matches_pattern(pattern: Option<&str>, id: &str) -> bool {
    match pattern {
        None => true,
        Some(pattern) => match pattern.strip_suffix(WILDCARD) {
            Some(prefix) => id.starts_with(prefix),
            None => pattern == id,
        },
    }
}

/// `DiscoveryHandler` answers discover-features queries about the supported protocols and
/// the accepted envelope profiles
pub struct DiscoveryHandler {
    accept: Vec<String>,
    protocols: Vec<String>,
}

impl DiscoveryHandler {
    pub fn new(accept: Vec<String>, protocols: Vec<String>) -> Self {
        Self { accept, protocols }
    }

    pub fn from_registry(registry: &Registry, protocols: &[ProtocolMessageType]) -> Self {
        Self::new(
            registry.supported_profiles(),
            protocols
                .iter()
                .map(|protocol| protocol.as_uri().to_string())
                .collect(),
        )
    }

    fn disclose(&self, query: &Query) -> Vec<Disclosure> {
        let features = match query.feature_type.as_str() {
            FEATURE_TYPE_PROTOCOL => &self.protocols,
            FEATURE_TYPE_ACCEPT => &self.accept,
            other => {
                debug!("[handler:discovery] skip unknown feature type: {}", other);
                return Vec::new();
            }
        };

        features
            .iter()
            .filter(|id| matches_pattern(query.pattern.as_deref(), id))
            .map(|id| Disclosure {
                feature_type: query.feature_type.clone(),
                id: id.clone(),
            })
            .collect()
    }
}

#[async_trait]
impl Handler for DiscoveryHandler {
    fn message_types(&self) -> Vec<ProtocolMessageType> {
        vec![ProtocolMessageType::DiscoverFeaturesQueries]
    }

    async fn handle(
        &self,
        message: &Message,
        ctx: &HandlerContext,
    ) -> Result<Option<Message>, DispatchError> {
        let body: QueriesBody = message
            .body_as()
            .map_err(|err| DispatchError::InvalidBody(err.to_string()))?;

        let disclosures: Vec<Disclosure> = body
            .queries
            .iter()
            .flat_map(|query| self.disclose(query))
            .collect();

        let reply_body = serde_json::to_value(DiscloseBody { disclosures })
            .map_err(|err| DispatchError::InvalidBody(err.to_string()))?;

        let reply = message
            .reply(
                ProtocolMessageType::DiscoverFeaturesDisclose.as_uri(),
                reply_body,
            )
            .with_from(&ctx.did);

        Ok(Some(reply))
    }
}
