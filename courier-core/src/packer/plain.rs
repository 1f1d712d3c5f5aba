use rst_common::standard::async_trait::async_trait;
use rst_common::standard::serde_json;
use rst_common::with_logging::log::debug;

use crate::envelope::{EnvelopeType, Message};
use crate::profile::PackerCapabilities;

use super::types::{Packer, PackerError, PackerParams};

/// `PlainPacker` serializes the message as a JSON object stamped with the plain tag
#[derive(Debug, Clone, Default)]
pub struct PlainPacker;

impl PlainPacker {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Packer for PlainPacker {
    fn envelope_type(&self) -> EnvelopeType {
        EnvelopeType::Plain
    }

    fn capabilities(&self) -> PackerCapabilities {
        PackerCapabilities::new(EnvelopeType::Plain)
    }

    async fn pack(&self, message: &Message, params: &PackerParams) -> Result<Vec<u8>, PackerError> {
        if !matches!(params, PackerParams::Plain) {
            return Err(PackerError::MissingParameter(
                "plain packer only accepts plain params".to_string(),
            ));
        }

        let stamped = message.stamp(EnvelopeType::Plain);
        serde_json::to_vec(&stamped).map_err(|err| PackerError::InvalidEnvelope(err.to_string()))
    }

    async fn unpack(&self, envelope: &[u8]) -> Result<Message, PackerError> {
        let message: Message = serde_json::from_slice(envelope)
            .map_err(|err| PackerError::InvalidEnvelope(err.to_string()))?;

        match message.typ() {
            Some(EnvelopeType::Plain) => {
                debug!("[packer:plain] unpacked message: {}", message.id());
                Ok(message)
            }
            other => Err(PackerError::InvalidEnvelope(format!(
                "unexpected envelope tag: {:?}",
                other
            ))),
        }
    }
}
