use rst_common::standard::chrono::Utc;
use rst_common::standard::serde::de::DeserializeOwned;
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json::{self, Value};
use rst_common::standard::uuid::Uuid;

use rstdev_domain::entity::ToJSON;
use rstdev_domain::BaseError;

use super::types::{EnvelopeError, EnvelopeType};

/// `Attachment` is an optional payload appended to a [`Message`], used by protocols
/// that need to carry documents next to the body (credential offers, proofs)
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(crate = "self::serde")]
pub struct Attachment {
    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,

    pub data: Value,
}

/// `Message` is the protocol message exchanged between agents
///
/// The `typ` property is the envelope tag stamped by a packer, it's empty while the message
/// is being built. The `message_type` is the protocol message URI, serialized as `type`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(crate = "self::serde")]
pub struct Message {
    pub(crate) id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) typ: Option<EnvelopeType>,

    #[serde(rename = "type")]
    pub(crate) message_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) thid: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) from: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) to: Option<String>,

    #[serde(default)]
    pub(crate) body: Value,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) attachments: Option<Vec<Attachment>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) created_time: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) expires_time: Option<i64>,
}

impl Message {
    pub fn new(message_type: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            typ: None,
            message_type: message_type.to_string(),
            thid: None,
            from: None,
            to: None,
            body: Value::Object(Default::default()),
            attachments: None,
            created_time: Some(Utc::now().timestamp()),
            expires_time: None,
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn with_from(mut self, from: &str) -> Self {
        self.from = Some(from.to_string());
        self
    }

    pub fn with_to(mut self, to: &str) -> Self {
        self.to = Some(to.to_string());
        self
    }

    pub fn with_thid(mut self, thid: &str) -> Self {
        self.thid = Some(thid.to_string());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments
            .get_or_insert_with(Vec::new)
            .push(attachment);
        self
    }

    /// `with_expiration` set the `expires_time` as unix seconds
    pub fn with_expiration(mut self, expires_time: i64) -> Self {
        self.expires_time = Some(expires_time);
        self
    }

    /// `reply` derive a new message on the same thread, the sender become the receiver
    pub fn reply(&self, message_type: &str, body: Value) -> Message {
        let thid = self.thid.clone().unwrap_or(self.id.clone());

        let mut reply = Message::new(message_type).with_thid(&thid).with_body(body);
        reply.from = self.to.clone();
        reply.to = self.from.clone();
        reply
    }

    /// `stamp` returns a copy of the message tagged with given envelope type
    pub fn stamp(&self, env: EnvelopeType) -> Message {
        let mut stamped = self.clone();
        stamped.typ = Some(env);
        stamped
    }

    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_time.map(|exp| exp < now).unwrap_or(false)
    }

    pub fn body_as<T: DeserializeOwned>(&self) -> Result<T, EnvelopeError> {
        serde_json::from_value(self.body.clone())
            .map_err(|err| EnvelopeError::UnserializeError(err.to_string()))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn typ(&self) -> Option<EnvelopeType> {
        self.typ
    }

    pub fn message_type(&self) -> &str {
        &self.message_type
    }

    pub fn thid(&self) -> Option<&str> {
        self.thid.as_deref()
    }

    pub fn from(&self) -> Option<&str> {
        self.from.as_deref()
    }

    pub fn to(&self) -> Option<&str> {
        self.to.as_deref()
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn attachments(&self) -> Option<&Vec<Attachment>> {
        self.attachments.as_ref()
    }

    pub fn created_time(&self) -> Option<i64> {
        self.created_time
    }

    pub fn expires_time(&self) -> Option<i64> {
        self.expires_time
    }
}

impl ToJSON for Message {
    fn to_json(&self) -> Result<String, BaseError> {
        let json_str =
            serde_json::to_string(&self).map_err(|err| BaseError::ToJSONError(err.to_string()))?;

        Ok(json_str)
    }
}

impl TryInto<Vec<u8>> for Message {
    type Error = EnvelopeError;

    fn try_into(self) -> Result<Vec<u8>, Self::Error> {
        let json = serde_json::to_vec(&self)
            .map_err(|err| EnvelopeError::GenerateJSONError(err.to_string()))?;
        Ok(json)
    }
}

impl TryFrom<Vec<u8>> for Message {
    type Error = EnvelopeError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        let message: Message = serde_json::from_slice(&value)
            .map_err(|err| EnvelopeError::UnserializeError(err.to_string()))?;
        Ok(message)
    }
}
