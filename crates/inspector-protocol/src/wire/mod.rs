//! Wire messages exchanged with the backend.
//!
//! Outbound calls serialise as
//! `{"domain": .., "command": .., "id": .., "arguments": {..}}`. Inbound text
//! is either a response carrying `requestId` or an event tagged with
//! `"type": "event"`; anything else is rejected.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::ProtocolError;

/// Correlation id linking a call to its response.
pub type CallId = u64;

/// A command call ready for the transport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundMessage {
    /// Target domain.
    pub domain: String,
    /// Command within the domain.
    pub command: String,
    /// Correlation id.
    pub id: CallId,
    /// Arguments keyed by name, in declaration order.
    pub arguments: Map<String, Value>,
}

impl OutboundMessage {
    /// Creates an outbound message.
    pub fn new(
        domain: impl Into<String>,
        command: impl Into<String>,
        id: CallId,
        arguments: Map<String, Value>,
    ) -> Self {
        Self {
            domain: domain.into(),
            command: command.into(),
            id,
            arguments,
        }
    }

    /// Serialises the message to JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Serialize`] if serialisation fails.
    pub fn to_text(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::serialize)
    }
}

/// Reply to an earlier call.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMessage {
    /// Correlation id of the call being answered.
    pub request_id: CallId,
    /// Backend error payload, when the call failed.
    #[serde(default)]
    pub error: Option<Value>,
    /// Protocol-level error texts.
    #[serde(default)]
    pub protocol_errors: Option<Vec<String>>,
    /// Result values keyed by name.
    #[serde(default)]
    pub body: Option<Map<String, Value>>,
    /// Why the rest of the response could not be decoded, when only the
    /// `requestId` was usable.
    #[serde(skip)]
    pub decode_error: Option<String>,
}

impl ResponseMessage {
    /// A response whose id decoded but whose other fields did not.
    #[must_use]
    pub fn undecodable(request_id: CallId, reason: impl Into<String>) -> Self {
        Self {
            request_id,
            decode_error: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Protocol errors, treating an empty list as absent.
    #[must_use]
    pub fn protocol_errors(&self) -> Option<&[String]> {
        self.protocol_errors
            .as_deref()
            .filter(|errors| !errors.is_empty())
    }
}

/// Unsolicited notification from the backend.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EventMessage {
    /// Domain raising the event.
    pub domain: String,
    /// Event name.
    pub event: String,
    /// Payload keyed by name, in wire order. `null` reads as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub body: Map<String, Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Map<String, Value>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl EventMessage {
    /// Payload values in wire order.
    #[must_use]
    pub fn payload(&self) -> Vec<Value> {
        self.body.values().cloned().collect()
    }
}

/// Classified inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// Reply to a call.
    Response(ResponseMessage),
    /// Domain event.
    Event(EventMessage),
}

impl InboundMessage {
    /// Parses and classifies inbound text.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MalformedMessage`] if the text is not JSON,
    /// the `requestId` is not an id, or an event field has the wrong shape,
    /// and [`ProtocolError::UnclassifiedMessage`] if the object is neither a
    /// response nor an event. A response with a usable id but other bad
    /// fields still classifies; see [`ResponseMessage::decode_error`].
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_str(text).map_err(ProtocolError::from_json_error)?;
        Self::from_value(value)
    }

    /// Classifies an already-parsed message.
    ///
    /// # Errors
    ///
    /// As for [`InboundMessage::parse`].
    pub fn from_value(value: Value) -> Result<Self, ProtocolError> {
        let Value::Object(object) = value else {
            return Err(ProtocolError::malformed("message is not a JSON object"));
        };

        if let Some(id) = object.get("requestId") {
            let request_id: CallId =
                serde_json::from_value(id.clone()).map_err(ProtocolError::from_json_error)?;
            let response = serde_json::from_value(Value::Object(object))
                .unwrap_or_else(|error| ResponseMessage::undecodable(request_id, error.to_string()));
            return Ok(Self::Response(response));
        }

        if object.get("type").and_then(Value::as_str) == Some("event") {
            let event = serde_json::from_value(Value::Object(object))
                .map_err(ProtocolError::from_json_error)?;
            return Ok(Self::Event(event));
        }

        Err(ProtocolError::UnclassifiedMessage)
    }
}

#[cfg(test)]
mod tests;
