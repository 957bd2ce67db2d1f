use crate::error::CodecError;
use crate::model::SignalMessage;
use serde_json::Value;

/// Negotiation frames the server forwards, keyed by `type`, with the field that must
/// carry their payload.
const RELAYED: [(&str, &str); 3] = [
    ("offer", "sdp"),
    ("answer", "sdp"),
    ("ice-candidate", "candidate"),
];

/// A negotiation frame held exactly as its sender wrote it.
///
/// The server never re-encodes these, so fields it does not model (`relayProtocol` on a
/// candidate, a bare-string `sdp`) reach the other member untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayFrame {
    tag: &'static str,
    text: String,
}

impl RelayFrame {
    pub fn tag(&self) -> &'static str {
        self.tag
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    /// Typed view of the frame. Fails when the payload has a shape the model does not cover.
    pub fn to_message(&self) -> Result<SignalMessage, CodecError> {
        decode(&self.text)
    }
}

/// A client frame as the server sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// `offer`, `answer` or `ice-candidate`, kept verbatim for the peer.
    Relay(RelayFrame),
    /// Anything the server interprets itself.
    Message(SignalMessage),
}

/// Classify one client frame for the server.
///
/// Relayed frames only need a known `type` and a present payload field; their contents
/// are opaque. Every other frame goes through [`decode`].
pub fn decode_inbound(text: &str) -> Result<Inbound, CodecError> {
    let value: Value = serde_json::from_str(text)?;
    let kind = value.get("type").and_then(Value::as_str);

    if let Some(&(tag, payload)) = RELAYED.iter().find(|(name, _)| Some(*name) == kind) {
        return match value.get(payload) {
            Some(body) if !body.is_null() => Ok(Inbound::Relay(RelayFrame {
                tag,
                text: text.to_owned(),
            })),
            _ => Err(CodecError::MissingPayload(tag)),
        };
    }

    let message: SignalMessage = serde_json::from_value(value)?;
    validate(message).map(Inbound::Message)
}

/// Parse one text frame.
///
/// Unknown `type` values, missing fields and empty room names are all errors; callers on
/// the server drop such frames without answering.
pub fn decode(text: &str) -> Result<SignalMessage, CodecError> {
    validate(serde_json::from_str(text)?)
}

fn validate(message: SignalMessage) -> Result<SignalMessage, CodecError> {
    if let SignalMessage::Join { room_id } = &message {
        if room_id.is_empty() {
            return Err(CodecError::EmptyRoomId);
        }
    }

    Ok(message)
}

pub fn encode(message: &SignalMessage) -> Result<String, CodecError> {
    Ok(serde_json::to_string(message)?)
}
