use tandem_core::{CodecError, RelayFrame, SignalMessage, codec};

/// One frame queued for a member's socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Produced by the server itself; encoded on the way out.
    Notice(SignalMessage),
    /// Sent by the room peer; written back out byte for byte.
    Relayed(RelayFrame),
}

impl Outbound {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Notice(message) => message.tag(),
            Self::Relayed(frame) => frame.tag(),
        }
    }

    /// Text to put on the wire.
    pub fn into_text(self) -> Result<String, CodecError> {
        match self {
            Self::Notice(message) => codec::encode(&message),
            Self::Relayed(frame) => Ok(frame.into_text()),
        }
    }
}

impl From<SignalMessage> for Outbound {
    fn from(message: SignalMessage) -> Self {
        Self::Notice(message)
    }
}

impl From<RelayFrame> for Outbound {
    fn from(frame: RelayFrame) -> Self {
        Self::Relayed(frame)
    }
}
