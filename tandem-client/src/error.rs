use thiserror::Error;

/// Conditions surfaced to the user of a call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    #[error("Room is full. Only 2 participants allowed.")]
    RoomFull,

    #[error("Could not access camera/microphone: {0}")]
    MediaUnavailable(String),

    #[error("Signaling connection failed: {0}")]
    Signaling(String),

    #[error("Negotiation step failed: {0}")]
    Negotiation(String),

    /// The call task has stopped and accepts no more requests.
    #[error("Call has ended")]
    CallEnded,
}

/// Failures reported by a peer-connection engine.
#[derive(Debug, Error)]
pub enum PeerError {
    #[error(transparent)]
    WebRtc(#[from] webrtc::Error),

    #[error("Unsupported session description type: {0}")]
    UnsupportedDescription(String),

    #[error("{0}")]
    Other(String),
}
