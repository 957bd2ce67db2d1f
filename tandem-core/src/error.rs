use thiserror::Error;

/// Reasons a text frame could not be turned into a [`crate::SignalMessage`].
#[derive(Debug, Error)]
pub enum CodecError {
    /// Not JSON, unknown `type`, or a required field is missing.
    #[error("malformed frame: {0}")]
    Json(#[from] serde_json::Error),

    /// A `join` frame carried an empty `roomId`.
    #[error("join request without a room id")]
    EmptyRoomId,

    /// An `offer`, `answer` or `ice-candidate` frame without its payload field.
    #[error("{0} frame without a payload")]
    MissingPayload(&'static str),
}
