mod ice;
mod member;
mod room;
mod signaling;

pub use ice::IceServerConfig;
pub use member::MemberId;
pub use room::RoomId;
pub use signaling::{IceCandidate, SdpKind, SessionDescription, SignalMessage};
