use crate::peer::PeerEvent;
use tandem_core::{RoomId, SessionDescription, SignalMessage};

/// Inputs to the [`Negotiator`](crate::Negotiator).
///
/// `epoch` on completions and peer events names the peer instance they belong to; the
/// negotiator ignores anything from an instance it has already replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NegotiationEvent {
    JoinRequested { room: RoomId },
    MediaAcquired,
    MediaUnavailable { reason: String },
    SignalingOpened,
    SignalingClosed,
    SignalingFailed { reason: String },
    Signal(SignalMessage),
    LocalDescriptionReady {
        epoch: u64,
        description: SessionDescription,
    },
    LocalDescriptionFailed { epoch: u64, reason: String },
    Peer { epoch: u64, event: PeerEvent },
    LeaveRequested,
}
