use crate::error::ClientError;
use crate::peer::{MediaKind, RemoteTrackInfo};
use tandem_core::{IceCandidate, SessionDescription, SignalMessage};

/// Side effects requested by the [`Negotiator`](crate::Negotiator), executed by the call driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AcquireMedia,
    OpenSignaling,
    Send(SignalMessage),
    /// Replace the peer with a fresh instance and produce a local offer.
    StartOffer { epoch: u64 },
    /// Replace the peer with a fresh instance and answer `offer`.
    StartAnswer {
        epoch: u64,
        offer: SessionDescription,
    },
    ApplyAnswer {
        epoch: u64,
        answer: SessionDescription,
    },
    AddCandidate {
        epoch: u64,
        candidate: IceCandidate,
    },
    ClosePeer,
    CloseSignaling,
    ReleaseMedia,
    Notify(CallNotice),
}

/// What the user of a call gets told about besides state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallNotice {
    Error(ClientError),
    RemoteTrack(RemoteTrackInfo),
    /// The remote side is gone; any rendering of its media should be cleared.
    RemoteMediaCleared,
    /// Local tracks of `kind` were switched on or off.
    LocalTrackToggled { kind: MediaKind, enabled: bool },
}
