mod webrtc_peer;

pub use webrtc_peer::*;

use crate::error::PeerError;
use crate::media::LocalMedia;
use crate::negotiation::NegotiationEvent;
use async_trait::async_trait;
use std::sync::Arc;
use tandem_core::{IceCandidate, SessionDescription};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerConnectionState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Video,
    Unknown,
}

/// A track the remote side started sending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTrackInfo {
    pub id: String,
    pub stream_id: String,
    pub kind: MediaKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerEvent {
    RemoteTrack(RemoteTrackInfo),
    LocalCandidate(IceCandidate),
    ConnectionState(PeerConnectionState),
}

/// Where a peer connection reports its events. Every event is stamped with the epoch
/// of the peer instance that produced it.
#[derive(Debug, Clone)]
pub struct PeerEventSink {
    epoch: u64,
    tx: mpsc::UnboundedSender<NegotiationEvent>,
}

impl PeerEventSink {
    pub fn new(epoch: u64, tx: mpsc::UnboundedSender<NegotiationEvent>) -> Self {
        Self { epoch, tx }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Returns false once nobody is listening anymore.
    pub fn emit(&self, event: PeerEvent) -> bool {
        self.tx
            .send(NegotiationEvent::Peer {
                epoch: self.epoch,
                event,
            })
            .is_ok()
    }
}

/// Peer-to-peer transport and codec engine.
#[async_trait]
pub trait PeerConnection: Send + Sync {
    async fn create_offer(&self) -> Result<SessionDescription, PeerError>;

    async fn create_answer(&self) -> Result<SessionDescription, PeerError>;

    async fn set_local_description(&self, description: SessionDescription)
    -> Result<(), PeerError>;

    async fn set_remote_description(
        &self,
        description: SessionDescription,
    ) -> Result<(), PeerError>;

    async fn add_local_media(&self, media: &LocalMedia) -> Result<(), PeerError>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), PeerError>;

    async fn close(&self) -> Result<(), PeerError>;
}

#[async_trait]
pub trait PeerConnectionFactory: Send + Sync {
    async fn create(&self, events: PeerEventSink) -> Result<Arc<dyn PeerConnection>, PeerError>;
}
