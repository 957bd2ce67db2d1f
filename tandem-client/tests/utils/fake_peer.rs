use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tandem_client::{
    LocalMedia, PeerConnection, PeerConnectionFactory, PeerError, PeerEvent, PeerEventSink,
};
use tandem_core::{IceCandidate, SdpKind, SessionDescription};

/// What a [`FakePeer`] was asked to do, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerCall {
    AddMedia,
    CreateOffer,
    CreateAnswer,
    SetLocal(SdpKind),
    SetRemote(SdpKind),
    AddCandidate(String),
    Close,
}

/// Scripted stand-in for the peer-connection engine.
///
/// Descriptions are `"{label}-offer-{epoch}"` style strings. Setting a local description
/// "gathers" one candidate named `"{label}-{epoch}"`.
pub struct FakePeer {
    label: String,
    sink: PeerEventSink,
    calls: Mutex<Vec<PeerCall>>,
}

impl FakePeer {
    pub fn epoch(&self) -> u64 {
        self.sink.epoch()
    }

    pub fn calls(&self) -> Vec<PeerCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.calls().contains(&PeerCall::Close)
    }

    pub fn emit(&self, event: PeerEvent) {
        self.sink.emit(event);
    }

    fn record(&self, call: PeerCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl PeerConnection for FakePeer {
    async fn create_offer(&self) -> Result<SessionDescription, PeerError> {
        self.record(PeerCall::CreateOffer);
        Ok(SessionDescription::offer(format!(
            "{}-offer-{}",
            self.label,
            self.epoch()
        )))
    }

    async fn create_answer(&self) -> Result<SessionDescription, PeerError> {
        self.record(PeerCall::CreateAnswer);
        Ok(SessionDescription::answer(format!(
            "{}-answer-{}",
            self.label,
            self.epoch()
        )))
    }

    async fn set_local_description(
        &self,
        description: SessionDescription,
    ) -> Result<(), PeerError> {
        self.record(PeerCall::SetLocal(description.kind));
        self.sink.emit(PeerEvent::LocalCandidate(IceCandidate {
            candidate: format!("{}-{}", self.label, self.epoch()),
            sdp_mid: Some("0".to_string()),
            sdp_m_line_index: Some(0),
            username_fragment: None,
        }));
        Ok(())
    }

    async fn set_remote_description(
        &self,
        description: SessionDescription,
    ) -> Result<(), PeerError> {
        self.record(PeerCall::SetRemote(description.kind));
        Ok(())
    }

    async fn add_local_media(&self, _media: &LocalMedia) -> Result<(), PeerError> {
        self.record(PeerCall::AddMedia);
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), PeerError> {
        self.record(PeerCall::AddCandidate(candidate.candidate));
        Ok(())
    }

    async fn close(&self) -> Result<(), PeerError> {
        self.record(PeerCall::Close);
        Ok(())
    }
}

/// Hands out [`FakePeer`]s and keeps every one it created.
#[derive(Clone)]
pub struct FakePeerFactory {
    label: String,
    broken: bool,
    peers: Arc<Mutex<Vec<Arc<FakePeer>>>>,
}

impl FakePeerFactory {
    pub fn new(label: &str) -> Arc<Self> {
        Arc::new(Self {
            label: label.to_string(),
            broken: false,
            peers: Arc::default(),
        })
    }

    /// A factory that cannot build any peer.
    pub fn broken() -> Arc<Self> {
        Arc::new(Self {
            label: "broken".to_string(),
            broken: true,
            peers: Arc::default(),
        })
    }

    pub fn peers(&self) -> Vec<Arc<FakePeer>> {
        self.peers.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<Arc<FakePeer>> {
        self.peers.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl PeerConnectionFactory for FakePeerFactory {
    async fn create(&self, events: PeerEventSink) -> Result<Arc<dyn PeerConnection>, PeerError> {
        if self.broken {
            return Err(PeerError::Other("no peer engine".to_string()));
        }
        let peer = Arc::new(FakePeer {
            label: self.label.clone(),
            sink: events,
            calls: Mutex::new(Vec::new()),
        });
        self.peers.lock().unwrap().push(Arc::clone(&peer));
        Ok(peer)
    }
}
