use crate::error::PeerError;
use crate::media::LocalMedia;
use crate::peer::{
    MediaKind, PeerConnection, PeerConnectionFactory, PeerConnectionState, PeerEvent,
    PeerEventSink, RemoteTrackInfo,
};
use async_trait::async_trait;
use std::sync::Arc;
use tandem_core::{IceCandidate, IceServerConfig, SdpKind, SessionDescription};
use tracing::{debug, info};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::sdp_type::RTCSdpType;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::RTCRtpTransceiver;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use webrtc::track::track_remote::TrackRemote;

/// Builds [`WebRtcPeer`]s sharing one ICE server list.
#[derive(Debug, Clone)]
pub struct WebRtcPeerFactory {
    ice_servers: Vec<IceServerConfig>,
}

impl WebRtcPeerFactory {
    pub fn new(ice_servers: Vec<IceServerConfig>) -> Self {
        Self { ice_servers }
    }
}

#[async_trait]
impl PeerConnectionFactory for WebRtcPeerFactory {
    async fn create(&self, events: PeerEventSink) -> Result<Arc<dyn PeerConnection>, PeerError> {
        let peer = WebRtcPeer::new(&self.ice_servers, events).await?;
        Ok(Arc::new(peer))
    }
}

/// [`PeerConnection`] on top of `webrtc`'s `RTCPeerConnection`.
pub struct WebRtcPeer {
    peer_connection: Arc<RTCPeerConnection>,
}

impl WebRtcPeer {
    pub async fn new(
        ice_servers: &[IceServerConfig],
        events: PeerEventSink,
    ) -> Result<Self, PeerError> {
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: ice_servers
                .iter()
                .map(|server| RTCIceServer {
                    urls: server.urls.clone(),
                    username: server.username.clone().unwrap_or_default(),
                    credential: server.credential.clone().unwrap_or_default(),
                })
                .collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);
        let epoch = events.epoch();

        let state_events = events.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let events = state_events.clone();
                Box::pin(async move {
                    info!(epoch, "Peer connection state changed: {}", s);
                    events.emit(PeerEvent::ConnectionState(connection_state(s)));
                })
            },
        ));

        let ice_events = events.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let events = ice_events.clone();
            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                events.emit(PeerEvent::LocalCandidate(IceCandidate {
                    candidate: init.candidate,
                    sdp_mid: init.sdp_mid,
                    sdp_m_line_index: init.sdp_mline_index,
                    username_fragment: init.username_fragment,
                }));
            })
        }));

        let track_events = events;
        peer_connection.on_track(Box::new(
            move |track: Arc<TrackRemote>,
                  _receiver: Arc<RTCRtpReceiver>,
                  _transceiver: Arc<RTCRtpTransceiver>| {
                let events = track_events.clone();
                let info = RemoteTrackInfo {
                    id: track.id().to_string(),
                    stream_id: track.stream_id().to_string(),
                    kind: media_kind(track.kind()),
                };
                Box::pin(async move {
                    debug!(epoch, track = %info.id, "Remote track arrived");
                    events.emit(PeerEvent::RemoteTrack(info));
                })
            },
        ));

        Ok(Self { peer_connection })
    }
}

#[async_trait]
impl PeerConnection for WebRtcPeer {
    async fn create_offer(&self) -> Result<SessionDescription, PeerError> {
        let offer = self.peer_connection.create_offer(None).await?;
        from_rtc(offer)
    }

    async fn create_answer(&self) -> Result<SessionDescription, PeerError> {
        let answer = self.peer_connection.create_answer(None).await?;
        from_rtc(answer)
    }

    async fn set_local_description(
        &self,
        description: SessionDescription,
    ) -> Result<(), PeerError> {
        let description = to_rtc(description)?;
        self.peer_connection.set_local_description(description).await?;
        Ok(())
    }

    async fn set_remote_description(
        &self,
        description: SessionDescription,
    ) -> Result<(), PeerError> {
        let description = to_rtc(description)?;
        self.peer_connection
            .set_remote_description(description)
            .await?;
        Ok(())
    }

    async fn add_local_media(&self, media: &LocalMedia) -> Result<(), PeerError> {
        for track in media.tracks() {
            self.peer_connection
                .add_track(Arc::clone(track.track()))
                .await?;
        }
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), PeerError> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: candidate.sdp_mid,
            sdp_mline_index: candidate.sdp_m_line_index,
            username_fragment: candidate.username_fragment,
            ..Default::default()
        };
        self.peer_connection.add_ice_candidate(init).await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), PeerError> {
        self.peer_connection.close().await?;
        Ok(())
    }
}

fn connection_state(state: RTCPeerConnectionState) -> PeerConnectionState {
    match state {
        RTCPeerConnectionState::Unspecified | RTCPeerConnectionState::New => {
            PeerConnectionState::New
        }
        RTCPeerConnectionState::Connecting => PeerConnectionState::Connecting,
        RTCPeerConnectionState::Connected => PeerConnectionState::Connected,
        RTCPeerConnectionState::Disconnected => PeerConnectionState::Disconnected,
        RTCPeerConnectionState::Failed => PeerConnectionState::Failed,
        RTCPeerConnectionState::Closed => PeerConnectionState::Closed,
    }
}

fn media_kind(kind: RTPCodecType) -> MediaKind {
    match kind {
        RTPCodecType::Audio => MediaKind::Audio,
        RTPCodecType::Video => MediaKind::Video,
        _ => MediaKind::Unknown,
    }
}

fn to_rtc(description: SessionDescription) -> Result<RTCSessionDescription, PeerError> {
    let rtc = match description.kind {
        SdpKind::Offer => RTCSessionDescription::offer(description.sdp)?,
        SdpKind::Answer => RTCSessionDescription::answer(description.sdp)?,
        other => return Err(PeerError::UnsupportedDescription(format!("{other:?}"))),
    };
    Ok(rtc)
}

fn from_rtc(description: RTCSessionDescription) -> Result<SessionDescription, PeerError> {
    let kind = match description.sdp_type {
        RTCSdpType::Offer => SdpKind::Offer,
        RTCSdpType::Answer => SdpKind::Answer,
        RTCSdpType::Pranswer => SdpKind::Pranswer,
        RTCSdpType::Rollback => SdpKind::Rollback,
        RTCSdpType::Unspecified => {
            return Err(PeerError::UnsupportedDescription("unspecified".to_string()));
        }
    };
    Ok(SessionDescription {
        kind,
        sdp: description.sdp,
    })
}
