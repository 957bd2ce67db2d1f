use crate::adapter::PeerAdapter;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::media::{LocalMedia, MediaSource};
use crate::negotiation::{CallNotice, Command, ConnectionState, NegotiationEvent, Negotiator};
use crate::peer::{MediaKind, PeerConnectionFactory, WebRtcPeerFactory};
use crate::signaling::{SignalingConnector, SignalingEvent, SignalingLink, WsConnector};
use std::sync::Arc;
use tandem_core::{RoomId, SignalMessage};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

enum CallRequest {
    Join(RoomId),
    Leave,
    Toggle(MediaKind),
}

/// Resources handed back by spawned acquisition tasks.
enum Acquired {
    Media(LocalMedia),
    Signaling(SignalingLink),
}

/// Channels of one call attempt. Replaced wholesale on every join, which drops anything
/// still in flight from the previous attempt.
struct Attempt {
    number: u64,
    events_tx: mpsc::UnboundedSender<NegotiationEvent>,
    events_rx: mpsc::UnboundedReceiver<NegotiationEvent>,
    acquired_tx: mpsc::UnboundedSender<Acquired>,
    acquired_rx: mpsc::UnboundedReceiver<Acquired>,
}

impl Attempt {
    fn new(number: u64) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (acquired_tx, acquired_rx) = mpsc::unbounded_channel();
        Self {
            number,
            events_tx,
            events_rx,
            acquired_tx,
            acquired_rx,
        }
    }
}

/// Task owning everything a call needs: the negotiator of the current attempt, the local
/// media, the signaling link and the peer. Events are processed one at a time.
pub struct Call {
    connector: Arc<dyn SignalingConnector>,
    factory: Arc<dyn PeerConnectionFactory>,
    media_source: Arc<dyn MediaSource>,
    negotiator: Negotiator,
    attempt: Attempt,
    media: Option<LocalMedia>,
    signaling: Option<mpsc::UnboundedSender<SignalMessage>>,
    peer: Option<PeerAdapter>,
    requests: mpsc::UnboundedReceiver<CallRequest>,
    state_tx: watch::Sender<ConnectionState>,
    notices_tx: mpsc::UnboundedSender<CallNotice>,
}

impl Call {
    pub fn spawn(
        connector: Arc<dyn SignalingConnector>,
        factory: Arc<dyn PeerConnectionFactory>,
        media_source: Arc<dyn MediaSource>,
    ) -> CallHandle {
        let (requests_tx, requests_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Idle);
        let (notices_tx, notices_rx) = mpsc::unbounded_channel();

        let call = Self {
            connector,
            factory,
            media_source,
            negotiator: Negotiator::new(),
            attempt: Attempt::new(0),
            media: None,
            signaling: None,
            peer: None,
            requests: requests_rx,
            state_tx,
            notices_tx,
        };
        tokio::spawn(call.run());

        CallHandle {
            requests: requests_tx,
            state: state_rx,
            notices: notices_rx,
        }
    }

    /// Call over WebSocket signaling and `webrtc` peers, as described by `config`.
    pub fn connect(config: &ClientConfig, media_source: Arc<dyn MediaSource>) -> CallHandle {
        Self::spawn(
            Arc::new(WsConnector::new(config.signaling_url.clone())),
            Arc::new(WebRtcPeerFactory::new(config.ice_servers.clone())),
            media_source,
        )
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                request = self.requests.recv() => match request {
                    Some(CallRequest::Join(room)) => self.start_attempt(room),
                    Some(CallRequest::Leave) => self.dispatch(NegotiationEvent::LeaveRequested),
                    Some(CallRequest::Toggle(kind)) => self.toggle(kind),
                    None => {
                        self.dispatch(NegotiationEvent::LeaveRequested);
                        break;
                    }
                },
                Some(acquired) = self.attempt.acquired_rx.recv() => self.on_acquired(acquired),
                Some(event) = self.attempt.events_rx.recv() => self.dispatch(event),
            }
        }
        debug!("Call task finished");
    }

    fn start_attempt(&mut self, room: RoomId) {
        self.peer = None;
        self.signaling = None;
        self.attempt = Attempt::new(self.attempt.number + 1);
        self.negotiator = Negotiator::new();
        info!(attempt = self.attempt.number, room = %room, "Starting call attempt");
        self.dispatch(NegotiationEvent::JoinRequested { room });
    }

    fn on_acquired(&mut self, acquired: Acquired) {
        match acquired {
            Acquired::Media(media) => {
                // Capture finishing after a leave is discarded, never kept for the next join.
                if self.negotiator.state() != ConnectionState::Joining {
                    debug!("Local media no longer needed");
                    return;
                }
                self.media = Some(media);
                self.dispatch(NegotiationEvent::MediaAcquired);
            }
            Acquired::Signaling(link) => {
                if self.negotiator.state() != ConnectionState::Joining {
                    debug!("Signaling link no longer needed");
                    return;
                }
                let SignalingLink { outgoing, incoming } = link;
                self.signaling = Some(outgoing);
                tokio::spawn(forward_signaling(incoming, self.attempt.events_tx.clone()));
                self.dispatch(NegotiationEvent::SignalingOpened);
            }
        }
    }

    /// Mute or unmute local tracks of `kind`. The tracks stay negotiated.
    fn toggle(&self, kind: MediaKind) {
        let Some(enabled) = self.media.as_ref().and_then(|media| media.toggle(kind)) else {
            debug!(?kind, "No local track to toggle");
            return;
        };
        info!(?kind, enabled, "Local track toggled");
        let _ = self.notices_tx.send(CallNotice::LocalTrackToggled { kind, enabled });
    }

    fn dispatch(&mut self, event: NegotiationEvent) {
        let commands = self.negotiator.handle(event);
        let next = self.negotiator.state();
        self.state_tx.send_if_modified(|state| {
            let changed = *state != next;
            *state = next;
            changed
        });
        for command in commands {
            self.execute(command);
        }
    }

    fn execute(&mut self, command: Command) {
        match command {
            Command::AcquireMedia => self.acquire_media(),
            Command::OpenSignaling => self.open_signaling(),
            Command::Send(message) => match &self.signaling {
                Some(outgoing) => {
                    if outgoing.send(message).is_err() {
                        debug!("Signaling writer gone; message dropped");
                    }
                }
                None => debug!(tag = message.tag(), "No signaling link; message dropped"),
            },
            Command::StartOffer { epoch } => self.replace_peer(epoch).offer(),
            Command::StartAnswer { epoch, offer } => self.replace_peer(epoch).answer(offer),
            Command::ApplyAnswer { epoch, answer } => match self.current_peer(epoch) {
                Some(peer) => peer.apply_answer(answer),
                None => debug!(epoch, "No peer for answer"),
            },
            Command::AddCandidate { epoch, candidate } => match self.current_peer(epoch) {
                Some(peer) => peer.add_candidate(candidate),
                None => debug!(epoch, "No peer for candidate"),
            },
            Command::ClosePeer => {
                if let Some(peer) = self.peer.take() {
                    peer.close();
                }
            }
            Command::CloseSignaling => self.signaling = None,
            Command::ReleaseMedia => self.media = None,
            Command::Notify(notice) => {
                let _ = self.notices_tx.send(notice);
            }
        }
    }

    fn acquire_media(&self) {
        if self.media.is_some() {
            let _ = self.attempt.events_tx.send(NegotiationEvent::MediaAcquired);
            return;
        }
        let source = Arc::clone(&self.media_source);
        let acquired = self.attempt.acquired_tx.clone();
        let events = self.attempt.events_tx.clone();
        tokio::spawn(async move {
            match source.acquire().await {
                Ok(media) => {
                    let _ = acquired.send(Acquired::Media(media));
                }
                Err(e) => {
                    let reason = match e {
                        ClientError::MediaUnavailable(reason) => reason,
                        other => other.to_string(),
                    };
                    let _ = events.send(NegotiationEvent::MediaUnavailable { reason });
                }
            }
        });
    }

    fn open_signaling(&self) {
        let connector = Arc::clone(&self.connector);
        let acquired = self.attempt.acquired_tx.clone();
        let events = self.attempt.events_tx.clone();
        tokio::spawn(async move {
            match connector.connect().await {
                Ok(link) => {
                    let _ = acquired.send(Acquired::Signaling(link));
                }
                Err(e) => {
                    warn!("Signaling connection failed: {:#}", e);
                    let _ = events.send(NegotiationEvent::SignalingFailed {
                        reason: format!("{:#}", e),
                    });
                }
            }
        });
    }

    fn replace_peer(&mut self, epoch: u64) -> &PeerAdapter {
        if let Some(previous) = self.peer.take() {
            previous.close();
        }
        let peer = PeerAdapter::spawn(
            Arc::clone(&self.factory),
            self.media.clone().unwrap_or_default(),
            epoch,
            self.attempt.events_tx.clone(),
        );
        self.peer.insert(peer)
    }

    fn current_peer(&self, epoch: u64) -> Option<&PeerAdapter> {
        self.peer.as_ref().filter(|peer| peer.epoch() == epoch)
    }
}

async fn forward_signaling(
    mut incoming: mpsc::UnboundedReceiver<SignalingEvent>,
    events: mpsc::UnboundedSender<NegotiationEvent>,
) {
    while let Some(event) = incoming.recv().await {
        let event = match event {
            SignalingEvent::Message(message) => NegotiationEvent::Signal(message),
            SignalingEvent::Closed => NegotiationEvent::SignalingClosed,
            SignalingEvent::Failed(reason) => NegotiationEvent::SignalingFailed { reason },
        };
        if events.send(event).is_err() {
            break;
        }
    }
}

/// User-facing side of a [`Call`]. Dropping it leaves the room and stops the call task.
pub struct CallHandle {
    requests: mpsc::UnboundedSender<CallRequest>,
    state: watch::Receiver<ConnectionState>,
    notices: mpsc::UnboundedReceiver<CallNotice>,
}

impl CallHandle {
    /// Start a fresh attempt in `room`, abandoning any current one.
    pub fn join(&self, room: impl Into<RoomId>) -> Result<(), ClientError> {
        self.request(CallRequest::Join(room.into()))
    }

    pub fn leave(&self) -> Result<(), ClientError> {
        self.request(CallRequest::Leave)
    }

    /// Switch the local microphone on or off without renegotiating. The outcome
    /// arrives as [`CallNotice::LocalTrackToggled`]; without captured audio nothing happens.
    pub fn toggle_audio(&self) -> Result<(), ClientError> {
        self.request(CallRequest::Toggle(MediaKind::Audio))
    }

    /// Video counterpart of [`CallHandle::toggle_audio`].
    pub fn toggle_video(&self) -> Result<(), ClientError> {
        self.request(CallRequest::Toggle(MediaKind::Video))
    }

    pub fn current_state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    pub fn notices(&mut self) -> &mut mpsc::UnboundedReceiver<CallNotice> {
        &mut self.notices
    }

    fn request(&self, request: CallRequest) -> Result<(), ClientError> {
        self.requests
            .send(request)
            .map_err(|_| ClientError::CallEnded)
    }
}
