use crate::error::ClientError;
use crate::negotiation::{CallNotice, Command, ConnectionState, NegotiationEvent};
use crate::peer::{PeerConnectionState, PeerEvent};
use tandem_core::{IceCandidate, RoomId, SdpKind, SessionDescription, SignalMessage};
use tracing::{debug, info, warn};

/// Negotiation state machine for one call attempt.
///
/// Pure: [`Negotiator::handle`] takes one event and returns the commands to run. The
/// driver feeds the outcome of those commands back in as further events.
#[derive(Debug, Default)]
pub struct Negotiator {
    state: ConnectionState,
    room: Option<RoomId>,
    /// Identifies the current peer instance. Bumped on `ready`, `offer` and `peer-left`.
    epoch: u64,
    signaling_open: bool,
    /// Whether the local offer/answer of the current epoch went out already.
    description_sent: bool,
    /// Local candidates gathered before the local description was sent.
    pending_candidates: Vec<IceCandidate>,
}

impl Negotiator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn room(&self) -> Option<&RoomId> {
        self.room.as_ref()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn handle(&mut self, event: NegotiationEvent) -> Vec<Command> {
        match event {
            NegotiationEvent::JoinRequested { room } => self.on_join_requested(room),
            NegotiationEvent::MediaAcquired => self.on_media_acquired(),
            NegotiationEvent::MediaUnavailable { reason } => self.on_media_unavailable(reason),
            NegotiationEvent::SignalingOpened => self.on_signaling_opened(),
            NegotiationEvent::SignalingClosed => self.on_signaling_lost(None),
            NegotiationEvent::SignalingFailed { reason } => {
                self.on_signaling_lost(Some(ClientError::Signaling(reason)))
            }
            NegotiationEvent::Signal(message) => self.on_signal(message),
            NegotiationEvent::LocalDescriptionReady { epoch, description } => {
                self.on_local_description(epoch, description)
            }
            NegotiationEvent::LocalDescriptionFailed { epoch, reason } => {
                self.on_local_description_failed(epoch, reason)
            }
            NegotiationEvent::Peer { epoch, event } => self.on_peer_event(epoch, event),
            NegotiationEvent::LeaveRequested => self.on_leave(),
        }
    }

    fn on_join_requested(&mut self, room: RoomId) -> Vec<Command> {
        if self.state != ConnectionState::Idle {
            warn!(state = %self.state, "Join requested on a busy call attempt; ignoring");
            return vec![];
        }
        info!(room = %room, "Joining room");
        self.room = Some(room);
        self.transition(ConnectionState::Joining);
        vec![Command::AcquireMedia]
    }

    fn on_media_acquired(&mut self) -> Vec<Command> {
        if self.state != ConnectionState::Joining || self.signaling_open {
            return vec![];
        }
        vec![Command::OpenSignaling]
    }

    fn on_media_unavailable(&mut self, reason: String) -> Vec<Command> {
        if self.state != ConnectionState::Joining {
            return vec![];
        }
        warn!(%reason, "Local media unavailable");
        self.transition(ConnectionState::Idle);
        vec![Command::Notify(CallNotice::Error(
            ClientError::MediaUnavailable(reason),
        ))]
    }

    fn on_signaling_opened(&mut self) -> Vec<Command> {
        if self.state != ConnectionState::Joining {
            return vec![];
        }
        let Some(room) = self.room.clone() else {
            return vec![];
        };
        self.signaling_open = true;
        vec![Command::Send(SignalMessage::Join { room_id: room })]
    }

    /// `error` is `None` for an orderly close of the signaling socket.
    fn on_signaling_lost(&mut self, error: Option<ClientError>) -> Vec<Command> {
        let next = match self.state {
            ConnectionState::Joining => ConnectionState::Idle,
            ConnectionState::Waiting | ConnectionState::Connected => {
                ConnectionState::Disconnected
            }
            ConnectionState::Idle | ConnectionState::Disconnected => return vec![],
        };
        self.signaling_open = false;
        self.transition(next);

        let mut commands = vec![Command::ClosePeer, Command::CloseSignaling];
        let error = match (next, error) {
            (_, Some(error)) => Some(error),
            (ConnectionState::Idle, None) => Some(ClientError::Signaling(
                "connection closed before joining".to_string(),
            )),
            _ => None,
        };
        if let Some(error) = error {
            commands.push(Command::Notify(CallNotice::Error(error)));
        }
        commands
    }

    fn on_signal(&mut self, message: SignalMessage) -> Vec<Command> {
        if !self.state.is_active() {
            debug!(tag = message.tag(), state = %self.state, "Ignoring signal");
            return vec![];
        }
        match message {
            SignalMessage::Joined { room_id, count } => {
                debug!(room = %room_id, count, "Joined room");
                if count == 1 && self.state == ConnectionState::Joining {
                    self.transition(ConnectionState::Waiting);
                }
                vec![]
            }
            SignalMessage::RoomFull => {
                self.signaling_open = false;
                self.transition(ConnectionState::Idle);
                vec![
                    Command::CloseSignaling,
                    Command::Notify(CallNotice::Error(ClientError::RoomFull)),
                ]
            }
            SignalMessage::Ready => {
                let epoch = self.next_epoch();
                vec![Command::StartOffer { epoch }]
            }
            SignalMessage::Offer { sdp } => {
                let epoch = self.next_epoch();
                vec![Command::StartAnswer { epoch, offer: sdp }]
            }
            SignalMessage::Answer { sdp } => vec![Command::ApplyAnswer {
                epoch: self.epoch,
                answer: sdp,
            }],
            SignalMessage::IceCandidate { candidate } => vec![Command::AddCandidate {
                epoch: self.epoch,
                candidate,
            }],
            SignalMessage::PeerLeft => {
                info!("Peer left the room");
                self.next_epoch();
                self.transition(ConnectionState::Waiting);
                vec![
                    Command::ClosePeer,
                    Command::Notify(CallNotice::RemoteMediaCleared),
                ]
            }
            SignalMessage::Join { .. } | SignalMessage::Leave => {
                debug!("Ignoring client-only message");
                vec![]
            }
        }
    }

    fn on_local_description(
        &mut self,
        epoch: u64,
        description: SessionDescription,
    ) -> Vec<Command> {
        if !self.is_current(epoch) {
            debug!(epoch, "Discarding stale local description");
            return vec![];
        }
        let message = match description.kind {
            SdpKind::Offer => SignalMessage::Offer { sdp: description },
            SdpKind::Answer => SignalMessage::Answer { sdp: description },
            kind => {
                warn!(?kind, "Unexpected local description type");
                return vec![];
            }
        };
        self.description_sent = true;
        self.transition(ConnectionState::Connected);

        let mut commands = vec![Command::Send(message)];
        commands.extend(
            self.pending_candidates
                .drain(..)
                .map(|candidate| Command::Send(SignalMessage::IceCandidate { candidate })),
        );
        commands
    }

    fn on_local_description_failed(&mut self, epoch: u64, reason: String) -> Vec<Command> {
        if !self.is_current(epoch) {
            return vec![];
        }
        warn!(epoch, %reason, "Negotiation step failed");
        vec![Command::Notify(CallNotice::Error(ClientError::Negotiation(
            reason,
        )))]
    }

    fn on_peer_event(&mut self, epoch: u64, event: PeerEvent) -> Vec<Command> {
        if !self.is_current(epoch) {
            debug!(epoch, current = self.epoch, "Discarding stale peer event");
            return vec![];
        }
        match event {
            PeerEvent::LocalCandidate(candidate) => {
                if self.description_sent {
                    vec![Command::Send(SignalMessage::IceCandidate { candidate })]
                } else {
                    self.pending_candidates.push(candidate);
                    vec![]
                }
            }
            PeerEvent::RemoteTrack(track) => {
                vec![Command::Notify(CallNotice::RemoteTrack(track))]
            }
            PeerEvent::ConnectionState(PeerConnectionState::Connected) => {
                self.transition(ConnectionState::Connected);
                vec![]
            }
            PeerEvent::ConnectionState(
                PeerConnectionState::Disconnected | PeerConnectionState::Failed,
            ) => {
                self.signaling_open = false;
                self.transition(ConnectionState::Disconnected);
                vec![
                    Command::ClosePeer,
                    Command::CloseSignaling,
                    Command::Notify(CallNotice::RemoteMediaCleared),
                ]
            }
            PeerEvent::ConnectionState(_) => vec![],
        }
    }

    fn on_leave(&mut self) -> Vec<Command> {
        let mut commands = Vec::new();
        if self.signaling_open {
            commands.push(Command::Send(SignalMessage::Leave));
        }
        commands.extend([
            Command::ClosePeer,
            Command::CloseSignaling,
            Command::ReleaseMedia,
        ]);
        if self.state == ConnectionState::Connected {
            commands.push(Command::Notify(CallNotice::RemoteMediaCleared));
        }

        self.signaling_open = false;
        self.room = None;
        self.next_epoch();
        self.transition(ConnectionState::Idle);
        commands
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.state.is_active() && epoch == self.epoch
    }

    fn next_epoch(&mut self) -> u64 {
        self.epoch += 1;
        self.description_sent = false;
        self.pending_candidates.clear();
        self.epoch
    }

    fn transition(&mut self, next: ConnectionState) {
        if self.state != next {
            info!(from = %self.state, to = %next, "Call state changed");
            self.state = next;
        }
    }
}
