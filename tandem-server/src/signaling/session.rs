use crate::registry::{JoinOutcome, Outbound, RoomRegistry};
use tandem_core::{Inbound, MemberId, RoomId, SignalMessage, codec};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Binds one signaling connection to its room membership.
///
/// The session owns no socket; the WebSocket handler feeds it text frames and
/// drains the outbox returned by [`SignalingSession::open`]. Cleanup runs exactly
/// once, either through [`SignalingSession::close`] or when the session is dropped.
pub struct SignalingSession {
    member: MemberId,
    room: Option<RoomId>,
    registry: RoomRegistry,
    closed: bool,
}

impl SignalingSession {
    pub fn open(registry: RoomRegistry) -> (Self, mpsc::UnboundedReceiver<Outbound>) {
        let member = MemberId::new();
        let outbox = registry.register(member);

        let session = Self {
            member,
            room: None,
            registry,
            closed: false,
        };
        (session, outbox)
    }

    pub fn member(&self) -> MemberId {
        self.member
    }

    pub fn room(&self) -> Option<&RoomId> {
        self.room.as_ref()
    }

    /// Decode and dispatch one text frame. Frames that do not decode are dropped.
    ///
    /// Offers, answers and candidates are forwarded as the raw text they arrived in.
    pub fn handle_frame(&mut self, text: &str) {
        match codec::decode_inbound(text) {
            Ok(Inbound::Relay(frame)) => {
                self.registry.relay(&self.member, frame);
            }
            Ok(Inbound::Message(message)) => self.handle_message(message),
            Err(e) => debug!(member = %self.member, "Dropping frame: {}", e),
        }
    }

    fn handle_message(&mut self, message: SignalMessage) {
        match message {
            SignalMessage::Join { room_id } => {
                info!(member = %self.member, room = %room_id, "Member wants to join room");
                match self.registry.join(&self.member, room_id.clone()) {
                    Ok(JoinOutcome::Accepted { .. }) => self.room = Some(room_id),
                    Ok(JoinOutcome::RoomFull) => self.room = None,
                    Err(e) => {
                        warn!(member = %self.member, "Join failed: {}", e);
                        self.room = None;
                    }
                }
            }

            SignalMessage::Leave => {
                self.registry.leave(&self.member);
                self.room = None;
            }

            other => {
                debug!(
                    member = %self.member,
                    tag = other.tag(),
                    "Dropping message the server does not accept from clients"
                );
            }
        }
    }

    /// Leave the current room and detach from the registry.
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.room = None;
        self.registry.unregister(&self.member);
        debug!(member = %self.member, "Session closed");
    }
}

impl Drop for SignalingSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}
