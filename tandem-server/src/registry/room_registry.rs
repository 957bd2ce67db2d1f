use crate::error::RegistryError;
use crate::registry::{JoinOutcome, Outbound, ROOM_CAPACITY, Room};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use tandem_core::{MemberId, RelayFrame, RoomId, SignalMessage};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Channel a connection drains to write server frames back to its socket.
pub type Outbox = mpsc::UnboundedSender<Outbound>;

struct MemberEntry {
    outbox: Outbox,
    room: Option<RoomId>,
}

struct RegistryInner {
    rooms: DashMap<RoomId, Room>,
    members: DashMap<MemberId, MemberEntry>,
}

/// Process-wide table of rooms and live members.
///
/// Every mutation of a room and every relay through it runs under that room's
/// entry lock, so joins, leaves and relays touching one room are serialized while
/// different rooms proceed independently. Locks are always taken rooms-first,
/// members-second.
#[derive(Clone)]
pub struct RoomRegistry {
    inner: Arc<RegistryInner>,
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                rooms: DashMap::new(),
                members: DashMap::new(),
            }),
        }
    }

    /// Attach a live connection. Returns the receiving end of its outbox.
    pub fn register(&self, member: MemberId) -> mpsc::UnboundedReceiver<Outbound> {
        self.leave(&member);

        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.members.insert(
            member,
            MemberEntry {
                outbox: tx,
                room: None,
            },
        );
        debug!(%member, "member registered");
        rx
    }

    /// Detach a connection, leaving its room first.
    pub fn unregister(&self, member: &MemberId) {
        self.leave(member);
        if self.inner.members.remove(member).is_some() {
            debug!(%member, "member unregistered");
        }
    }

    /// Place `member` in `room_id`, moving it out of any room it is currently in.
    pub fn join(&self, member: &MemberId, room_id: RoomId) -> Result<JoinOutcome, RegistryError> {
        if !self.inner.members.contains_key(member) {
            return Err(RegistryError::UnknownMember(*member));
        }

        self.leave(member);

        let outcome = match self.inner.rooms.entry(room_id.clone()) {
            Entry::Occupied(mut entry) => match entry.get_mut().admit(*member) {
                Some(count) => self.admitted(member, &room_id, count),
                None => {
                    self.deliver(member, SignalMessage::RoomFull);
                    JoinOutcome::RoomFull
                }
            },
            Entry::Vacant(entry) => {
                let mut room = Room::new();
                let count = room.admit(*member).unwrap_or(1);
                entry.insert(room);
                info!(room = %room_id, "Creating new room");
                self.admitted(member, &room_id, count)
            }
        };

        match outcome {
            JoinOutcome::Accepted { count } => {
                info!(
                    %member,
                    room = %room_id,
                    "Member joined room ({}/{} participants)",
                    count,
                    ROOM_CAPACITY
                )
            }
            JoinOutcome::RoomFull => info!(%member, room = %room_id, "Join rejected, room is full"),
        }

        Ok(outcome)
    }

    // Runs under the room's entry lock so the notifications are ordered with
    // respect to any leave or relay touching the same room.
    fn admitted(&self, member: &MemberId, room_id: &RoomId, count: usize) -> JoinOutcome {
        if let Some(mut entry) = self.inner.members.get_mut(member) {
            entry.room = Some(room_id.clone());
        }

        self.deliver(
            member,
            SignalMessage::Joined {
                room_id: room_id.clone(),
                count,
            },
        );

        if count == 2 {
            self.deliver(member, SignalMessage::Ready);
        }

        JoinOutcome::Accepted { count }
    }

    /// Forward an offer, answer or candidate, exactly as received, to the sender's
    /// room peer.
    ///
    /// Returns whether the frame was handed to a peer. Members without a room and
    /// rooms without a second member are silently ignored.
    pub fn relay(&self, member: &MemberId, frame: RelayFrame) -> bool {
        let Some(room_id) = self.room_of(member) else {
            return false;
        };
        let Some(room) = self.inner.rooms.get(&room_id) else {
            return false;
        };
        let Some(peer) = room.peer_of(member) else {
            return false;
        };

        debug!(%member, %peer, tag = frame.tag(), "relaying");
        self.deliver(&peer, frame)
    }

    /// Take `member` out of its room, telling the remaining member and dropping
    /// the room once it is empty. Returns `false` when the member had no room.
    pub fn leave(&self, member: &MemberId) -> bool {
        let Some(room_id) = self
            .inner
            .members
            .get_mut(member)
            .and_then(|mut entry| entry.room.take())
        else {
            return false;
        };

        let remaining = match self.inner.rooms.entry(room_id.clone()) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().remove(member);

                for peer in entry.get().members() {
                    self.deliver(peer, SignalMessage::PeerLeft);
                }

                let remaining = entry.get().len();
                if remaining == 0 {
                    entry.remove();
                    info!(room = %room_id, "Room is empty, removing");
                }
                remaining
            }
            Entry::Vacant(_) => {
                warn!(%member, room = %room_id, "Member referenced a room that no longer exists");
                0
            }
        };

        info!(%member, room = %room_id, "Member left room ({} remaining)", remaining);
        true
    }

    pub fn room_of(&self, member: &MemberId) -> Option<RoomId> {
        self.inner
            .members
            .get(member)
            .and_then(|entry| entry.room.clone())
    }

    /// Current number of members in `room_id`; zero for rooms that do not exist.
    pub fn occupancy(&self, room_id: &str) -> usize {
        self.inner
            .rooms
            .get(room_id)
            .map(|room| room.len())
            .unwrap_or(0)
    }

    pub fn room_count(&self) -> usize {
        self.inner.rooms.len()
    }

    pub fn member_count(&self) -> usize {
        self.inner.members.len()
    }

    fn deliver(&self, member: &MemberId, message: impl Into<Outbound>) -> bool {
        let Some(entry) = self.inner.members.get(member) else {
            warn!(%member, "Attempted to send signal to unregistered member");
            return false;
        };

        // A closed outbox means the connection is already going away; its own
        // closure runs the leave cleanup.
        if let Err(e) = entry.outbox.send(message.into()) {
            debug!(%member, tag = e.0.tag(), "Outbox closed, dropping message");
            return false;
        }
        true
    }
}
