use tandem_core::MemberId;

/// Maximum number of members a room admits.
pub const ROOM_CAPACITY: usize = 2;

/// Membership of one room, in arrival order.
#[derive(Debug, Default, Clone)]
pub struct Room {
    members: Vec<MemberId>,
}

impl Room {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a member. Returns the new occupancy, or `None` when the room is full.
    pub fn admit(&mut self, member: MemberId) -> Option<usize> {
        if self.is_full() {
            return None;
        }
        if !self.contains(&member) {
            self.members.push(member);
        }
        Some(self.members.len())
    }

    pub fn remove(&mut self, member: &MemberId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m != member);
        self.members.len() != before
    }

    /// The other occupant, if `member` is in the room and not alone.
    pub fn peer_of(&self, member: &MemberId) -> Option<MemberId> {
        if !self.contains(member) {
            return None;
        }
        self.members.iter().find(|m| *m != member).copied()
    }

    pub fn contains(&self, member: &MemberId) -> bool {
        self.members.contains(member)
    }

    pub fn members(&self) -> &[MemberId] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= ROOM_CAPACITY
    }
}
