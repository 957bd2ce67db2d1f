/// Result of asking the registry to place a member in a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The member is now in the room; `count` is the occupancy including it.
    Accepted { count: usize },

    /// The room already holds two members. The joiner is left without a room.
    RoomFull,
}

impl JoinOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}
