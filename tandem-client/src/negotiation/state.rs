use std::fmt;

/// Client-visible lifecycle of one call attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Idle,
    Joining,
    Waiting,
    Connected,
    Disconnected,
}

impl ConnectionState {
    /// States in which the attempt still reacts to signaling and peer events.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Joining | Self::Waiting | Self::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Joining => "joining",
            Self::Waiting => "waiting",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
        };
        f.write_str(name)
    }
}
