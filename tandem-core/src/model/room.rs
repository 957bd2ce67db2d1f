use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Caller-chosen room name. Opaque to the server apart from being non-empty.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RoomId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for RoomId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
