use serde::{Deserialize, Serialize};

/// STUN/TURN server handed to the peer-connection engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

pub const DEFAULT_STUN_ADDR: &str = "stun:stun.l.google.com:19302";
pub const DEFAULT_STUN_ADDR_2: &str = "stun:stun1.l.google.com:19302";

impl IceServerConfig {
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: None,
            credential: None,
        }
    }

    /// Public STUN servers used when nothing else is configured.
    pub fn defaults() -> Vec<Self> {
        vec![Self::stun(DEFAULT_STUN_ADDR), Self::stun(DEFAULT_STUN_ADDR_2)]
    }
}
