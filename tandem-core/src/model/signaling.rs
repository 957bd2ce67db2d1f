use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};

/// Which half of the offer/answer exchange a description belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpKind {
    Offer,
    Pranswer,
    Answer,
    Rollback,
}

/// Session description in the shape browsers produce: `{"type": "offer", "sdp": "v=0..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub kind: SdpKind,
    pub sdp: String,
}

impl SessionDescription {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Offer,
            sdp: sdp.into(),
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Answer,
            sdp: sdp.into(),
        }
    }
}

/// Connectivity candidate in the `RTCIceCandidateInit` JSON shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidate {
    pub candidate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdp_mid: Option<String>,
    #[serde(
        default,
        rename = "sdpMLineIndex",
        skip_serializing_if = "Option::is_none"
    )]
    pub sdp_m_line_index: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username_fragment: Option<String>,
}

/// One frame of the signaling protocol.
///
/// `join` and `leave` are requests handled by the server itself; `offer`, `answer` and
/// `ice-candidate` are relayed untouched to the other member of the room; the rest are
/// notifications only the server emits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SignalMessage {
    Join {
        #[serde(rename = "roomId")]
        room_id: RoomId,
    },
    Joined {
        #[serde(rename = "roomId")]
        room_id: RoomId,
        count: usize,
    },
    RoomFull,
    Ready,
    Offer {
        sdp: SessionDescription,
    },
    Answer {
        sdp: SessionDescription,
    },
    IceCandidate {
        candidate: IceCandidate,
    },
    Leave,
    PeerLeft,
}

impl SignalMessage {
    pub fn join(room_id: impl Into<RoomId>) -> Self {
        Self::Join {
            room_id: room_id.into(),
        }
    }

    /// Wire name of the message, as it appears in the `type` field.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::Joined { .. } => "joined",
            Self::RoomFull => "room-full",
            Self::Ready => "ready",
            Self::Offer { .. } => "offer",
            Self::Answer { .. } => "answer",
            Self::IceCandidate { .. } => "ice-candidate",
            Self::Leave => "leave",
            Self::PeerLeft => "peer-left",
        }
    }
}
