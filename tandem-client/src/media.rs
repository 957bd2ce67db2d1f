use crate::error::ClientError;
use crate::peer::MediaKind;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use webrtc::track::track_local::TrackLocal;

pub type TrackHandle = Arc<dyn TrackLocal + Send + Sync>;

/// One captured track plus its on/off switch.
///
/// Clones share the switch. Whatever writes samples into the track keeps a clone and
/// skips writing while [`LocalTrack::is_enabled`] is false; the track stays negotiated,
/// so muting never renegotiates.
#[derive(Clone)]
pub struct LocalTrack {
    track: TrackHandle,
    kind: MediaKind,
    enabled: Arc<AtomicBool>,
}

impl LocalTrack {
    pub fn new(track: TrackHandle, kind: MediaKind) -> Self {
        Self {
            track,
            kind,
            enabled: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn track(&self) -> &TrackHandle {
        &self.track
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }
}

impl fmt::Debug for LocalTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalTrack")
            .field("id", &self.track.id())
            .field("kind", &self.kind)
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

/// Captured local tracks contributed to every peer connection of a call.
#[derive(Clone, Default)]
pub struct LocalMedia {
    tracks: Vec<LocalTrack>,
}

impl LocalMedia {
    pub fn new(tracks: Vec<LocalTrack>) -> Self {
        Self { tracks }
    }

    pub fn tracks(&self) -> &[LocalTrack] {
        &self.tracks
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Whether tracks of `kind` are on. `None` when there are no such tracks.
    pub fn is_enabled(&self, kind: MediaKind) -> Option<bool> {
        self.of_kind(kind).next().map(LocalTrack::is_enabled)
    }

    /// Flip every track of `kind` and return the new setting, or `None` when the media
    /// has no track of that kind.
    pub fn toggle(&self, kind: MediaKind) -> Option<bool> {
        let enabled = !self.is_enabled(kind)?;
        for track in self.of_kind(kind) {
            track.set_enabled(enabled);
        }
        Some(enabled)
    }

    fn of_kind(&self, kind: MediaKind) -> impl Iterator<Item = &LocalTrack> {
        self.tracks.iter().filter(move |track| track.kind() == kind)
    }
}

impl fmt::Debug for LocalMedia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalMedia")
            .field("tracks", &self.tracks.len())
            .finish()
    }
}

/// Capture device access. Acquisition may suspend for as long as the platform needs
/// (permission prompts and the like).
#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn acquire(&self) -> Result<LocalMedia, ClientError>;
}
