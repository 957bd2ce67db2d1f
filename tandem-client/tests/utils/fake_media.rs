use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tandem_client::{ClientError, LocalMedia, LocalTrack, MediaKind, MediaSource};
use tokio::sync::oneshot;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8};
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

/// Media source whose answer is fixed up front; counts how often it was asked.
///
/// Granted media is one microphone and one camera track. The source keeps its own
/// handle on them, the way a capture loop would, so tests can see mute switches flip.
pub struct FakeMedia {
    denied: Option<String>,
    media: LocalMedia,
    gate: Mutex<Option<oneshot::Receiver<()>>>,
    requests: AtomicUsize,
}

impl FakeMedia {
    fn build(denied: Option<String>, gate: Option<oneshot::Receiver<()>>) -> Arc<Self> {
        Arc::new(Self {
            denied,
            media: microphone_and_camera(),
            gate: Mutex::new(gate),
            requests: AtomicUsize::new(0),
        })
    }

    pub fn granted() -> Arc<Self> {
        Self::build(None, None)
    }

    pub fn denied(reason: &str) -> Arc<Self> {
        Self::build(Some(reason.to_string()), None)
    }

    /// Grants media, but the first acquisition only completes once the returned
    /// sender fires (or is dropped).
    pub fn gated() -> (Arc<Self>, oneshot::Sender<()>) {
        let (release, gate) = oneshot::channel();
        (Self::build(None, Some(gate)), release)
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn media(&self) -> LocalMedia {
        self.media.clone()
    }
}

#[async_trait]
impl MediaSource for FakeMedia {
    async fn acquire(&self) -> Result<LocalMedia, ClientError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        match &self.denied {
            Some(reason) => Err(ClientError::MediaUnavailable(reason.clone())),
            None => Ok(self.media.clone()),
        }
    }
}

fn microphone_and_camera() -> LocalMedia {
    let track = |mime: &str, id: &str, kind| {
        let sample = TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: mime.to_owned(),
                ..Default::default()
            },
            id.to_owned(),
            "fake".to_owned(),
        );
        LocalTrack::new(Arc::new(sample), kind)
    };
    LocalMedia::new(vec![
        track(MIME_TYPE_OPUS, "audio", MediaKind::Audio),
        track(MIME_TYPE_VP8, "video", MediaKind::Video),
    ])
}
