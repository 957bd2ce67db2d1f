use crate::error::PeerError;
use crate::media::LocalMedia;
use crate::negotiation::NegotiationEvent;
use crate::peer::{PeerConnection, PeerConnectionFactory, PeerEventSink};
use std::sync::Arc;
use tandem_core::{IceCandidate, SessionDescription};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

enum PeerOp {
    Offer,
    Answer(SessionDescription),
    ApplyAnswer(SessionDescription),
    AddCandidate(IceCandidate),
}

/// Handle to one peer-connection instance.
///
/// The instance lives in its own task and runs operations strictly in submission order,
/// so remote candidates queued behind an `answer` are only added once the remote
/// description is in place. Description results come back as [`NegotiationEvent`]s stamped
/// with the adapter's epoch. Dropping the handle closes the peer; queued operations that
/// have not started yet are abandoned.
pub struct PeerAdapter {
    epoch: u64,
    ops: mpsc::UnboundedSender<PeerOp>,
    _shutdown: oneshot::Sender<()>,
}

impl PeerAdapter {
    pub fn spawn(
        factory: Arc<dyn PeerConnectionFactory>,
        media: LocalMedia,
        epoch: u64,
        events: mpsc::UnboundedSender<NegotiationEvent>,
    ) -> Self {
        let (ops_tx, ops_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        tokio::spawn(run_peer(factory, media, epoch, events, ops_rx, shutdown_rx));

        Self {
            epoch,
            ops: ops_tx,
            _shutdown: shutdown_tx,
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Create a local offer and set it as the local description.
    pub fn offer(&self) {
        self.submit(PeerOp::Offer);
    }

    /// Set `offer` as remote description, then create and set the local answer.
    pub fn answer(&self, offer: SessionDescription) {
        self.submit(PeerOp::Answer(offer));
    }

    pub fn apply_answer(&self, answer: SessionDescription) {
        self.submit(PeerOp::ApplyAnswer(answer));
    }

    pub fn add_candidate(&self, candidate: IceCandidate) {
        self.submit(PeerOp::AddCandidate(candidate));
    }

    pub fn close(self) {
        debug!(epoch = self.epoch, "Closing peer");
    }

    fn submit(&self, op: PeerOp) {
        if self.ops.send(op).is_err() {
            debug!(epoch = self.epoch, "Peer task already stopped");
        }
    }
}

async fn run_peer(
    factory: Arc<dyn PeerConnectionFactory>,
    media: LocalMedia,
    epoch: u64,
    events: mpsc::UnboundedSender<NegotiationEvent>,
    mut ops: mpsc::UnboundedReceiver<PeerOp>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let sink = PeerEventSink::new(epoch, events.clone());
    let peer = match factory.create(sink).await {
        Ok(peer) => peer,
        Err(e) => {
            warn!(epoch, "Failed to create peer connection: {}", e);
            let _ = events.send(NegotiationEvent::LocalDescriptionFailed {
                epoch,
                reason: e.to_string(),
            });
            return;
        }
    };

    if let Err(e) = peer.add_local_media(&media).await {
        warn!(epoch, "Failed to attach local media: {}", e);
    }

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            op = ops.recv() => match op {
                Some(op) => execute(peer.as_ref(), epoch, &events, op).await,
                None => break,
            },
        }
    }

    if let Err(e) = peer.close().await {
        debug!(epoch, "Error closing peer connection: {}", e);
    }
    debug!(epoch, "Peer connection closed");
}

async fn execute(
    peer: &dyn PeerConnection,
    epoch: u64,
    events: &mpsc::UnboundedSender<NegotiationEvent>,
    op: PeerOp,
) {
    let described = match op {
        PeerOp::Offer => create_offer(peer).await,
        PeerOp::Answer(offer) => create_answer(peer, offer).await,
        PeerOp::ApplyAnswer(answer) => {
            if let Err(e) = peer.set_remote_description(answer).await {
                warn!(epoch, "Failed to apply remote answer: {}", e);
            }
            return;
        }
        PeerOp::AddCandidate(candidate) => {
            if let Err(e) = peer.add_ice_candidate(candidate).await {
                warn!(epoch, "Error adding ICE candidate: {}", e);
            }
            return;
        }
    };

    let event = match described {
        Ok(description) => NegotiationEvent::LocalDescriptionReady { epoch, description },
        Err(e) => NegotiationEvent::LocalDescriptionFailed {
            epoch,
            reason: e.to_string(),
        },
    };
    let _ = events.send(event);
}

async fn create_offer(peer: &dyn PeerConnection) -> Result<SessionDescription, PeerError> {
    let offer = peer.create_offer().await?;
    peer.set_local_description(offer.clone()).await?;
    Ok(offer)
}

async fn create_answer(
    peer: &dyn PeerConnection,
    offer: SessionDescription,
) -> Result<SessionDescription, PeerError> {
    peer.set_remote_description(offer).await?;
    let answer = peer.create_answer().await?;
    peer.set_local_description(answer.clone()).await?;
    Ok(answer)
}
