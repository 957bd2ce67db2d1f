use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tandem_client::{SignalingConnector, SignalingEvent, SignalingLink};
use tandem_core::SignalMessage;
use tokio::sync::{mpsc, oneshot};

/// The far end of an in-memory signaling link, driven by the test.
pub struct ServerSide {
    from_client: mpsc::UnboundedReceiver<SignalMessage>,
    to_client: mpsc::UnboundedSender<SignalingEvent>,
}

impl ServerSide {
    pub fn send(&self, message: SignalMessage) {
        self.to_client
            .send(SignalingEvent::Message(message))
            .expect("Client stopped listening");
    }

    pub fn close(&self) {
        let _ = self.to_client.send(SignalingEvent::Closed);
    }

    pub fn fail(&self, reason: &str) {
        let _ = self.to_client.send(SignalingEvent::Failed(reason.to_string()));
    }

    /// Next message from the client, or `None` if the link closed first.
    pub async fn recv(&mut self) -> Option<SignalMessage> {
        tokio::time::timeout(Duration::from_secs(2), self.from_client.recv())
            .await
            .expect("Timed out waiting for a client message")
    }

    /// Wait for the client to drop the link, returning whatever it still sent.
    pub async fn closed(&mut self) -> Vec<SignalMessage> {
        let mut rest = Vec::new();
        while let Some(message) = self.recv().await {
            rest.push(message);
        }
        rest
    }
}

/// Connector whose links end in the test instead of a socket.
pub struct MemoryConnector {
    refuse: bool,
    gate: Mutex<Option<oneshot::Receiver<()>>>,
    connects: AtomicUsize,
    accepted: mpsc::UnboundedSender<ServerSide>,
}

impl MemoryConnector {
    fn build(refuse: bool, gate: Option<oneshot::Receiver<()>>) -> (Arc<Self>, Accepted) {
        let (tx, rx) = mpsc::unbounded_channel();
        let connector = Arc::new(Self {
            refuse,
            gate: Mutex::new(gate),
            connects: AtomicUsize::new(0),
            accepted: tx,
        });
        (connector, Accepted(rx))
    }

    pub fn new() -> (Arc<Self>, Accepted) {
        Self::build(false, None)
    }

    pub fn refusing() -> (Arc<Self>, Accepted) {
        Self::build(true, None)
    }

    /// The first connection only opens once the returned sender fires.
    pub fn gated() -> (Arc<Self>, Accepted, oneshot::Sender<()>) {
        let (release, gate) = oneshot::channel();
        let (connector, accepted) = Self::build(false, Some(gate));
        (connector, accepted, release)
    }

    /// Connection attempts started so far, including ones still held at the gate.
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SignalingConnector for MemoryConnector {
    async fn connect(&self) -> Result<SignalingLink> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if self.refuse {
            bail!("connection refused");
        }
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        self.accepted
            .send(ServerSide {
                from_client: out_rx,
                to_client: in_tx,
            })
            .map_err(|_| anyhow!("test stopped accepting connections"))?;
        Ok(SignalingLink {
            outgoing: out_tx,
            incoming: in_rx,
        })
    }
}

/// Links opened through a [`MemoryConnector`], in connection order.
pub struct Accepted(mpsc::UnboundedReceiver<ServerSide>);

impl Accepted {
    pub async fn next(&mut self) -> ServerSide {
        tokio::time::timeout(Duration::from_secs(2), self.0.recv())
            .await
            .expect("Timed out waiting for a connection")
            .expect("Connector dropped")
    }

    pub fn none_pending(&mut self) -> bool {
        self.0.try_recv().is_err()
    }
}
