use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tandem_core::{SignalMessage, codec};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalingEvent {
    Message(SignalMessage),
    /// The server closed the connection.
    Closed,
    Failed(String),
}

/// An open signaling connection. Dropping `outgoing` closes it.
#[derive(Debug)]
pub struct SignalingLink {
    pub outgoing: mpsc::UnboundedSender<SignalMessage>,
    pub incoming: mpsc::UnboundedReceiver<SignalingEvent>,
}

#[async_trait]
pub trait SignalingConnector: Send + Sync {
    async fn connect(&self) -> Result<SignalingLink>;
}

/// Connects to the signaling server over WebSocket.
#[derive(Debug, Clone)]
pub struct WsConnector {
    url: String,
}

impl WsConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl SignalingConnector for WsConnector {
    async fn connect(&self) -> Result<SignalingLink> {
        let (socket, _) = connect_async(self.url.as_str())
            .await
            .with_context(|| format!("Failed to connect to {}", self.url))?;
        debug!(url = %self.url, "Signaling connected");

        let (mut sink, mut stream) = socket.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<SignalMessage>();
        let (in_tx, in_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Some(message) = out_rx.recv().await {
                let json = match codec::encode(&message) {
                    Ok(json) => json,
                    Err(e) => {
                        warn!("Failed to encode {}: {}", message.tag(), e);
                        continue;
                    }
                };
                if sink.send(Message::text(json)).await.is_err() {
                    break;
                }
            }
            let _ = sink.close().await;
        });

        tokio::spawn(async move {
            loop {
                let event = match stream.next().await {
                    Some(Ok(Message::Text(text))) => match codec::decode(text.as_str()) {
                        Ok(message) => SignalingEvent::Message(message),
                        Err(e) => {
                            debug!("Dropping malformed frame: {}", e);
                            continue;
                        }
                    },
                    Some(Ok(Message::Close(_))) | None => {
                        let _ = in_tx.send(SignalingEvent::Closed);
                        break;
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        let _ = in_tx.send(SignalingEvent::Failed(e.to_string()));
                        break;
                    }
                };
                if in_tx.send(event).is_err() {
                    break;
                }
            }
        });

        Ok(SignalingLink {
            outgoing: out_tx,
            incoming: in_rx,
        })
    }
}
