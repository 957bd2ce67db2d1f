use anyhow::{Context, Result, bail};
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tandem_core::{RoomId, SignalMessage, codec};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

/// How long a test waits for an expected frame (ms).
pub const RECV_TIMEOUT_MS: u64 = 2000;

/// How long a test listens before concluding nothing else is coming (ms).
pub const SILENCE_MS: u64 = 200;

/// A bare WebSocket participant speaking the signaling protocol.
pub struct TestClient {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    pub async fn connect(url: &str) -> Result<Self> {
        let (socket, _) = connect_async(url)
            .await
            .context("Failed to open WebSocket")?;
        Ok(Self { socket })
    }

    pub async fn send(&mut self, msg: &SignalMessage) -> Result<()> {
        let json = codec::encode(msg).context("Failed to encode message")?;
        self.send_raw(&json).await
    }

    pub async fn send_raw(&mut self, text: &str) -> Result<()> {
        self.socket
            .send(Message::text(text.to_string()))
            .await
            .context("Failed to send frame")?;
        Ok(())
    }

    /// Send `join` and return the server's first answer to it.
    pub async fn join(&mut self, room: &str) -> Result<SignalMessage> {
        self.send(&SignalMessage::join(room)).await?;
        self.recv().await
    }

    /// Wait for the next signaling message.
    pub async fn recv(&mut self) -> Result<SignalMessage> {
        let text = self.recv_text().await?;
        codec::decode(&text).context("Server sent a bad frame")
    }

    /// Wait for the next text frame, exactly as the server wrote it.
    pub async fn recv_text(&mut self) -> Result<String> {
        let deadline = Duration::from_millis(RECV_TIMEOUT_MS);
        loop {
            let next = tokio::time::timeout(deadline, self.socket.next())
                .await
                .context("Timeout waiting for message")?;

            match next {
                Some(Ok(Message::Text(text))) => return Ok(text.as_str().to_string()),
                Some(Ok(Message::Close(_))) | None => bail!("Connection closed"),
                Some(Ok(_)) => continue,
                Some(Err(e)) => bail!("WebSocket error: {}", e),
            }
        }
    }

    /// Succeeds if no text frame arrives within [`SILENCE_MS`].
    pub async fn expect_silence(&mut self) -> Result<()> {
        let window = Duration::from_millis(SILENCE_MS);
        match tokio::time::timeout(window, self.socket.next()).await {
            Err(_) => Ok(()),
            Ok(Some(Ok(Message::Text(text)))) => bail!("Unexpected message: {}", text.as_str()),
            Ok(_) => Ok(()),
        }
    }

    pub async fn close(mut self) -> Result<()> {
        self.socket
            .close(None)
            .await
            .context("Failed to close WebSocket")?;
        Ok(())
    }

    /// Drop the socket without a close handshake.
    pub fn drop_abruptly(self) {
        drop(self.socket);
    }
}

pub fn joined(room: &str, count: usize) -> SignalMessage {
    SignalMessage::Joined {
        room_id: RoomId::from(room),
        count,
    }
}
