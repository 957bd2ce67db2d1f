use std::net::SocketAddr;
use tandem_server::{AppState, RoomRegistry, serve};
use tokio::net::TcpListener;

/// A signaling server bound to an ephemeral localhost port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub registry: RoomRegistry,
}

impl TestServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");

        let state = AppState::new();
        let registry = state.registry.clone();

        tokio::spawn(async move {
            if let Err(e) = serve(listener, state).await {
                tracing::error!("[TestServer] stopped: {}", e);
            }
        });

        Self { addr, registry }
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }
}
