use crate::AppState;
use crate::registry::RoomRegistry;
use crate::signaling::SignalingSession;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tracing::{error, info};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let registry = state.registry.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, registry))
}

async fn handle_socket(socket: WebSocket, registry: RoomRegistry) {
    let (session, mut outbox) = SignalingSession::open(registry);
    let member = session.member();
    info!(%member, "New WebSocket connection");

    let (mut sender, mut receiver) = socket.split();

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = outbox.recv().await {
            let json = match msg.into_text() {
                Ok(json) => json,
                Err(e) => {
                    error!(%member, "Failed to serialize signal message: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    // The session lives in this task; aborting it drops the session, which
    // still runs the leave cleanup.
    let mut recv_task = tokio::spawn(async move {
        let mut session = session;
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => session.handle_frame(text.as_str()),
                Message::Close(_) => break,
                _ => {}
            }
        }
        session.close();
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    info!(%member, "WebSocket disconnected");
}
