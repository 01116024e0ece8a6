//! WebSocket fan-out of batch status events.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};

use fileforge_core::StatusEnvelope;

use crate::metrics::{WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_LAG_EVENTS, WS_MESSAGES_SENT};
use crate::state::AppState;

/// Broadcaster for status envelopes using a tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct StatusBroadcaster {
    sender: broadcast::Sender<StatusEnvelope>,
}

impl StatusBroadcaster {
    /// Create a new broadcaster with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Broadcast an envelope to all connected clients.
    pub fn broadcast(&self, envelope: StatusEnvelope) {
        // No receivers just means no client is connected.
        let _ = self.sender.send(envelope);
    }

    /// Subscribe to receive envelopes.
    pub fn subscribe(&self) -> broadcast::Receiver<StatusEnvelope> {
        self.sender.subscribe()
    }
}

impl Default for StatusBroadcaster {
    fn default() -> Self {
        Self::new(256)
    }
}

/// Moves envelopes from the core status channel to the broadcaster until
/// every `StatusSender` is dropped.
pub async fn forward_status(mut rx: mpsc::Receiver<StatusEnvelope>, broadcaster: StatusBroadcaster) {
    while let Some(envelope) = rx.recv().await {
        broadcaster.broadcast(envelope);
    }
    debug!("Status channel closed");
}

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle a single WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.broadcaster().subscribe();

    WS_CONNECTIONS_TOTAL.inc();
    WS_CONNECTIONS_ACTIVE.inc();
    info!("WebSocket client connected");

    let send_task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(envelope) => {
                    WS_MESSAGES_SENT
                        .with_label_values(&[envelope.channel.as_str()])
                        .inc();

                    match serde_json::to_string(&envelope) {
                        Ok(json) => {
                            if sender.send(Message::Text(json.into())).await.is_err() {
                                debug!("WebSocket send failed, client disconnected");
                                break;
                            }
                        }
                        Err(e) => {
                            error!("Failed to serialize status envelope: {}", e);
                        }
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("WebSocket client lagged, skipped {} status events", n);
                    WS_LAG_EVENTS.inc();
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("Broadcast channel closed");
                    break;
                }
            }
        }
    });

    // Clients only listen; drain until they close.
    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Close(_)) => {
                debug!("WebSocket client requested close");
                break;
            }
            Ok(Message::Text(text)) => {
                debug!("Ignoring client message: {}", text);
            }
            Ok(_) => {}
            Err(e) => {
                warn!("WebSocket receive error: {}", e);
                break;
            }
        }
    }

    send_task.abort();
    WS_CONNECTIONS_ACTIVE.dec();
    info!("WebSocket client disconnected");
}
