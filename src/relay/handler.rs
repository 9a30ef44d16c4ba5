//! WebSocket Connection Handler
//!
//! Per-connection lifecycle: acknowledge, pump outbound frames, probe with
//! heartbeats, and route inbound frames through the client registry.

use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::interval;
use uuid::Uuid;

use super::messages::{ClientFrame, ServerFrame};
use super::registry::ClientRegistry;
use crate::startup::AppState;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.max_message_size(state.settings.relay.max_message_size)
        .on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an individual relay connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let connection_id = Uuid::new_v4();
    tracing::debug!(connection = %connection_id, "New relay connection");

    // Split socket for concurrent read/write
    let (mut sink, mut stream) = socket.split();

    // Outbound channel: the registry and the heartbeat both write here, so
    // forwarded frames and control frames share one ordered queue.
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    // Send connection acknowledgement immediately
    if tx.send(ServerFrame::connection_ack().to_text()).is_err() {
        return;
    }

    // Spawn task to pump frames from the channel to the WebSocket
    let pump = tokio::spawn(async move {
        while let Some(text) = rx.recv().await {
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    // Liveness flag: armed on connect, re-armed only by pong, checked
    // before each probe.
    let mut alive = true;
    let mut heartbeat = interval(Duration::from_secs(
        state.settings.relay.heartbeat_interval_secs,
    ));
    heartbeat.tick().await; // Skip first immediate tick

    loop {
        tokio::select! {
            // Handle incoming frames
            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        handle_frame(&text, connection_id, &tx, &state.registry, &mut alive);
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::debug!(connection = %connection_id, "Connection closed");
                        break;
                    }
                    Some(Ok(_)) => {
                        // Binary and transport-level ping/pong frames are
                        // not part of the relay protocol
                    }
                    Some(Err(e)) => {
                        tracing::debug!(connection = %connection_id, error = %e, "WebSocket error");
                        break;
                    }
                }
            }

            // Heartbeat probe / half-open reaping
            _ = heartbeat.tick() => {
                if !alive {
                    tracing::info!(connection = %connection_id, "Heartbeat missed, closing connection");
                    break;
                }
                alive = false;
                if tx.send(ServerFrame::Ping.to_text()).is_err() {
                    break;
                }
            }
        }
    }

    // Cleanup: reap every registration owned by this connection
    state.registry.remove_connection(connection_id);
    pump.abort();

    tracing::debug!(connection = %connection_id, "Relay connection finished");
}

/// Handle one inbound text frame.
///
/// Malformed payloads are logged and ignored; the connection stays open. A
/// routable frame may both (re)register its sender and be forwarded to its
/// receiver.
fn handle_frame(
    text: &str,
    connection_id: Uuid,
    tx: &mpsc::UnboundedSender<String>,
    registry: &ClientRegistry,
    alive: &mut bool,
) {
    match ClientFrame::parse(text) {
        Err(e) => {
            tracing::warn!(connection = %connection_id, error = %e, "Malformed relay frame");
        }
        Ok(ClientFrame::Pong) => {
            *alive = true;
            tracing::trace!(connection = %connection_id, "Pong received");
        }
        Ok(ClientFrame::Routed {
            sender_id,
            receiver_id,
            ..
        }) => {
            if let Some(sender_id) = sender_id {
                registry.register(&sender_id, connection_id, tx.clone());
            }
            if let Some(receiver_id) = receiver_id {
                if !registry.forward(&receiver_id, text) {
                    tracing::trace!(
                        connection = %connection_id,
                        receiver_id,
                        "Undeliverable frame dropped"
                    );
                }
            }
        }
    }
}
