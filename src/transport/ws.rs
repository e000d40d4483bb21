// src/transport/ws.rs - WebSocket Viewer Channel
//! Realtime order-event push to staff displays.
//!
//! Each connection gets its own broadcast receiver, so one slow viewer never
//! delays another. On attach the viewer receives a `{"event":"connected"}`
//! acknowledgement and nothing else; there is no event replay, current state
//! comes from the listing endpoint. A viewer that falls behind the queue
//! capacity skips the missed events and keeps receiving from the present.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::{engine::Broadcaster, AppState};

/// Upgrade handler for `GET /ws`.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state.broadcaster.clone()))
}

async fn handle_socket(socket: WebSocket, broadcaster: Broadcaster) {
    let (mut sender, mut receiver) = socket.split();
    let mut events = broadcaster.subscribe();

    // Attach acknowledgement, sent before any event.
    let ack = r#"{"event":"connected"}"#.to_string();
    if sender.send(Message::Text(ack)).await.is_err() {
        return;
    }
    info!(viewers = broadcaster.viewer_count(), "viewer connected");

    // Forward events to the viewer.
    let mut send_task = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    let payload = match serde_json::to_string(&event) {
                        Ok(payload) => payload,
                        Err(err) => {
                            warn!(error = %err, "failed to serialize order event");
                            continue;
                        }
                    };
                    if sender.send(Message::Text(payload)).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    // Slow viewer: drop the backlog, keep the connection.
                    warn!(skipped, "viewer lagged behind the event queue");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    // Drain viewer messages. The channel is push-only, so nothing is acted
    // on; reading keeps the connection's close handshake working.
    let mut receive_task = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            match message {
                Message::Close(_) => break,
                Message::Text(text) => debug!(%text, "ignoring viewer message"),
                _ => {}
            }
        }
    });

    // Whichever side finishes first tears the other down, so a departed
    // viewer's broadcast subscription is released immediately instead of
    // lingering until the next publish fails.
    tokio::select! {
        _ = &mut send_task => receive_task.abort(),
        _ = &mut receive_task => send_task.abort(),
    }

    info!("viewer disconnected");
}
