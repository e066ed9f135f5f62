//! Live salon channel. One socket per client; frames are JSON with the
//! same `{"event", "data"}` envelope in both directions.
//!
//! Client frames: `join_room` carrying a nickname, `send_message` carrying
//! `{author, text}`. Server frames are the [`SalonEvent`] variants. Bus
//! fan-out starts at `join_room`; a socket that never joins receives
//! nothing. Channel failures are logged and swallowed, never reported back
//! to the sender.

use std::sync::Arc;

use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use hs_core::{SalonBus, MAIN_SALON};
use serde::Deserialize;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::chat;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
enum ClientFrame {
    JoinRoom(String),
    SendMessage { author: String, text: String },
}

pub async fn upgrade(State(state): State<Arc<AppState>>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle(socket, state))
}

async fn handle(socket: WebSocket, state: Arc<AppState>) {
    let conn_id = Uuid::new_v4();
    info!(%conn_id, "spirit connected");

    let (sink, mut stream) = socket.split();
    let mut sink = Some(sink);
    let mut forward: Option<JoinHandle<()>> = None;

    while let Some(frame) = stream.next().await {
        let text = match frame {
            Ok(WsMessage::Text(text)) => text,
            Ok(WsMessage::Close(_)) => break,
            // Pings are answered by the protocol layer; binary is not
            // part of the salon contract.
            Ok(_) => continue,
            Err(err) => {
                debug!(%conn_id, error = %err, "socket read failed");
                break;
            }
        };

        match serde_json::from_str::<ClientFrame>(&text) {
            Ok(ClientFrame::JoinRoom(nickname)) => {
                info!(%conn_id, %nickname, room = MAIN_SALON, "joined the salon");
                if forward.is_none() {
                    if let Some(sink) = sink.take() {
                        forward = Some(spawn_forwarder(state.bus.clone(), sink, conn_id));
                    }
                }
            }
            Ok(ClientFrame::SendMessage { author, text }) => {
                if let Err(err) = chat::deliver(&state, author, text).await {
                    error!(%conn_id, error = ?err, "message delivery failed");
                }
            }
            Err(err) => {
                debug!(%conn_id, error = %err, "ignoring malformed frame");
            }
        }
    }

    if let Some(task) = forward {
        task.abort();
    }
    info!(%conn_id, "spirit faded");
}

/// Pushes every bus event onto the socket until either side goes away. A
/// lagged receiver skips what it missed; the client is expected to
/// re-fetch over REST rather than rely on a backlog.
fn spawn_forwarder(
    bus: SalonBus,
    mut sink: SplitSink<WebSocket, WsMessage>,
    conn_id: Uuid,
) -> JoinHandle<()> {
    use tokio::sync::broadcast::error::RecvError;

    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            let event = match rx.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(%conn_id, skipped, "subscriber lagged; events dropped");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };

            let payload = match serde_json::to_string(&event) {
                Ok(payload) => payload,
                Err(err) => {
                    error!(%conn_id, error = %err, "event serialization failed");
                    continue;
                }
            };

            if sink.send(WsMessage::Text(payload.into())).await.is_err() {
                break;
            }
        }
    })
}
