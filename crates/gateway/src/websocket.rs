//! Chat WebSocket handler: one long-lived session per client.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

use parlor_bot::CompletionBackend;
use parlor_chat::{ClientEvent, ConnectionId};

use crate::state::GatewayState;

/// Upgrade handler for `GET /ws`.
pub async fn chat_websocket_handler<B: CompletionBackend>(
    ws: WebSocketUpgrade,
    State(state): State<GatewayState<B>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_chat_websocket(socket, state))
}

/// Drive one connection: register it with the chat core (which
/// auto-joins the public room), then pump frames both ways until
/// either side closes.
async fn handle_chat_websocket<B: CompletionBackend>(socket: WebSocket, state: GatewayState<B>) {
    let conn: ConnectionId = Uuid::new_v4();
    let (mut sender, mut receiver) = socket.split();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    state.chat.connect(conn, event_tx).await;
    debug!(%conn, "websocket session opened");

    // Outbound: drain the chat core's event channel into the socket.
    let send_task = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(text) => {
                    if sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(error) => warn!(%error, "failed to encode server event"),
            }
        }
    });

    // Inbound: decode client frames and dispatch them. Malformed
    // frames are dropped with a log, never surfaced to the client.
    let chat = state.chat.clone();
    let receive_task = tokio::spawn(async move {
        while let Some(message) = receiver.next().await {
            let Ok(message) = message else { break };
            match message {
                Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(event) => chat.clone().handle_event(conn, event).await,
                    Err(error) => {
                        warn!(%conn, %error, "discarding malformed client frame");
                    }
                },
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = send_task => {},
        _ = receive_task => {},
    }

    state.chat.disconnect(conn).await;
    debug!(%conn, "websocket session closed");
}
