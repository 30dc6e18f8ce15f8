//! Wire events exchanged with connected clients.

use serde::{Deserialize, Serialize};

use crate::entities::ChatMessage;

/// Client events received over the WebSocket.
///
/// Frames that do not decode into one of these variants are dropped
/// with a diagnostic log; no error is surfaced to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Send a chat message. Missing fields fall back to defaults
    /// (`"Unknown"` / empty body / the public room).
    Message {
        #[serde(default)]
        username: Option<String>,
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        room: Option<String>,
    },
    /// Create a password-gated room and join it.
    CreateRoom {
        name: String,
        #[serde(default)]
        password: String,
    },
    /// Join an existing room.
    JoinRoom {
        name: String,
        #[serde(default)]
        password: String,
    },
}

/// Server events sent to WebSocket clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// New message, broadcast to the owning room's members.
    Message { room: String, message: ChatMessage },
    /// The bot is composing a reply. Ephemeral, never persisted.
    Typing { room: String, username: String },
    /// Room creation succeeded; directed to the requesting connection.
    RoomCreated { room: String },
    /// Join succeeded; directed to the requesting connection.
    RoomJoined { room: String },
    /// A room request failed; directed to the requesting connection.
    RoomError { message: String },
    /// Replay of a room's persisted history; directed.
    History {
        room: String,
        messages: Vec<ChatMessage>,
    },
}
