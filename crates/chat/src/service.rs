//! Message router: validates inbound events, orders history writes
//! before broadcast, and drives the AI bot exchange.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex, RwLock};
use tracing::{debug, error, info, warn};

use parlor_bot::CompletionBackend;

use crate::connections::ConnectionTable;
use crate::entities::{ChatMessage, BOT_NAME};
use crate::history::HistoryStore;
use crate::registry::{RoomRegistry, PUBLIC_ROOM};
use crate::types::{ClientEvent, ConnectionId, ServerEvent};

/// Fallback display name for senders that did not supply one.
const DEFAULT_USERNAME: &str = "Unknown";

/// Command prefix that routes a message to the bot, matched
/// case-insensitively after trimming.
const BOT_COMMAND_PREFIX: &str = "@bot";

/// Reply for a bot command with nothing after the prefix. No external
/// call is made and no typing indicator is emitted.
const EMPTY_QUERY_REPLY: &str = "Please type something after @bot.";

/// The room/session manager and message-routing engine. Generic over
/// the completion backend so tests can exercise the bot choreography
/// against a scripted implementation.
pub struct ChatService<B> {
    registry: RwLock<RoomRegistry>,
    // Append, flush, and broadcast happen under this guard; per-room
    // message order is total and nothing is visible before it is
    // durable.
    history: Mutex<HistoryStore>,
    connections: ConnectionTable,
    backend: B,
    reply_delay: Duration,
}

impl<B: CompletionBackend> ChatService<B> {
    pub fn new(history: HistoryStore, backend: B, reply_delay: Duration) -> Self {
        Self {
            registry: RwLock::new(RoomRegistry::new()),
            history: Mutex::new(history),
            connections: ConnectionTable::new(),
            backend,
            reply_delay,
        }
    }

    /// Register a new connection: it is auto-joined to the public room
    /// and receives that room's history replay.
    pub async fn connect(&self, conn: ConnectionId, sender: mpsc::UnboundedSender<ServerEvent>) {
        self.connections.register(conn, sender).await;
        self.registry.write().await.connect(conn);
        debug!(%conn, "connection joined the public room");
        self.send_history(conn, PUBLIC_ROOM).await;
    }

    pub async fn disconnect(&self, conn: ConnectionId) {
        self.registry.write().await.disconnect(conn);
        self.connections.remove(conn).await;
        debug!(%conn, "connection closed");
    }

    /// Dispatch one inbound client event.
    pub async fn handle_event(self: Arc<Self>, conn: ConnectionId, event: ClientEvent) {
        match event {
            ClientEvent::Message {
                username,
                message,
                room,
            } => self.handle_message(conn, username, message, room).await,
            ClientEvent::CreateRoom { name, password } => {
                self.create_room(conn, &name, &password).await
            }
            ClientEvent::JoinRoom { name, password } => {
                self.join_room(conn, &name, &password).await
            }
        }
    }

    /// Create a room and join the requesting connection to it. The
    /// outcome is reported to that connection only.
    pub async fn create_room(&self, conn: ConnectionId, name: &str, password: &str) {
        let result = self.registry.write().await.create(conn, name, password);
        match result {
            Ok(()) => {
                self.history.lock().await.ensure_room(name);
                info!(room = name, "room created");
                self.connections
                    .send_to(
                        conn,
                        ServerEvent::RoomCreated {
                            room: name.to_string(),
                        },
                    )
                    .await;
                self.send_history(conn, name).await;
            }
            Err(error) => {
                debug!(room = name, %error, "room creation rejected");
                self.connections
                    .send_to(
                        conn,
                        ServerEvent::RoomError {
                            message: error.to_string(),
                        },
                    )
                    .await;
            }
        }
    }

    /// Join an existing room, leaving any previously joined non-public
    /// room. The outcome is reported to the requesting connection only.
    pub async fn join_room(&self, conn: ConnectionId, name: &str, password: &str) {
        let result = self.registry.write().await.join(conn, name, password);
        match result {
            Ok(()) => {
                info!(room = name, %conn, "connection joined room");
                self.connections
                    .send_to(
                        conn,
                        ServerEvent::RoomJoined {
                            room: name.to_string(),
                        },
                    )
                    .await;
                self.send_history(conn, name).await;
            }
            Err(error) => {
                debug!(room = name, %error, "room join rejected");
                self.connections
                    .send_to(
                        conn,
                        ServerEvent::RoomError {
                            message: error.to_string(),
                        },
                    )
                    .await;
            }
        }
    }

    /// Route one chat message: apply field defaults, persist, broadcast
    /// to the room's members, then hand bot commands to the gateway.
    pub async fn handle_message(
        self: Arc<Self>,
        conn: ConnectionId,
        username: Option<String>,
        message: Option<String>,
        room: Option<String>,
    ) {
        let username = username
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_USERNAME.to_string());
        let message = message.unwrap_or_default();
        let room = room
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| PUBLIC_ROOM.to_string());

        debug!(%conn, room, username, "inbound chat message");
        self.persist_and_broadcast(&room, ChatMessage::user(username.as_str(), message.as_str()))
            .await;

        if let Some(query) = bot_query(&message) {
            if query.is_empty() {
                // Short-circuit: no external call, no typing indicator.
                self.persist_and_broadcast(&room, ChatMessage::bot(EMPTY_QUERY_REPLY))
                    .await;
            } else {
                let service = Arc::clone(&self);
                tokio::spawn(async move {
                    service.run_bot_exchange(room, query).await;
                });
            }
        }
    }

    /// Record a stored upload as a file-reference message, following
    /// the same persist-then-broadcast path as chat text.
    pub async fn record_file_message(
        &self,
        room: Option<String>,
        username: Option<String>,
        filename: &str,
    ) {
        let room = room
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| PUBLIC_ROOM.to_string());
        let username = username
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_USERNAME.to_string());

        info!(room, filename, "file reference recorded");
        self.persist_and_broadcast(&room, ChatMessage::file(username.as_str(), filename))
            .await;
    }

    /// Snapshot of a room's history, taken after the last completed
    /// append.
    pub async fn history_for(&self, room: &str) -> Vec<ChatMessage> {
        self.history.lock().await.history_for(room)
    }

    /// The bot exchange runs on its own task, off the path that
    /// serializes message delivery: a slow completion in one room must
    /// never delay traffic in another.
    async fn run_bot_exchange(&self, room: String, query: String) {
        self.broadcast_ephemeral(
            &room,
            ServerEvent::Typing {
                room: room.clone(),
                username: BOT_NAME.to_string(),
            },
        )
        .await;

        let reply = match self.backend.complete(&query).await {
            Ok(reply) => reply.into_text(),
            Err(error) => {
                warn!(room, %error, "bot completion failed");
                format!("Error: {error}")
            }
        };

        // UX pacing only: make the typing indicator perceptible.
        if !self.reply_delay.is_zero() {
            tokio::time::sleep(self.reply_delay).await;
        }

        self.persist_and_broadcast(&room, ChatMessage::bot(reply))
            .await;
    }

    async fn persist_and_broadcast(&self, room: &str, message: ChatMessage) {
        let mut history = self.history.lock().await;
        if let Err(error) = history.append(room, message.clone()).await {
            error!(room, %error, "failed to persist message, dropping broadcast");
            return;
        }

        // Still under the history guard: append and notify cannot
        // interleave across concurrent senders to the same room.
        let members = self.registry.read().await.members(room);
        self.connections
            .broadcast(
                &members,
                &ServerEvent::Message {
                    room: room.to_string(),
                    message,
                },
            )
            .await;
    }

    async fn broadcast_ephemeral(&self, room: &str, event: ServerEvent) {
        let members = self.registry.read().await.members(room);
        self.connections.broadcast(&members, &event).await;
    }

    async fn send_history(&self, conn: ConnectionId, room: &str) {
        let messages = self.history.lock().await.history_for(room);
        self.connections
            .send_to(
                conn,
                ServerEvent::History {
                    room: room.to_string(),
                    messages,
                },
            )
            .await;
    }
}

/// Extract the bot query from a message: the text after the `@bot`
/// prefix, trimmed. Returns `None` when the message is not a bot
/// command at all.
fn bot_query(message: &str) -> Option<String> {
    let trimmed = message.trim();
    let prefix = trimmed.get(..BOT_COMMAND_PREFIX.len())?;
    if !prefix.eq_ignore_ascii_case(BOT_COMMAND_PREFIX) {
        return None;
    }
    Some(trimmed[BOT_COMMAND_PREFIX.len()..].trim().to_string())
}
