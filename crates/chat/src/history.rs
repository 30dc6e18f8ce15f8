//! Durable chat history: a JSON snapshot of room name to message list,
//! loaded once at startup and rewritten in full on every append.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::entities::ChatMessage;
use crate::registry::PUBLIC_ROOM;
use crate::types::HistoryError;

/// In-memory chat history backed by a JSON file. The caller is
/// responsible for serializing access; the store itself holds no lock.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    rooms: HashMap<String, Vec<ChatMessage>>,
}

impl HistoryStore {
    /// Read the durable state from `path`. A missing or malformed file
    /// yields a fresh structure containing only an empty public room;
    /// corruption is logged, never propagated.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let mut rooms = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => match serde_json::from_str::<HashMap<String, Vec<ChatMessage>>>(&raw) {
                Ok(rooms) => rooms,
                Err(error) => {
                    warn!(path = %path.display(), %error, "chat history is malformed, resetting");
                    HashMap::new()
                }
            },
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no chat history file yet");
                HashMap::new()
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "failed to read chat history, resetting");
                HashMap::new()
            }
        };

        rooms.entry(PUBLIC_ROOM.to_string()).or_default();
        Self { path, rooms }
    }

    /// Make sure a history bucket exists for `room`.
    pub fn ensure_room(&mut self, room: &str) {
        if !self.rooms.contains_key(room) {
            self.rooms.insert(room.to_string(), Vec::new());
        }
    }

    /// Append a message and flush the whole structure to disk. The
    /// flush completes before this returns, so callers get
    /// persisted-before-visible ordering for free.
    pub async fn append(&mut self, room: &str, message: ChatMessage) -> Result<(), HistoryError> {
        self.rooms
            .entry(room.to_string())
            .or_default()
            .push(message);
        self.flush().await
    }

    /// Snapshot of a room's messages in append order; empty for
    /// unknown rooms.
    pub fn history_for(&self, room: &str) -> Vec<ChatMessage> {
        self.rooms.get(room).cloned().unwrap_or_default()
    }

    /// All rooms with their message counts, for maintenance tooling.
    pub fn room_summaries(&self) -> Vec<(String, usize)> {
        let mut summaries: Vec<_> = self
            .rooms
            .iter()
            .map(|(name, messages)| (name.clone(), messages.len()))
            .collect();
        summaries.sort();
        summaries
    }

    async fn flush(&self) -> Result<(), HistoryError> {
        let encoded = serde_json::to_string_pretty(&self.rooms)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        tokio::fs::write(&self.path, encoded).await?;
        Ok(())
    }
}
