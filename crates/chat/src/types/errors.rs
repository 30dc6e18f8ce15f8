//! Error types for the chat core.

use thiserror::Error;

/// Result type alias for room operations
pub type ChatResult<T> = Result<T, RoomError>;

/// Failures of room creation and join requests. Reported to the single
/// requesting connection as a `room_error` event, never broadcast and
/// never fatal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoomError {
    #[error("Room '{name}' already exists")]
    AlreadyExists { name: String },

    #[error("Room '{name}' does not exist")]
    NotFound { name: String },

    #[error("Wrong password for room '{name}'")]
    WrongPassword { name: String },
}

impl RoomError {
    pub fn already_exists(name: impl Into<String>) -> Self {
        Self::AlreadyExists { name: name.into() }
    }

    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    pub fn wrong_password(name: impl Into<String>) -> Self {
        Self::WrongPassword { name: name.into() }
    }
}

/// Failures while flushing the durable history file.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("history encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}
