use serde::{Deserialize, Serialize};

/// Display name used for AI-generated replies.
pub const BOT_NAME: &str = "AI Bot";

/// A single chat message as it travels the wire and sits in the
/// durable store: `{"username": ..., "message": ..., "type": ...}`.
/// The owning room is carried alongside (event field or history key),
/// not inside the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub username: String,
    #[serde(rename = "message")]
    pub body: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
}

/// Message kind enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    User,
    Bot,
    File,
}

impl ChatMessage {
    /// Create a user-authored message.
    pub fn user(username: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            body: body.into(),
            kind: MessageKind::User,
        }
    }

    /// Create an AI bot reply.
    pub fn bot(body: impl Into<String>) -> Self {
        Self {
            username: BOT_NAME.to_string(),
            body: body.into(),
            kind: MessageKind::Bot,
        }
    }

    /// Create a file-reference message; `body` is the stored filename.
    pub fn file(username: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            body: filename.into(),
            kind: MessageKind::File,
        }
    }

    /// Check if this is an AI bot message
    pub fn is_bot(&self) -> bool {
        matches!(self.kind, MessageKind::Bot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        let message = ChatMessage::user("alice", "Hello, world!");

        assert_eq!(message.username, "alice");
        assert_eq!(message.body, "Hello, world!");
        assert_eq!(message.kind, MessageKind::User);
        assert!(!message.is_bot());
    }

    #[test]
    fn test_bot_message_uses_bot_name() {
        let message = ChatMessage::bot("certainly");

        assert_eq!(message.username, BOT_NAME);
        assert!(message.is_bot());
    }

    #[test]
    fn test_durable_record_shape() {
        let message = ChatMessage::file("alice", "notes.pdf");
        let encoded = serde_json::to_value(&message).expect("message serializes");

        assert_eq!(
            encoded,
            serde_json::json!({
                "username": "alice",
                "message": "notes.pdf",
                "type": "file",
            })
        );

        let decoded: ChatMessage =
            serde_json::from_value(encoded).expect("message deserializes");
        assert_eq!(decoded, message);
    }
}
