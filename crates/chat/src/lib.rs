//! # Parlor Chat Crate
//!
//! Core business logic for the chat relay: room registration and
//! membership, durable chat history, and the message router that ties
//! inbound events, persistence, broadcast, and the AI bot together.
//!
//! ## Architecture
//!
//! - **Entities**: domain models (`ChatMessage`, `Room`)
//! - **Registry**: room existence, credentials, membership
//! - **History**: append-and-replay durable store
//! - **Connections**: per-connection delivery channels
//! - **Service**: the message router and bot choreography

pub mod connections;
pub mod entities;
pub mod history;
pub mod registry;
pub mod service;
pub mod types;

pub use connections::ConnectionTable;
pub use entities::{ChatMessage, MessageKind, Room, BOT_NAME};
pub use history::HistoryStore;
pub use registry::{RoomRegistry, PUBLIC_ROOM};
pub use service::ChatService;
pub use types::{
    ChatResult, ClientEvent, ConnectionId, HistoryError, RoomError, ServerEvent,
};
