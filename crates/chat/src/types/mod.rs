pub mod errors;
pub mod events;

pub use errors::{ChatResult, HistoryError, RoomError};
pub use events::{ClientEvent, ServerEvent};

/// Identifier of one client connection, assigned at accept time.
pub type ConnectionId = uuid::Uuid;
