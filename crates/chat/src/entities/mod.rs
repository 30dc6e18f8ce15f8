pub mod message;
pub mod room;

pub use message::{ChatMessage, MessageKind, BOT_NAME};
pub use room::Room;
