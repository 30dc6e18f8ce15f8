//! Shared application state for the gateway

use std::path::PathBuf;
use std::sync::Arc;

use parlor_chat::ChatService;

/// Shared state handed to every handler: the chat core and the
/// directory uploads are stored in.
pub struct GatewayState<B> {
    pub chat: Arc<ChatService<B>>,
    pub upload_dir: PathBuf,
}

impl<B> GatewayState<B> {
    pub fn new(chat: Arc<ChatService<B>>, upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            chat,
            upload_dir: upload_dir.into(),
        }
    }
}

// Manual impl: `B` itself does not need to be `Clone` behind the `Arc`.
impl<B> Clone for GatewayState<B> {
    fn clone(&self) -> Self {
        Self {
            chat: Arc::clone(&self.chat),
            upload_dir: self.upload_dir.clone(),
        }
    }
}
