//! Delivery channels for active connections.

use std::collections::HashMap;

use tokio::sync::{mpsc, RwLock};
use tracing::trace;

use crate::types::{ConnectionId, ServerEvent};

/// Map of active connections to their outbound event channels. The
/// session layer registers a sender at accept time and drains the
/// paired receiver into the socket.
#[derive(Debug, Default)]
pub struct ConnectionTable {
    inner: RwLock<HashMap<ConnectionId, mpsc::UnboundedSender<ServerEvent>>>,
}

impl ConnectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, conn: ConnectionId, sender: mpsc::UnboundedSender<ServerEvent>) {
        self.inner.write().await.insert(conn, sender);
    }

    pub async fn remove(&self, conn: ConnectionId) {
        self.inner.write().await.remove(&conn);
    }

    /// Deliver an event to a single connection. A closed channel means
    /// the connection is tearing down; the event is dropped.
    pub async fn send_to(&self, conn: ConnectionId, event: ServerEvent) {
        if let Some(sender) = self.inner.read().await.get(&conn) {
            let _ = sender.send(event);
        }
    }

    /// Deliver an event to every listed connection.
    pub async fn broadcast(&self, targets: &[ConnectionId], event: &ServerEvent) {
        let table = self.inner.read().await;
        for conn in targets {
            if let Some(sender) = table.get(conn) {
                let _ = sender.send(event.clone());
            } else {
                trace!(%conn, "skipping departed connection");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_broadcast_reaches_only_targets() {
        let table = ConnectionTable::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        table.register(a, tx_a).await;
        table.register(b, tx_b).await;

        let event = ServerEvent::RoomCreated {
            room: "ops".to_string(),
        };
        table.broadcast(&[a], &event).await;

        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_send_to_removed_connection_is_a_noop() {
        let table = ConnectionTable::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let conn = Uuid::new_v4();

        table.register(conn, tx).await;
        table.remove(conn).await;
        table
            .send_to(
                conn,
                ServerEvent::RoomError {
                    message: "gone".to_string(),
                },
            )
            .await;

        assert!(rx.try_recv().is_err());
    }
}
