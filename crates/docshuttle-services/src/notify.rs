use dashmap::DashMap;
use docshuttle_core::models::LifecycleEvent;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Fan-out registry for lifecycle events.
///
/// Every WebSocket connection registers an unbounded sender; broadcasts are
/// best-effort and a closed receiver gets its entry dropped on the spot, so
/// one client's disconnect never affects the others. No persistence, no
/// replay: a client only sees events raised while it is connected.
#[derive(Clone, Default)]
pub struct NotificationHub {
    connections: Arc<DashMap<Uuid, mpsc::UnboundedSender<LifecycleEvent>>>,
}

impl fmt::Debug for NotificationHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationHub")
            .field("connection_count", &self.connections.len())
            .finish()
    }
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new connection. The returned receiver yields every event
    /// broadcast while the connection stays registered.
    pub fn subscribe(&self) -> (Uuid, mpsc::UnboundedReceiver<LifecycleEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn_id = Uuid::new_v4();
        self.connections.insert(conn_id, tx);

        tracing::debug!(conn_id = %conn_id, total = self.connections.len(), "Client subscribed");

        (conn_id, rx)
    }

    /// Remove a connection. Safe to call twice.
    pub fn unsubscribe(&self, conn_id: Uuid) {
        if self.connections.remove(&conn_id).is_some() {
            tracing::debug!(conn_id = %conn_id, total = self.connections.len(), "Client unsubscribed");
        }
    }

    /// Send an event to every registered connection. Senders whose receiver
    /// is gone are pruned during the pass.
    pub fn broadcast(&self, event: LifecycleEvent) {
        let mut dead = Vec::new();

        for entry in self.connections.iter() {
            if entry.value().send(event).is_err() {
                dead.push(*entry.key());
            }
        }

        for conn_id in dead {
            self.connections.remove(&conn_id);
            tracing::debug!(conn_id = %conn_id, "Pruned closed connection during broadcast");
        }
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_broadcast_reaches_all_subscribers() {
        let hub = NotificationHub::new();
        let (_id_a, mut rx_a) = hub.subscribe();
        let (_id_b, mut rx_b) = hub.subscribe();

        hub.broadcast(LifecycleEvent::FileAdded);

        assert_eq!(rx_a.recv().await, Some(LifecycleEvent::FileAdded));
        assert_eq!(rx_b.recv().await, Some(LifecycleEvent::FileAdded));
    }

    #[tokio::test]
    async fn test_dropped_receiver_is_pruned() {
        let hub = NotificationHub::new();
        let (_id_a, rx_a) = hub.subscribe();
        let (_id_b, mut rx_b) = hub.subscribe();
        drop(rx_a);

        hub.broadcast(LifecycleEvent::FileDeleted);

        assert_eq!(hub.connection_count(), 1);
        assert_eq!(rx_b.recv().await, Some(LifecycleEvent::FileDeleted));
    }

    #[tokio::test]
    async fn test_unsubscribe_is_idempotent() {
        let hub = NotificationHub::new();
        let (id, _rx) = hub.subscribe();

        hub.unsubscribe(id);
        hub.unsubscribe(id);

        assert_eq!(hub.connection_count(), 0);
    }
}
