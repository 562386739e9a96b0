//! Broadcast hub for realtime events

use tokio::sync::broadcast;

use super::events::ServerEvent;

/// Fan-out capacity before slow subscribers start lag-skipping.
const BROADCAST_CAPACITY: usize = 256;

/// Manages fan-out of server events to all connected clients.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    broadcast_tx: broadcast::Sender<ServerEvent>,
}

impl Dispatcher {
    pub fn new() -> Self {
        let (broadcast_tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self { broadcast_tx }
    }

    /// Subscribe to server events. Returns a broadcast receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.broadcast_tx.subscribe()
    }

    /// Broadcast an event to all connected clients. Sending with no
    /// subscribers is not an error; there is simply nobody listening.
    pub fn broadcast(&self, event: ServerEvent) {
        let _ = self.broadcast_tx.send(event);
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn broadcasts_reach_every_subscriber() {
        let dispatcher = Dispatcher::new();
        let mut first = dispatcher.subscribe();
        let mut second = dispatcher.subscribe();

        dispatcher.broadcast(ServerEvent::StatusUpdate {
            username: "alice".to_string(),
            is_online: false,
        });

        let expected = ServerEvent::StatusUpdate {
            username: "alice".to_string(),
            is_online: false,
        };
        assert_eq!(first.recv().await.expect("recv"), expected);
        assert_eq!(second.recv().await.expect("recv"), expected);
    }

    #[tokio::test]
    async fn broadcasting_without_subscribers_is_fine() {
        let dispatcher = Dispatcher::new();
        dispatcher.broadcast(ServerEvent::ServerReady {
            message: "connected".to_string(),
        });
    }
}
