//! Process lifecycle signaling
//!
//! Restart and shutdown requests fan out over a broadcast channel so the
//! gateway loop, the voice layer, and the host process can each react in
//! their own time.

use tokio::sync::broadcast;
use tracing::info;

/// Lifecycle transitions an action can request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Tear down sessions and bring the gateway back up
    Restart,
    /// Stop the process for good
    Shutdown,
}

/// Receiver half for lifecycle events
pub type LifecycleReceiver = broadcast::Receiver<LifecycleEvent>;

/// Broadcast hub for lifecycle requests
#[derive(Clone)]
pub struct Lifecycle {
    sender: broadcast::Sender<LifecycleEvent>,
}

impl Lifecycle {
    /// Create a hub; subscribers only see events sent after they join
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(16);
        Self { sender }
    }

    /// Subscribe to future lifecycle events
    pub fn subscribe(&self) -> LifecycleReceiver {
        self.sender.subscribe()
    }

    /// Announce an event to every subscriber
    ///
    /// Harmless when nobody is listening.
    pub fn request(&self, event: LifecycleEvent) {
        info!(event = ?event, "Lifecycle event requested");
        let _ = self.sender.send(event);
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_requests() {
        let lifecycle = Lifecycle::new();
        let mut first = lifecycle.subscribe();
        let mut second = lifecycle.subscribe();

        lifecycle.request(LifecycleEvent::Restart);

        assert_eq!(first.recv().await.unwrap(), LifecycleEvent::Restart);
        assert_eq!(second.recv().await.unwrap(), LifecycleEvent::Restart);
    }

    #[tokio::test]
    async fn test_request_without_subscribers() {
        let lifecycle = Lifecycle::new();
        lifecycle.request(LifecycleEvent::Shutdown);
    }
}
