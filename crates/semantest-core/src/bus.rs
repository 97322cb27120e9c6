//! Broadcast bus for distributing `RequestOutcome` to multiple subscribers.
//!
//! Built on `tokio::sync::broadcast`. The transport bridge subscribes to
//! ship outcomes back over the wire; dashboards and tests subscribe
//! independently. Publishing with no active subscribers is a no-op.

use semantest_types::outcome::RequestOutcome;
use tokio::sync::broadcast;

/// Multi-consumer bus for resolved request outcomes.
///
/// Wraps a `tokio::sync::broadcast` channel. Cloning the bus clones the
/// sender, allowing multiple producers and consumers.
pub struct OutcomeBus {
    sender: broadcast::Sender<RequestOutcome>,
}

impl OutcomeBus {
    /// Create a new bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Create a new subscriber that will receive all future outcomes.
    pub fn subscribe(&self) -> broadcast::Receiver<RequestOutcome> {
        self.sender.subscribe()
    }

    /// Publish an outcome to all current subscribers.
    ///
    /// If there are no subscribers, the outcome is silently dropped.
    pub fn publish(&self, outcome: RequestOutcome) {
        let _ = self.sender.send(outcome);
    }
}

impl Clone for OutcomeBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl std::fmt::Debug for OutcomeBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutcomeBus")
            .field("receiver_count", &self.sender.receiver_count())
            .finish()
    }
}
