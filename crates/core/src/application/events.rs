// Event Bus
//
// Typed in-process publish/subscribe for change events, decoupled from
// any rendering surface. Subscribers filter on ChangeEvent::kind().

use tokio::sync::broadcast;
use tracing::trace;

use super::constants::DEFAULT_EVENT_CHANNEL_CAPACITY;
use crate::domain::ChangeEvent;

pub type EventReceiver = broadcast::Receiver<ChangeEvent>;

/// Broadcast channel for reconciliation change events
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ChangeEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all change events from this point on
    pub fn subscribe(&self) -> EventReceiver {
        self.tx.subscribe()
    }

    /// Publish one event; having no subscribers is not an error
    pub fn publish(&self, event: ChangeEvent) {
        trace!(kind = ?event.kind(), job_id = %event.job_id(), "Publishing change event");
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CHANNEL_CAPACITY)
    }
}
