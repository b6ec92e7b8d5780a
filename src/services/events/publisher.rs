use tokio::sync::broadcast;

use super::types::MonitorEvent;

pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Fan-out sink for monitor events.
///
/// Delivery is best-effort; implementations must never fail the caller.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: MonitorEvent);
}

/// In-process publisher backed by a broadcast channel
#[derive(Debug, Clone)]
pub struct BroadcastPublisher {
    sender: broadcast::Sender<MonitorEvent>,
}

impl BroadcastPublisher {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastPublisher {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl EventPublisher for BroadcastPublisher {
    fn publish(&self, event: MonitorEvent) {
        let topic = event.topic();
        // Err only means nobody is listening
        if self.sender.send(event).is_err() {
            tracing::trace!(topic, "no event subscribers");
        }
    }
}
