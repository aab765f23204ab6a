use crate::types::{AppEvent, EventRecord, EventSource};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::broadcast;
use ulid::Ulid;

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventRecord>,
    seq: Arc<AtomicI64>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            seq: Arc::new(AtomicI64::new(0)),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.sender.subscribe()
    }

    pub fn publish(
        &self,
        event: EventRecord,
    ) -> Result<(), broadcast::error::SendError<EventRecord>> {
        self.sender.send(event).map(|_| ())
    }

    /// Stamps `body` with an id and sequence number and publishes it.
    ///
    /// Having no subscribers is not an error for an emitter.
    pub fn emit(&self, source: EventSource, body: AppEvent) -> EventRecord {
        let record = EventRecord {
            id: format!("evt_{}", Ulid::new()),
            seq: self.seq.fetch_add(1, Ordering::SeqCst) + 1,
            at: chrono::Utc::now(),
            source,
            body,
        };
        let _ = self.publish(record.clone());
        record
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
