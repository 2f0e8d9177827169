//! Dead-letter queue for order batches that exhausted their retries.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_orders::OrderPlaced;

/// A batch that could not be persisted, parked for reprocessing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadLetterEntry {
    pub events: Vec<OrderPlaced>,
    pub dead_lettered_at: DateTime<Utc>,
    pub reason: String,
    /// Total attempts made before giving up.
    pub attempts: u32,
}

impl DeadLetterEntry {
    pub fn new(events: Vec<OrderPlaced>, reason: impl Into<String>, attempts: u32) -> Self {
        Self {
            events,
            dead_lettered_at: Utc::now(),
            reason: reason.into(),
            attempts,
        }
    }
}

/// Sink for failed batches. Never drops: a batch that cannot be persisted
/// must land here or stay in flight.
pub trait DeadLetterQueue: Send + Sync {
    fn push(&self, entry: DeadLetterEntry);

    fn list(&self) -> Vec<DeadLetterEntry>;

    /// Drain every entry, e.g. for a reprocessing pass.
    fn take_all(&self) -> Vec<DeadLetterEntry>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<Q> DeadLetterQueue for Arc<Q>
where
    Q: DeadLetterQueue + ?Sized,
{
    fn push(&self, entry: DeadLetterEntry) {
        (**self).push(entry)
    }

    fn list(&self) -> Vec<DeadLetterEntry> {
        (**self).list()
    }

    fn take_all(&self) -> Vec<DeadLetterEntry> {
        (**self).take_all()
    }

    fn len(&self) -> usize {
        (**self).len()
    }
}

/// In-memory dead-letter queue.
#[derive(Debug, Default)]
pub struct InMemoryDeadLetterQueue {
    entries: Mutex<Vec<DeadLetterEntry>>,
}

impl InMemoryDeadLetterQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DeadLetterQueue for InMemoryDeadLetterQueue {
    fn push(&self, entry: DeadLetterEntry) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry);
        }
    }

    fn list(&self) -> Vec<DeadLetterEntry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    fn take_all(&self) -> Vec<DeadLetterEntry> {
        self.entries
            .lock()
            .map(|mut e| std::mem::take(&mut *e))
            .unwrap_or_default()
    }

    fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }
}
