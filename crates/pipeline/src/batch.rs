//! Size/time windowing of order-creation events.
//!
//! High-volume order events are buffered into a window that flushes when it
//! reaches `max_size` events (immediately, without waiting for the timer) or
//! when `max_wait` has elapsed since the first event of the window (without
//! requiring the count). Each flushed batch is persisted as a unit through
//! `OrderStore::insert_batch`; a batch that keeps failing is moved whole to
//! the dead-letter queue, never silently dropped.
//!
//! One batcher worker instance owns the window. The batch boundary is a
//! persistence concern only; nothing downstream observes it.

use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{error, info};

use storefront_core::{DomainError, DomainResult};
use storefront_orders::{Order, OrderPlaced};

use crate::dead_letter::{DeadLetterEntry, DeadLetterQueue};
use crate::retry::{RetryPolicy, retry_blocking};
use crate::store::OrderStore;

/// Window parameters.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Flush as soon as this many events are buffered.
    pub max_size: usize,
    /// Flush a partial window this long after its first event.
    pub max_wait: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_size: 5,
            max_wait: Duration::from_secs(5),
        }
    }
}

/// Deterministic windowing core. Time is injected so the policy is testable
/// without a running worker.
#[derive(Debug)]
pub struct BatchWindow {
    config: BatchConfig,
    buf: Vec<OrderPlaced>,
    opened_at: Option<Instant>,
}

impl BatchWindow {
    pub fn new(config: BatchConfig) -> Self {
        Self {
            config,
            buf: Vec::new(),
            opened_at: None,
        }
    }

    /// Buffer an event. Returns the full batch when the size trigger fires.
    pub fn push(&mut self, event: OrderPlaced, now: Instant) -> Option<Vec<OrderPlaced>> {
        if self.buf.is_empty() {
            self.opened_at = Some(now);
        }
        self.buf.push(event);
        if self.buf.len() >= self.config.max_size {
            self.take()
        } else {
            None
        }
    }

    /// When the currently open window times out, if one is open.
    pub fn deadline(&self) -> Option<Instant> {
        self.opened_at.map(|t| t + self.config.max_wait)
    }

    /// Drain a timed-out partial window.
    pub fn take_expired(&mut self, now: Instant) -> Option<Vec<OrderPlaced>> {
        match self.deadline() {
            Some(deadline) if now >= deadline => self.take(),
            _ => None,
        }
    }

    /// Drain whatever is buffered, e.g. on shutdown.
    pub fn take(&mut self) -> Option<Vec<OrderPlaced>> {
        if self.buf.is_empty() {
            return None;
        }
        self.opened_at = None;
        Some(std::mem::take(&mut self.buf))
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

/// Where order-creation events go after checkout emits them.
pub trait OrderSink: Send + Sync {
    fn submit(&self, event: OrderPlaced) -> DomainResult<()>;
}

impl<K> OrderSink for Arc<K>
where
    K: OrderSink + ?Sized,
{
    fn submit(&self, event: OrderPlaced) -> DomainResult<()> {
        (**self).submit(event)
    }
}

/// Batcher runtime statistics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatcherStats {
    pub events_submitted: u64,
    pub batches_flushed: u64,
    pub events_flushed: u64,
    pub events_dead_lettered: u64,
    /// Submitted but neither flushed nor dead-lettered yet.
    pub pending: u64,
}

/// Submission handle. Cloneable; all clones feed the one worker-owned window.
#[derive(Debug, Clone)]
pub struct OrderBatcherHandle {
    tx: mpsc::Sender<OrderPlaced>,
    stats: Arc<Mutex<BatcherStats>>,
}

impl OrderBatcherHandle {
    pub fn stats(&self) -> BatcherStats {
        let mut stats = match self.stats.lock() {
            Ok(s) => s.clone(),
            Err(_) => return BatcherStats::default(),
        };
        stats.pending = stats
            .events_submitted
            .saturating_sub(stats.events_flushed + stats.events_dead_lettered);
        stats
    }
}

impl OrderSink for OrderBatcherHandle {
    fn submit(&self, event: OrderPlaced) -> DomainResult<()> {
        self.tx
            .send(event)
            .map_err(|_| DomainError::persistence("order batcher is not running"))?;
        if let Ok(mut stats) = self.stats.lock() {
            stats.events_submitted += 1;
        }
        Ok(())
    }
}

/// Handle to stop the batcher worker. Shutdown flushes any pending partial
/// window before joining.
#[derive(Debug)]
pub struct OrderBatcherWorkerHandle {
    shutdown: mpsc::Sender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl OrderBatcherWorkerHandle {
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}

/// Background worker that windows order events and bulk-persists them.
#[derive(Debug)]
pub struct OrderBatcher;

impl OrderBatcher {
    pub fn spawn<S, Q>(
        store: S,
        dead_letters: Q,
        config: BatchConfig,
        retry: RetryPolicy,
    ) -> (OrderBatcherHandle, OrderBatcherWorkerHandle)
    where
        S: OrderStore + 'static,
        Q: DeadLetterQueue + 'static,
    {
        let (tx, rx) = mpsc::channel::<OrderPlaced>();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let stats: Arc<Mutex<BatcherStats>> = Arc::default();
        let worker_stats = stats.clone();

        let join = thread::Builder::new()
            .name("order-batcher".to_string())
            .spawn(move || {
                batcher_loop(&store, &dead_letters, config, &retry, &rx, &shutdown_rx, &worker_stats);
            })
            .expect("failed to spawn order batcher thread");

        (
            OrderBatcherHandle { tx, stats },
            OrderBatcherWorkerHandle {
                shutdown: shutdown_tx,
                join: Some(join),
            },
        )
    }
}

fn batcher_loop<S: OrderStore, Q: DeadLetterQueue>(
    store: &S,
    dead_letters: &Q,
    config: BatchConfig,
    retry: &RetryPolicy,
    rx: &mpsc::Receiver<OrderPlaced>,
    shutdown_rx: &mpsc::Receiver<()>,
    stats: &Mutex<BatcherStats>,
) {
    info!(
        max_size = config.max_size,
        max_wait_ms = config.max_wait.as_millis() as u64,
        "order batcher started"
    );
    let tick = Duration::from_millis(100);
    let mut window = BatchWindow::new(config);

    loop {
        if shutdown_rx.try_recv().is_ok() {
            // Drain the channel, then flush whatever is left.
            while let Ok(event) = rx.try_recv() {
                if let Some(batch) = window.push(event, Instant::now()) {
                    flush(store, dead_letters, retry, stats, batch);
                }
            }
            break;
        }

        let wait = match window.deadline() {
            Some(deadline) => deadline.saturating_duration_since(Instant::now()).min(tick),
            None => tick,
        };

        match rx.recv_timeout(wait) {
            Ok(event) => {
                if let Some(batch) = window.push(event, Instant::now()) {
                    flush(store, dead_letters, retry, stats, batch);
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                if let Some(batch) = window.take_expired(Instant::now()) {
                    flush(store, dead_letters, retry, stats, batch);
                }
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    if let Some(batch) = window.take() {
        flush(store, dead_letters, retry, stats, batch);
    }
    info!("order batcher stopped");
}

/// Persist one batch as a unit. Orders are materialized once so retries
/// re-submit the same records rather than minting fresh ids.
fn flush<S: OrderStore, Q: DeadLetterQueue>(
    store: &S,
    dead_letters: &Q,
    retry: &RetryPolicy,
    stats: &Mutex<BatcherStats>,
    events: Vec<OrderPlaced>,
) {
    let count = events.len();
    let orders: Vec<Order> = events.iter().cloned().map(Order::from_event).collect();

    match retry_blocking(retry, "order_batch_insert", || store.insert_batch(orders.clone())) {
        Ok(inserted) => {
            info!(batch = count, inserted, "order batch flushed");
            if let Ok(mut s) = stats.lock() {
                s.batches_flushed += 1;
                s.events_flushed += count as u64;
            }
        }
        Err(err) => {
            error!(batch = count, error = %err, "order batch exhausted retries; dead-lettering");
            dead_letters.push(DeadLetterEntry::new(
                events,
                err.to_string(),
                retry.max_attempts + 1,
            ));
            if let Ok(mut s) = stats.lock() {
                s.events_dead_lettered += count as u64;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use storefront_core::{AddressId, ProductId, UserId};
    use storefront_orders::OrderItem;

    use crate::dead_letter::InMemoryDeadLetterQueue;
    use crate::store::{InMemoryOrderStore, StoreError};

    fn event(n: u64) -> OrderPlaced {
        OrderPlaced {
            user_id: UserId::new("u1").unwrap(),
            address_id: AddressId::new(),
            items: vec![OrderItem {
                product: ProductId::new("p1").unwrap(),
                quantity: 1,
            }],
            amount: n,
            placed_at: Utc::now(),
        }
    }

    fn wait_until(deadline_ms: u64, mut done: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_millis(deadline_ms);
        while Instant::now() < deadline {
            if done() {
                return true;
            }
            thread::sleep(Duration::from_millis(10));
        }
        done()
    }

    #[test]
    fn window_flushes_on_size_without_waiting_for_the_timer() {
        let mut window = BatchWindow::new(BatchConfig::default());
        let now = Instant::now();

        for n in 0..4 {
            assert!(window.push(event(n), now).is_none());
        }
        let batch = window.push(event(4), now).unwrap();
        assert_eq!(batch.len(), 5);
        assert!(window.is_empty());
        assert!(window.deadline().is_none());
    }

    #[test]
    fn window_expires_a_partial_batch_after_max_wait() {
        let mut window = BatchWindow::new(BatchConfig::default());
        let opened = Instant::now();

        window.push(event(0), opened);
        window.push(event(1), opened + Duration::from_secs(1));

        // The deadline is anchored to the first event, not the latest.
        assert!(window.take_expired(opened + Duration::from_secs(4)).is_none());
        let batch = window.take_expired(opened + Duration::from_secs(5)).unwrap();
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn sixth_event_opens_a_fresh_window() {
        let mut window = BatchWindow::new(BatchConfig::default());
        let now = Instant::now();

        for n in 0..5 {
            window.push(event(n), now);
        }
        let later = now + Duration::from_secs(3);
        assert!(window.push(event(5), later).is_none());
        assert_eq!(window.deadline(), Some(later + Duration::from_secs(5)));
    }

    #[test]
    fn worker_flushes_five_immediately_and_the_remainder_on_the_timer() {
        let store = Arc::new(InMemoryOrderStore::new());
        let dlq = Arc::new(InMemoryDeadLetterQueue::new());
        let config = BatchConfig {
            max_size: 5,
            max_wait: Duration::from_millis(300),
        };
        let (handle, worker) =
            OrderBatcher::spawn(store.clone(), dlq.clone(), config, RetryPolicy::no_retry());

        for n in 0..6 {
            handle.submit(event(n)).unwrap();
        }

        // Full window of 5 flushes on size.
        assert!(wait_until(2000, || store.len() == 5));
        // The sixth flushes once its own window times out.
        assert!(wait_until(2000, || store.len() == 6));
        worker.shutdown();

        assert!(dlq.is_empty());
        let stats = handle.stats();
        assert_eq!(stats.events_submitted, 6);
        assert_eq!(stats.batches_flushed, 2);
        assert_eq!(stats.events_flushed, 6);
        assert_eq!(stats.pending, 0);
    }

    struct RejectingOrderStore;

    impl OrderStore for RejectingOrderStore {
        fn insert_batch(&self, _orders: Vec<Order>) -> Result<usize, StoreError> {
            Err(StoreError::Storage("write rejected".to_string()))
        }

        fn for_user(&self, _user: &UserId) -> Result<Vec<Order>, StoreError> {
            Ok(vec![])
        }
    }

    #[test]
    fn exhausted_batch_is_dead_lettered_whole() {
        let dlq = Arc::new(InMemoryDeadLetterQueue::new());
        let config = BatchConfig {
            max_size: 3,
            max_wait: Duration::from_millis(100),
        };
        let (handle, worker) = OrderBatcher::spawn(
            RejectingOrderStore,
            dlq.clone(),
            config,
            RetryPolicy::fixed(1, Duration::from_millis(1)),
        );

        for n in 0..3 {
            handle.submit(event(n)).unwrap();
        }

        assert!(wait_until(2000, || dlq.len() == 1));
        worker.shutdown();

        let entries = dlq.list();
        assert_eq!(entries[0].events.len(), 3);
        assert_eq!(entries[0].attempts, 2);
        assert_eq!(handle.stats().events_dead_lettered, 3);
    }

    #[test]
    fn shutdown_flushes_a_pending_partial_window() {
        let store = Arc::new(InMemoryOrderStore::new());
        let dlq = Arc::new(InMemoryDeadLetterQueue::new());
        let (handle, worker) = OrderBatcher::spawn(
            store.clone(),
            dlq,
            BatchConfig::default(),
            RetryPolicy::no_retry(),
        );

        handle.submit(event(0)).unwrap();
        handle.submit(event(1)).unwrap();
        worker.shutdown();

        assert_eq!(store.len(), 2);
    }
}
