//! Routing of inbound events by kind.
//!
//! The set of routable kinds is a closed enum, so an unhandled kind is a
//! compile error here rather than a silently dropped delivery. Wire payloads
//! with a kind outside the enum are rejected with `UnsupportedEventKind`.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use storefront_core::{DomainError, DomainResult};
use storefront_events::{EventBus, Subscription};
use storefront_identity::IdentityEvent;
use storefront_orders::OrderPlaced;

use crate::batch::OrderSink;
use crate::store::UserStore;
use crate::sync::UserSync;

/// Every event kind the pipeline consumes.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    Identity(IdentityEvent),
    OrderPlaced(OrderPlaced),
}

impl InboundEvent {
    /// Stable wire kind tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Identity(e) => e.kind(),
            Self::OrderPlaced(_) => "order/created",
        }
    }

    /// Decode a wire envelope: JSON with a `kind` tag and the payload fields
    /// alongside it.
    pub fn decode(value: &serde_json::Value) -> DomainResult<Self> {
        let kind = value
            .get("kind")
            .and_then(|v| v.as_str())
            .ok_or_else(|| DomainError::unsupported_kind("<missing kind>"))?;

        match kind {
            "created" | "updated" | "deleted" => {
                let event: IdentityEvent = serde_json::from_value(value.clone())
                    .map_err(|e| DomainError::invalid_id(format!("{kind} payload: {e}")))?;
                Ok(Self::Identity(event))
            }
            "order/created" => {
                let event: OrderPlaced = serde_json::from_value(value.clone())
                    .map_err(|e| DomainError::invalid_id(format!("{kind} payload: {e}")))?;
                Ok(Self::OrderPlaced(event))
            }
            other => Err(DomainError::unsupported_kind(other)),
        }
    }
}

/// Routes each inbound event to its handler. Stateless beyond the handlers
/// themselves; safe under at-least-once delivery because the user sync is
/// idempotent and the batcher is append-only.
#[derive(Debug, Clone)]
pub struct Dispatcher<S, K> {
    users: UserSync<S>,
    orders: K,
}

impl<S, K> Dispatcher<S, K>
where
    S: UserStore,
    K: OrderSink,
{
    pub fn new(users: UserSync<S>, orders: K) -> Self {
        Self { users, orders }
    }

    pub fn dispatch(&self, event: InboundEvent) -> DomainResult<()> {
        debug!(kind = event.kind(), "dispatching event");
        match event {
            InboundEvent::Identity(e) => self.users.apply(&e),
            InboundEvent::OrderPlaced(e) => self.orders.submit(e),
        }
    }
}

/// Handle to stop the dispatcher worker.
#[derive(Debug)]
pub struct DispatcherWorkerHandle {
    shutdown: mpsc::Sender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl DispatcherWorkerHandle {
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}

/// Background worker that consumes a bus subscription and dispatches each
/// delivery. Handler failures are logged, not fatal to the worker.
#[derive(Debug)]
pub struct DispatcherWorker;

impl DispatcherWorker {
    pub fn spawn<S, K, B>(dispatcher: Dispatcher<S, K>, bus: &B) -> DispatcherWorkerHandle
    where
        S: UserStore + 'static,
        K: OrderSink + 'static,
        B: EventBus<InboundEvent>,
    {
        let subscription = bus.subscribe();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let join = thread::Builder::new()
            .name("event-dispatcher".to_string())
            .spawn(move || dispatcher_loop(&dispatcher, &subscription, &shutdown_rx))
            .expect("failed to spawn dispatcher thread");

        DispatcherWorkerHandle {
            shutdown: shutdown_tx,
            join: Some(join),
        }
    }
}

fn dispatcher_loop<S, K>(
    dispatcher: &Dispatcher<S, K>,
    subscription: &Subscription<InboundEvent>,
    shutdown_rx: &mpsc::Receiver<()>,
) where
    S: UserStore,
    K: OrderSink,
{
    info!("event dispatcher started");
    let tick = Duration::from_millis(100);

    loop {
        if shutdown_rx.try_recv().is_ok() {
            break;
        }

        match subscription.recv_timeout(tick) {
            Ok(event) => {
                let kind = event.kind();
                if let Err(err) = dispatcher.dispatch(event) {
                    warn!(kind, error = %err, "event dispatch failed");
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    info!("event dispatcher stopped");
}
