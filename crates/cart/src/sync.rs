//! Fire-and-forget remote synchronization of cart snapshots.
//!
//! Local transitions are applied optimistically before the remote call
//! resolves. Remote failures are recorded and observable but never roll back
//! local state; the next successful sync re-sends the full current snapshot,
//! making sync idempotent and self-healing.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, mpsc};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use storefront_core::{DomainResult, ProductId, UserId};

use crate::snapshot::CartSnapshot;
use crate::state::Cart;

/// Remote cart store contract: full-state overwrite, never a delta.
pub trait CartSync: Send + Sync {
    fn push(&self, user: &UserId, snapshot: &CartSnapshot) -> DomainResult<()>;
}

impl<S> CartSync for Arc<S>
where
    S: CartSync + ?Sized,
{
    fn push(&self, user: &UserId, snapshot: &CartSnapshot) -> DomainResult<()> {
        (**self).push(user, snapshot)
    }
}

/// Handle used by carts to enqueue snapshots for background sync.
#[derive(Debug, Clone)]
pub struct CartSyncHandle {
    tx: mpsc::Sender<(UserId, CartSnapshot)>,
    last_errors: Arc<RwLock<HashMap<UserId, String>>>,
}

impl CartSyncHandle {
    /// Enqueue a full snapshot for sync. Fire-and-forget: a closed worker is
    /// not an error for the caller, the local cart stays correct.
    pub fn enqueue(&self, user: UserId, snapshot: CartSnapshot) {
        let _ = self.tx.send((user, snapshot));
    }

    /// The failure message of the most recent sync attempt for a user, if the
    /// last attempt failed. Cleared by the next successful sync.
    pub fn last_error(&self, user: &UserId) -> Option<String> {
        self.last_errors.read().ok()?.get(user).cloned()
    }
}

/// Handle to control and join the background sync worker.
#[derive(Debug)]
pub struct CartSyncWorkerHandle {
    shutdown: mpsc::Sender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl CartSyncWorkerHandle {
    /// Request graceful shutdown and wait for the worker to stop.
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}

/// Background worker that pushes cart snapshots to the remote store.
///
/// Pending submissions are coalesced to the latest snapshot per user before
/// pushing: every push carries full state, so intermediate snapshots are
/// redundant.
#[derive(Debug)]
pub struct CartSyncWorker;

impl CartSyncWorker {
    pub fn spawn<S>(sync: S) -> (CartSyncHandle, CartSyncWorkerHandle)
    where
        S: CartSync + 'static,
    {
        let (tx, rx) = mpsc::channel::<(UserId, CartSnapshot)>();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let last_errors: Arc<RwLock<HashMap<UserId, String>>> = Arc::default();
        let errors = last_errors.clone();

        let join = thread::Builder::new()
            .name("cart-sync".to_string())
            .spawn(move || sync_loop(&sync, &rx, &shutdown_rx, &errors))
            .expect("failed to spawn cart sync worker thread");

        (
            CartSyncHandle { tx, last_errors },
            CartSyncWorkerHandle {
                shutdown: shutdown_tx,
                join: Some(join),
            },
        )
    }
}

fn sync_loop<S: CartSync>(
    sync: &S,
    rx: &mpsc::Receiver<(UserId, CartSnapshot)>,
    shutdown_rx: &mpsc::Receiver<()>,
    last_errors: &RwLock<HashMap<UserId, String>>,
) {
    let tick = Duration::from_millis(250);

    loop {
        if shutdown_rx.try_recv().is_ok() {
            break;
        }

        let first = match rx.recv_timeout(tick) {
            Ok(msg) => msg,
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        };

        // Coalesce the backlog: only the latest snapshot per user matters.
        let mut pending: HashMap<UserId, CartSnapshot> = HashMap::new();
        pending.insert(first.0, first.1);
        while let Ok((user, snapshot)) = rx.try_recv() {
            pending.insert(user, snapshot);
        }

        for (user, snapshot) in pending {
            match sync.push(&user, &snapshot) {
                Ok(()) => {
                    debug!(user = %user, items = snapshot.len(), "cart synced");
                    if let Ok(mut map) = last_errors.write() {
                        map.remove(&user);
                    }
                }
                Err(err) => {
                    warn!(user = %user, error = %err, "cart sync failed; local state kept");
                    if let Ok(mut map) = last_errors.write() {
                        map.insert(user, err.to_string());
                    }
                }
            }
        }
    }
}

/// A user's cart that mirrors every mutating transition to the remote store.
///
/// The local state is updated first (optimistically); the sync is enqueued
/// fire-and-forget afterwards.
#[derive(Debug)]
pub struct SyncedCart {
    user: UserId,
    cart: Cart,
    sync: CartSyncHandle,
}

impl SyncedCart {
    pub fn new(user: UserId, cart: Cart, sync: CartSyncHandle) -> Self {
        Self { user, cart, sync }
    }

    pub fn add(&mut self, product: ProductId) {
        self.cart.add(product);
        self.enqueue_sync();
    }

    pub fn set_quantity(&mut self, product: ProductId, quantity: u32) {
        self.cart.set_quantity(product, quantity);
        self.enqueue_sync();
    }

    pub fn remove(&mut self, product: &ProductId) {
        self.cart.remove(product);
        self.enqueue_sync();
    }

    pub fn clear(&mut self) {
        self.cart.clear();
        self.enqueue_sync();
    }

    pub fn snapshot(&self) -> CartSnapshot {
        self.cart.snapshot()
    }

    pub fn count(&self) -> u64 {
        self.cart.count()
    }

    /// Failure message of the most recent sync attempt, if it failed.
    pub fn last_sync_error(&self) -> Option<String> {
        self.sync.last_error(&self.user)
    }

    fn enqueue_sync(&self) {
        self.sync.enqueue(self.user.clone(), self.cart.snapshot());
    }
}
