//! `storefront-cart` — per-user cart state machine and its remote-sync
//! contract.
//!
//! The local cart is the source of truth for display; the remote store is
//! eventually consistent. Every sync carries the full current snapshot (never
//! a delta), so repeated syncs are naturally idempotent and self-healing.

pub mod snapshot;
pub mod state;
pub mod sync;

pub use snapshot::CartSnapshot;
pub use state::Cart;
pub use sync::{CartSync, CartSyncHandle, CartSyncWorker, CartSyncWorkerHandle, SyncedCart};
