//! `storefront-pipeline` — the event-driven synchronization and
//! order-ingestion pipeline.
//!
//! Inbound events (identity changes, order placements) enter through the
//! dispatcher, which routes identity events to the idempotent user sync and
//! order events to the batcher. The batcher windows order events (size or
//! time, whichever first) and bulk-persists each window as a unit, retrying
//! with backoff and dead-lettering batches that keep failing. Checkout sits
//! upstream: it recomputes the authoritative price, emits the order event,
//! and clears the stored cart.

pub mod address;
pub mod batch;
pub mod checkout;
pub mod dead_letter;
pub mod dispatch;
pub mod query;
pub mod retry;
pub mod store;
pub mod sync;


pub use address::Address;
pub use batch::{BatchConfig, BatchWindow, BatcherStats, OrderBatcher, OrderBatcherHandle, OrderSink};
pub use checkout::{CheckoutReceipt, CheckoutService};
pub use dead_letter::{DeadLetterEntry, DeadLetterQueue, InMemoryDeadLetterQueue};
pub use dispatch::{Dispatcher, DispatcherWorker, DispatcherWorkerHandle, InboundEvent};
pub use query::{OrderItemView, OrderQueryGateway, OrderView};
pub use retry::{BackoffStrategy, RetryPolicy, retry_blocking};
pub use store::{
    AddressStore, InMemoryAddressStore, InMemoryOrderStore, InMemoryUserStore, OrderStore,
    StoreError, UserStore,
};
pub use sync::UserSync;
