//! Service wiring: stores, bus, pipeline workers.

use std::sync::{Arc, Mutex};

use storefront_catalog::InMemoryCatalog;
use storefront_events::InMemoryEventBus;
use storefront_pipeline::batch::{
    BatchConfig, OrderBatcher, OrderBatcherHandle, OrderBatcherWorkerHandle,
};
use storefront_pipeline::checkout::CheckoutService;
use storefront_pipeline::dead_letter::InMemoryDeadLetterQueue;
use storefront_pipeline::dispatch::{Dispatcher, DispatcherWorker, DispatcherWorkerHandle, InboundEvent};
use storefront_pipeline::query::OrderQueryGateway;
use storefront_pipeline::retry::RetryPolicy;
use storefront_pipeline::store::{InMemoryAddressStore, InMemoryOrderStore, InMemoryUserStore};
use storefront_pipeline::sync::UserSync;

pub type SharedCheckout =
    CheckoutService<Arc<InMemoryCatalog>, Arc<InMemoryUserStore>, OrderBatcherHandle>;
pub type SharedGateway =
    OrderQueryGateway<Arc<InMemoryOrderStore>, Arc<InMemoryAddressStore>, Arc<InMemoryCatalog>>;

/// Background workers owned by the process, joined on shutdown.
struct PipelineWorkers {
    batcher: OrderBatcherWorkerHandle,
    dispatcher: DispatcherWorkerHandle,
}

/// Everything the handlers need, wired once at startup.
///
/// In-memory stores back the whole stack; the pipeline only ever talks to
/// them through the store traits, so a durable backend slots in without
/// touching the handlers.
pub struct AppServices {
    pub users: Arc<InMemoryUserStore>,
    pub addresses: Arc<InMemoryAddressStore>,
    pub orders: Arc<InMemoryOrderStore>,
    pub catalog: Arc<InMemoryCatalog>,
    pub dead_letters: Arc<InMemoryDeadLetterQueue>,
    pub bus: Arc<InMemoryEventBus<InboundEvent>>,
    pub batcher: OrderBatcherHandle,
    pub checkout: SharedCheckout,
    pub gateway: SharedGateway,
    workers: Mutex<Option<PipelineWorkers>>,
}

impl AppServices {
    /// Build the full pipeline: stores, bus, batcher worker, dispatcher
    /// worker, checkout, and the read gateway.
    pub fn build() -> Arc<Self> {
        let users = Arc::new(InMemoryUserStore::new());
        let addresses = Arc::new(InMemoryAddressStore::new());
        let orders = Arc::new(InMemoryOrderStore::new());
        let catalog = Arc::new(InMemoryCatalog::new());
        let dead_letters = Arc::new(InMemoryDeadLetterQueue::new());
        let bus: Arc<InMemoryEventBus<InboundEvent>> = Arc::new(InMemoryEventBus::new());

        let (batcher, batcher_worker) = OrderBatcher::spawn(
            orders.clone(),
            dead_letters.clone(),
            BatchConfig::default(),
            RetryPolicy::default(),
        );

        let dispatcher = Dispatcher::new(UserSync::new(users.clone()), batcher.clone());
        let dispatcher_worker = DispatcherWorker::spawn(dispatcher, &bus);

        let checkout = CheckoutService::new(catalog.clone(), users.clone(), batcher.clone());
        let gateway = OrderQueryGateway::new(orders.clone(), addresses.clone(), catalog.clone());

        Arc::new(Self {
            users,
            addresses,
            orders,
            catalog,
            dead_letters,
            bus,
            batcher,
            checkout,
            gateway,
            workers: Mutex::new(Some(PipelineWorkers {
                batcher: batcher_worker,
                dispatcher: dispatcher_worker,
            })),
        })
    }

    /// Stop the pipeline workers, flushing any pending order batch. Idempotent.
    pub fn shutdown(&self) {
        let workers = match self.workers.lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => None,
        };
        if let Some(workers) = workers {
            workers.dispatcher.shutdown();
            workers.batcher.shutdown();
        }
    }
}
