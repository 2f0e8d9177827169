//! Event primitives: the `Event` trait and the pub/sub bus used to feed the
//! ingestion pipeline.

pub mod bus;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
