//! `storefront-orders` — the order-creation event and the persisted order
//! record built from it.

pub mod event;
pub mod order;

pub use event::{OrderItem, OrderPlaced};
pub use order::{Order, OrderStatus};
