use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{AddressId, OrderId, UserId};

use crate::event::{OrderItem, OrderPlaced};

/// Fulfillment status. Orders enter as `Placed`; later transitions belong to
/// fulfillment and are out of scope here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    #[serde(rename = "Order Placed")]
    Placed,
    #[serde(rename = "Shipped")]
    Shipped,
    #[serde(rename = "Delivered")]
    Delivered,
}

/// Persisted order record.
///
/// Everything except `status` is copied verbatim from the creation event —
/// in particular `amount` is never recomputed against current prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub address_id: AddressId,
    pub amount: u64,
    pub status: OrderStatus,
    pub placed_at: DateTime<Utc>,
}

impl Order {
    /// Materialize a record from the creation event, minting a fresh id.
    pub fn from_event(event: OrderPlaced) -> Self {
        Self {
            id: OrderId::new(),
            user_id: event.user_id,
            items: event.items,
            address_id: event.address_id,
            amount: event.amount,
            status: OrderStatus::default(),
            placed_at: event.placed_at,
        }
    }
}
