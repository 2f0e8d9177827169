use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{AddressId, ProductId, UserId};
use storefront_events::Event;

/// One line of an order: a product reference and a positive quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product: ProductId,
    pub quantity: u32,
}

/// Immutable fact that a user placed an order.
///
/// `amount` is the tax-inclusive total computed at emission time; consumers
/// persist it verbatim and never recompute. `date` travels as epoch
/// milliseconds on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPlaced {
    #[serde(rename = "userId")]
    pub user_id: UserId,
    #[serde(rename = "address")]
    pub address_id: AddressId,
    pub items: Vec<OrderItem>,
    pub amount: u64,
    #[serde(rename = "date", with = "chrono::serde::ts_milliseconds")]
    pub placed_at: DateTime<Utc>,
}

impl Event for OrderPlaced {
    fn event_type(&self) -> &'static str {
        "order/created"
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.placed_at
    }
}
