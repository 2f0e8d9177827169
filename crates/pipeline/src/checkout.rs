//! Checkout: validate, recompute the authoritative price, emit the order
//! event, clear the stored cart.

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use storefront_cart::CartSnapshot;
use storefront_catalog::ProductCatalog;
use storefront_core::{AddressId, DomainError, DomainResult, UserId};
use storefront_orders::{OrderItem, OrderPlaced};

use crate::batch::OrderSink;
use crate::store::{StoreError, UserStore};

/// Checkout response, mirrored onto the HTTP surface.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutReceipt {
    pub message: &'static str,
    /// Tax-inclusive total charged, as carried on the emitted event.
    pub amount: u64,
}

/// Turns a checkout submission into an `OrderPlaced` event.
///
/// The client-side total is never trusted: the amount is recomputed here
/// against live catalog prices. The stored cart is cleared exactly once, at
/// emission time, decoupled from when the batcher later persists the order.
#[derive(Debug, Clone)]
pub struct CheckoutService<C, U, K> {
    catalog: C,
    users: U,
    sink: K,
}

impl<C, U, K> CheckoutService<C, U, K>
where
    C: ProductCatalog,
    U: UserStore,
    K: OrderSink,
{
    pub fn new(catalog: C, users: U, sink: K) -> Self {
        Self { catalog, users, sink }
    }

    pub fn checkout(
        &self,
        user_id: UserId,
        address_id: Option<AddressId>,
        items: Vec<OrderItem>,
    ) -> DomainResult<CheckoutReceipt> {
        let address_id =
            address_id.ok_or_else(|| DomainError::empty_order("no address selected"))?;

        let cart: CartSnapshot = items
            .into_iter()
            .filter(|item| item.quantity > 0)
            .map(|item| (item.product, item.quantity))
            .collect();
        if cart.is_empty() {
            return Err(DomainError::empty_order("no items with positive quantity"));
        }

        let breakdown = storefront_pricing::compute(&cart, &self.catalog)?;
        let event = OrderPlaced {
            user_id: user_id.clone(),
            address_id,
            items: cart
                .iter()
                .map(|(product, quantity)| OrderItem {
                    product: product.clone(),
                    quantity,
                })
                .collect(),
            amount: breakdown.total,
            placed_at: Utc::now(),
        };

        self.sink.submit(event)?;
        info!(user = %user_id, amount = breakdown.total, "order placed");

        // Clear the stored cart exactly once per submitted order. A missing
        // user record means there is nothing to clear.
        match self.users.set_cart(&user_id, CartSnapshot::new()) {
            Ok(()) | Err(StoreError::NotFound) => {}
            Err(err) => {
                // The order event is already in flight; the stale stored cart
                // self-heals on the next cart sync.
                warn!(user = %user_id, error = %err, "failed to clear stored cart");
            }
        }

        Ok(CheckoutReceipt {
            message: "Order Placed",
            amount: breakdown.total,
        })
    }
}
