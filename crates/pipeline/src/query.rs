//! Read-side expansion of persisted orders.

use chrono::{DateTime, Utc};
use serde::Serialize;

use storefront_catalog::{Product, ProductCatalog};
use storefront_core::{DomainError, DomainResult, OrderId, UserId};
use storefront_orders::OrderStatus;

use crate::address::Address;
use crate::store::{AddressStore, OrderStore};

/// One order line with the product expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItemView {
    pub product: Product,
    pub quantity: u32,
}

/// A persisted order joined with its address and product details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderView {
    pub id: OrderId,
    pub items: Vec<OrderItemView>,
    pub address: Address,
    pub amount: u64,
    pub status: OrderStatus,
    pub placed_at: DateTime<Utc>,
}

/// Joins orders with their referenced address and products for display.
///
/// Pure read side: no mutation, no ordering imposed. A dangling product
/// reference fails the query with `UnknownProduct`; a dangling address with
/// `NotFound` — dangling references indicate store drift and are never
/// papered over with partial rows.
#[derive(Debug, Clone)]
pub struct OrderQueryGateway<O, A, C> {
    orders: O,
    addresses: A,
    catalog: C,
}

impl<O, A, C> OrderQueryGateway<O, A, C>
where
    O: OrderStore,
    A: AddressStore,
    C: ProductCatalog,
{
    pub fn new(orders: O, addresses: A, catalog: C) -> Self {
        Self {
            orders,
            addresses,
            catalog,
        }
    }

    pub fn orders_for_user(&self, user: &UserId) -> DomainResult<Vec<OrderView>> {
        let orders = self.orders.for_user(user)?;
        let mut views = Vec::with_capacity(orders.len());

        for order in orders {
            let address = self
                .addresses
                .get(&order.address_id)?
                .ok_or(DomainError::NotFound)?;

            let mut items = Vec::with_capacity(order.items.len());
            for item in &order.items {
                let product = self
                    .catalog
                    .get(&item.product)
                    .ok_or_else(|| DomainError::unknown_product(&item.product))?;
                items.push(OrderItemView {
                    product,
                    quantity: item.quantity,
                });
            }

            views.push(OrderView {
                id: order.id,
                items,
                address,
                amount: order.amount,
                status: order.status,
                placed_at: order.placed_at,
            });
        }

        Ok(views)
    }
}
