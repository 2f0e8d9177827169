use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, ProductId};

/// The complete current mapping of product to quantity for one user.
///
/// Invariant: every stored quantity is positive. Quantity 0 is equivalent to
/// absence and is normalized by removal, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartSnapshot {
    items: BTreeMap<ProductId, u32>,
}

impl CartSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from raw wire quantities, validating each entry.
    ///
    /// Negative quantities are rejected (`InvalidCartState`); zero quantities
    /// are normalized away.
    pub fn from_wire<I>(entries: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = (ProductId, i64)>,
    {
        let mut snapshot = Self::new();
        for (product, qty) in entries {
            if qty < 0 {
                return Err(DomainError::invalid_cart(format!(
                    "negative quantity {qty} for product {product}"
                )));
            }
            let qty = u32::try_from(qty).map_err(|_| {
                DomainError::invalid_cart(format!("quantity {qty} for product {product} too large"))
            })?;
            snapshot.set(product, qty);
        }
        Ok(snapshot)
    }

    /// Quantity for a product; absent products report 0.
    pub fn quantity(&self, product: &ProductId) -> u32 {
        self.items.get(product).copied().unwrap_or(0)
    }

    /// Set a product's quantity. Zero removes the entry (normalization).
    pub fn set(&mut self, product: ProductId, quantity: u32) {
        if quantity == 0 {
            self.items.remove(&product);
        } else {
            self.items.insert(product, quantity);
        }
    }

    pub fn remove(&mut self, product: &ProductId) {
        self.items.remove(product);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct products.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Total number of units across all products.
    pub fn unit_count(&self) -> u64 {
        self.items.values().map(|q| u64::from(*q)).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ProductId, u32)> {
        self.items.iter().map(|(p, q)| (p, *q))
    }
}

impl FromIterator<(ProductId, u32)> for CartSnapshot {
    fn from_iter<I: IntoIterator<Item = (ProductId, u32)>>(iter: I) -> Self {
        let mut snapshot = Self::new();
        for (product, qty) in iter {
            snapshot.set(product, qty);
        }
        snapshot
    }
}
