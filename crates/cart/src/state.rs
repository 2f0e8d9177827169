use storefront_core::ProductId;

use crate::snapshot::CartSnapshot;

/// In-memory cart state machine.
///
/// States per product: `absent` and `present(quantity > 0)`. Transitions:
/// - `add`: absent → present(1); present(q) → present(q+1)
/// - `set_quantity(0)`: present(*) → absent (same as `remove`)
/// - `set_quantity(q > 0)`: any → present(q)
///
/// The machine itself is purely local; see [`crate::sync::SyncedCart`] for
/// the variant that mirrors every transition to the remote store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    items: CartSnapshot,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate from a previously stored snapshot.
    pub fn from_snapshot(snapshot: CartSnapshot) -> Self {
        Self { items: snapshot }
    }

    /// Increment a product's quantity by one.
    pub fn add(&mut self, product: ProductId) {
        let next = self.items.quantity(&product) + 1;
        self.items.set(product, next);
    }

    /// Set a product's quantity; zero removes it.
    pub fn set_quantity(&mut self, product: ProductId, quantity: u32) {
        self.items.set(product, quantity);
    }

    /// Remove a product regardless of quantity.
    pub fn remove(&mut self, product: &ProductId) {
        self.items.remove(product);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// The current full mapping, used both for local total display and as the
    /// authoritative payload sent on sync.
    pub fn snapshot(&self) -> CartSnapshot {
        self.items.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total units in the cart.
    pub fn count(&self) -> u64 {
        self.items.unit_count()
    }
}
