use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use storefront_core::ProductId;

/// A catalog product, read-only to this system.
///
/// Prices are in smallest currency unit (e.g., cents). `offer_price` is the
/// price a customer is actually charged; `price` is the list price shown
/// struck through. Pricing must always be read at computation time — it is
/// never safe to assume a price cached earlier in the checkout flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// List price in smallest currency unit.
    pub price: u64,
    /// Effective selling price in smallest currency unit.
    pub offer_price: u64,
    pub category: String,
    pub image_url: String,
}

/// Lookup interface over the external catalog.
pub trait ProductCatalog: Send + Sync {
    /// Resolve a product by id; `None` means the catalog cannot resolve it.
    fn get(&self, id: &ProductId) -> Option<Product>;

    /// Full catalog listing.
    fn list(&self) -> Vec<Product>;
}

impl<C> ProductCatalog for Arc<C>
where
    C: ProductCatalog + ?Sized,
{
    fn get(&self, id: &ProductId) -> Option<Product> {
        (**self).get(id)
    }

    fn list(&self) -> Vec<Product> {
        (**self).list()
    }
}

/// In-memory catalog for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    products: RwLock<HashMap<ProductId, Product>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed or replace a product. Test/dev helper; the real catalog is
    /// maintained elsewhere.
    pub fn seed(&self, product: Product) {
        if let Ok(mut map) = self.products.write() {
            map.insert(product.id.clone(), product);
        }
    }
}

impl ProductCatalog for InMemoryCatalog {
    fn get(&self, id: &ProductId) -> Option<Product> {
        let map = self.products.read().ok()?;
        map.get(id).cloned()
    }

    fn list(&self) -> Vec<Product> {
        let map = match self.products.read() {
            Ok(m) => m,
            Err(_) => return vec![],
        };
        map.values().cloned().collect()
    }
}
