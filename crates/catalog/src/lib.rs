//! `storefront-catalog` — read-only view of the external product catalog.
//!
//! The catalog is an external collaborator: this core never mutates it, it
//! only resolves product ids to current prices at computation time.

pub mod product;

pub use product::{InMemoryCatalog, Product, ProductCatalog};
