//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures. Storage
/// failures cross into the domain only as `PersistenceFailure`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A cart references a product the catalog cannot resolve. Fatal to the
    /// computation; unmatched references indicate cart/catalog drift and are
    /// never silently skipped.
    #[error("unknown product: {0}")]
    UnknownProduct(String),

    /// Malformed cart contents (e.g. a negative quantity).
    #[error("invalid cart state: {0}")]
    InvalidCartState(String),

    /// An inbound event carried a kind the dispatcher cannot route.
    #[error("unsupported event kind: {0}")]
    UnsupportedEventKind(String),

    /// Storage unavailable or a write was rejected.
    #[error("persistence failure: {0}")]
    PersistenceFailure(String),

    /// Checkout submitted with no positive-quantity items or no address.
    #[error("empty order: {0}")]
    EmptyOrder(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested resource was not found (domain-level).
    #[error("not found")]
    NotFound,
}

impl DomainError {
    pub fn unknown_product(id: impl core::fmt::Display) -> Self {
        Self::UnknownProduct(id.to_string())
    }

    pub fn invalid_cart(msg: impl Into<String>) -> Self {
        Self::InvalidCartState(msg.into())
    }

    pub fn unsupported_kind(kind: impl Into<String>) -> Self {
        Self::UnsupportedEventKind(kind.into())
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::PersistenceFailure(msg.into())
    }

    pub fn empty_order(msg: impl Into<String>) -> Self {
        Self::EmptyOrder(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
