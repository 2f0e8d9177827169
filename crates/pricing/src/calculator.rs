use serde::{Deserialize, Serialize};

use storefront_cart::CartSnapshot;
use storefront_catalog::ProductCatalog;
use storefront_core::{DomainError, DomainResult};

/// Tax rate applied on top of the item subtotal, in whole percent.
pub const TAX_RATE_PERCENT: u64 = 2;

/// Result of pricing a cart. All values in smallest currency unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    /// Subtotal: sum of quantity times effective price per item.
    pub amount: u64,
    /// Tax, floored integer percentage of the subtotal.
    pub tax: u64,
    /// `amount + tax`.
    pub total: u64,
}

/// Price a cart snapshot against the catalog.
///
/// Every entry must resolve; a product the catalog cannot find fails the
/// whole computation with [`DomainError::UnknownProduct`] rather than being
/// skipped. Prices are read from the catalog at call time, never from state
/// captured earlier in the flow.
pub fn compute<C>(cart: &CartSnapshot, catalog: &C) -> DomainResult<PriceBreakdown>
where
    C: ProductCatalog + ?Sized,
{
    let mut amount: u64 = 0;
    for (product_id, quantity) in cart.iter() {
        // Snapshots never store zero quantities, but stay defensive against
        // callers constructing via serde.
        if quantity == 0 {
            continue;
        }
        let product = catalog
            .get(product_id)
            .ok_or_else(|| DomainError::unknown_product(product_id))?;
        let line = product
            .offer_price
            .checked_mul(u64::from(quantity))
            .ok_or_else(|| DomainError::invalid_cart("line total overflows"))?;
        amount = amount
            .checked_add(line)
            .ok_or_else(|| DomainError::invalid_cart("cart subtotal overflows"))?;
    }

    let tax = amount
        .checked_mul(TAX_RATE_PERCENT)
        .ok_or_else(|| DomainError::invalid_cart("cart subtotal overflows"))?
        / 100;
    // The checked_mul above proves amount * 2 fits, and tax < amount, so
    // amount + tax cannot overflow.
    Ok(PriceBreakdown {
        amount,
        tax,
        total: amount + tax,
    })
}
