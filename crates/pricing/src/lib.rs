//! `storefront-pricing` — pure price computation for cart snapshots.

pub mod calculator;

pub use calculator::{PriceBreakdown, TAX_RATE_PERCENT, compute};
