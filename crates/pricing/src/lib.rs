//! Cart pricing domain module.
//!
//! This crate computes order totals (subtotal, promo discount, shipping, tax)
//! from cart line items, implemented purely as deterministic domain logic
//! (no IO, no HTTP, no storage). Money is integer cents; rates are integer
//! basis points.

pub mod config;
pub mod totals;

pub use config::PricingConfig;
pub use totals::{compute_totals, DiscountPercent, OrderTotals, ShippingMethod};
