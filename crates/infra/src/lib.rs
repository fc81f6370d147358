//! Infrastructure adapters for ShopKit.
//!
//! This crate connects the pure domain crates to the outside world:
//!
//! - [`backend`]: the hosted storefront backend (orders, order items,
//!   tracking events, promo code validation) behind the
//!   [`backend::StorefrontBackend`] trait, with HTTP and in-memory
//!   implementations.
//! - [`cart_store`]: durable per-session cart persistence behind the
//!   [`cart_store::CartStorage`] trait, with SQLite and in-memory
//!   implementations, plus the [`cart_store::SessionCartStore`] that
//!   layers cart semantics on top.
//! - [`promo`]: the promo validation client that turns backend replies
//!   into domain [`shopkit_promos::PromoValidation`] values.

pub mod backend;
pub mod cart_store;
pub mod promo;

#[cfg(test)]
mod integration_tests;
