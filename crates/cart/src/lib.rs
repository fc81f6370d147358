//! Shopping cart domain module.
//!
//! This crate contains business rules for the session shopping cart,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no
//! storage).

pub mod cart;

pub use cart::{
    Cart, LineItem, LineItemId, NewLineItem, ProductId, QUANTITY_MAX, QUANTITY_MIN,
};
