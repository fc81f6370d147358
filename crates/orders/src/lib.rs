//! Checkout hand-off domain module.
//!
//! Turns a session cart plus its computed totals into the order header and
//! order-item rows the hosted backend stores. The actual persistence and any
//! post-placement lifecycle (fulfillment, tracking) belong to the remote
//! side; this crate only shapes and validates the hand-off payload.

pub mod order;

pub use order::{
    build_order, CheckoutHandoff, NewOrder, NewOrderItem, OrderId, OrderRecord,
};
