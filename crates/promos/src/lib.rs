//! Promo code domain module.
//!
//! Code normalization and the shapes exchanged with the remote validation
//! rule. The rule itself (expiry window, usage cap, active flag) lives on the
//! remote side and is deliberately **not** re-implemented here; this crate
//! only models its inputs and outputs.

pub mod promo;

pub use promo::{PromoApplication, PromoCode, PromoValidation};
