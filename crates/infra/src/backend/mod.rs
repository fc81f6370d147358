//! Hosted storefront backend boundary.
//!
//! This module defines an infrastructure-facing abstraction over the hosted
//! backend that owns orders, order items, tracking events, and promo codes,
//! without making any transport assumptions.

pub mod http;
pub mod in_memory;
pub mod r#trait;

pub use http::HttpBackend;
pub use in_memory::{InMemoryBackend, PromoCodeRow};
pub use r#trait::{BackendError, PromoRpcReply, StorefrontBackend};
