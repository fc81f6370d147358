use serde::{Deserialize, Serialize};
use thiserror::Error;

use shopkit_orders::{NewOrder, NewOrderItem, OrderId, OrderRecord};
use shopkit_tracking::TrackingEvent;
use std::sync::Arc;

/// Backend operation error.
///
/// These are **infrastructure errors** (transport, remote status, payload
/// shape) as opposed to domain errors (validation, invariants). Callers decide
/// how much of a failure to surface: checkout propagates it, promo validation
/// degrades to an invalid result.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend transport failed: {0}")]
    Transport(String),

    #[error("backend returned status {0}")]
    Status(u16),

    #[error("backend reply could not be decoded: {0}")]
    Decode(String),
}

/// Raw reply of the promo validation procedure.
///
/// This mirrors the row shape the hosted procedure returns: a verdict, the
/// percentage discount granted when valid, and a human-readable message. The
/// promo client converts it into a domain `PromoValidation`; nothing outside
/// infra consumes this type directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromoRpcReply {
    pub is_valid: bool,
    pub discount_percentage: f64,
    pub message: String,
}

/// Remote system of record for orders and promo codes.
///
/// The `StorefrontBackend` is the boundary between the storefront and the
/// hosted backend. It provides the handful of operations checkout and order
/// tracking need.
///
/// ## Design Principles
///
/// - **No transport assumptions**: works with an in-memory implementation
///   (tests/dev) and the HTTP implementation (production)
/// - **Write shapes are owned by the domain**: inserts take `NewOrder` /
///   `NewOrderItem` as built by `shopkit_orders::build_order`
/// - **Reads are tolerant**: `fetch_order` distinguishes "not found" (`None`)
///   from infrastructure failure (`Err`)
///
/// ## Checkout Semantics
///
/// Checkout performs `insert_order` followed by `insert_order_items`. The two
/// calls are not atomic across the boundary; the order header is inserted
/// first so a partial failure leaves an order without items rather than
/// orphaned items.
#[async_trait::async_trait]
pub trait StorefrontBackend: Send + Sync {
    /// Insert an order header row.
    async fn insert_order(&self, order: &NewOrder) -> Result<(), BackendError>;

    /// Insert the item rows belonging to an already-inserted order.
    async fn insert_order_items(&self, items: &[NewOrderItem]) -> Result<(), BackendError>;

    /// Fetch one order with its items, or `None` when no such order exists.
    ///
    /// Items are returned in `line_no` order.
    async fn fetch_order(&self, id: OrderId) -> Result<Option<OrderRecord>, BackendError>;

    /// Fetch the tracking events recorded for an order, oldest first.
    ///
    /// Returns an empty vector when the order has no events (or does not
    /// exist); the projection treats both the same way.
    async fn fetch_tracking_events(&self, id: OrderId) -> Result<Vec<TrackingEvent>, BackendError>;

    /// Run the hosted promo validation procedure for a normalized code.
    async fn validate_promo_code(&self, code: &str) -> Result<PromoRpcReply, BackendError>;
}

#[async_trait::async_trait]
impl<B> StorefrontBackend for Arc<B>
where
    B: StorefrontBackend + ?Sized,
{
    async fn insert_order(&self, order: &NewOrder) -> Result<(), BackendError> {
        (**self).insert_order(order).await
    }

    async fn insert_order_items(&self, items: &[NewOrderItem]) -> Result<(), BackendError> {
        (**self).insert_order_items(items).await
    }

    async fn fetch_order(&self, id: OrderId) -> Result<Option<OrderRecord>, BackendError> {
        (**self).fetch_order(id).await
    }

    async fn fetch_tracking_events(&self, id: OrderId) -> Result<Vec<TrackingEvent>, BackendError> {
        (**self).fetch_tracking_events(id).await
    }

    async fn validate_promo_code(&self, code: &str) -> Result<PromoRpcReply, BackendError> {
        (**self).validate_promo_code(code).await
    }
}
