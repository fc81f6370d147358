//! Promo validation client.
//!
//! The redemption rules (validity window, usage cap, active flag) live on the
//! hosted backend; this client makes the single remote call and converts the
//! reply into a domain [`PromoValidation`].

use std::sync::Arc;

use shopkit_pricing::DiscountPercent;
use shopkit_promos::{PromoCode, PromoValidation};

use crate::backend::StorefrontBackend;

/// Shown when the backend cannot be reached or returns garbage; the shopper
/// sees a retryable failure, never an error page.
pub const VALIDATION_UNAVAILABLE_MESSAGE: &str = "Could not validate promo code. Please try again.";

/// Validates promo codes against the hosted backend.
pub struct PromoCodeValidator {
    backend: Arc<dyn StorefrontBackend>,
}

impl PromoCodeValidator {
    pub fn new(backend: Arc<dyn StorefrontBackend>) -> Self {
        Self { backend }
    }

    /// Validate a normalized code.
    ///
    /// Total: backend failures degrade to an invalid result carrying
    /// [`VALIDATION_UNAVAILABLE_MESSAGE`] so the cart flow never breaks on a
    /// flaky remote.
    pub async fn validate(&self, code: &PromoCode) -> PromoValidation {
        match self.backend.validate_promo_code(code.as_str()).await {
            Ok(reply) if reply.is_valid => PromoValidation::valid(
                DiscountPercent::from_percent(reply.discount_percentage),
                reply.message,
            ),
            Ok(reply) => PromoValidation::invalid(reply.message),
            Err(err) => {
                tracing::warn!(code = %code.as_str(), error = %err, "promo validation call failed");
                PromoValidation::invalid(VALIDATION_UNAVAILABLE_MESSAGE)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendError, InMemoryBackend, PromoCodeRow, PromoRpcReply};
    use shopkit_orders::{NewOrder, NewOrderItem, OrderId, OrderRecord};
    use shopkit_tracking::TrackingEvent;

    struct UnreachableBackend;

    #[async_trait::async_trait]
    impl StorefrontBackend for UnreachableBackend {
        async fn insert_order(&self, _order: &NewOrder) -> Result<(), BackendError> {
            Err(BackendError::Transport("connection refused".to_string()))
        }

        async fn insert_order_items(&self, _items: &[NewOrderItem]) -> Result<(), BackendError> {
            Err(BackendError::Transport("connection refused".to_string()))
        }

        async fn fetch_order(&self, _id: OrderId) -> Result<Option<OrderRecord>, BackendError> {
            Err(BackendError::Transport("connection refused".to_string()))
        }

        async fn fetch_tracking_events(
            &self,
            _id: OrderId,
        ) -> Result<Vec<TrackingEvent>, BackendError> {
            Err(BackendError::Transport("connection refused".to_string()))
        }

        async fn validate_promo_code(&self, _code: &str) -> Result<PromoRpcReply, BackendError> {
            Err(BackendError::Transport("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn valid_reply_becomes_a_valid_result_with_discount() {
        let backend = InMemoryBackend::new();
        backend.seed_promo(PromoCodeRow::active("SAVE20", 20.0));
        let validator = PromoCodeValidator::new(Arc::new(backend));

        let code = PromoCode::parse("save20").unwrap();
        let validation = validator.validate(&code).await;

        assert!(validation.is_valid);
        assert_eq!(validation.discount.basis_points(), 2_000);
        assert_eq!(validation.message, "Promo code applied: 20% off");
    }

    #[tokio::test]
    async fn invalid_reply_keeps_the_backend_message() {
        let backend = InMemoryBackend::new();
        let validator = PromoCodeValidator::new(Arc::new(backend));

        let code = PromoCode::parse("NOPE").unwrap();
        let validation = validator.validate(&code).await;

        assert!(!validation.is_valid);
        assert!(validation.discount.is_zero());
        assert_eq!(validation.message, "Invalid promo code.");
    }

    #[tokio::test]
    async fn backend_failure_degrades_to_invalid_with_generic_message() {
        let validator = PromoCodeValidator::new(Arc::new(UnreachableBackend));

        let code = PromoCode::parse("SAVE20").unwrap();
        let validation = validator.validate(&code).await;

        assert!(!validation.is_valid);
        assert_eq!(validation.message, VALIDATION_UNAVAILABLE_MESSAGE);
    }
}
