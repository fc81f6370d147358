use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use shopkit_orders::{NewOrder, NewOrderItem, OrderId, OrderRecord};
use shopkit_tracking::TrackingEvent;

use super::r#trait::{BackendError, PromoRpcReply, StorefrontBackend};

/// Promo code row as the hosted backend stores it.
///
/// The validation rule (active, inside the validity window, under the usage
/// cap) belongs to the remote side; [`InMemoryBackend`] evaluates it locally
/// only because it stands in for that remote side.
#[derive(Debug, Clone, PartialEq)]
pub struct PromoCodeRow {
    pub code: String,
    pub discount_percentage: f64,
    pub is_active: bool,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub max_uses: u32,
    pub current_uses: u32,
}

impl PromoCodeRow {
    /// Row for a code that is redeemable right now.
    pub fn active(code: impl Into<String>, discount_percentage: f64) -> Self {
        let now = Utc::now();
        Self {
            code: code.into(),
            discount_percentage,
            is_active: true,
            valid_from: now - chrono::Duration::days(1),
            valid_until: now + chrono::Duration::days(30),
            max_uses: 1_000,
            current_uses: 0,
        }
    }
}

/// In-memory storefront backend.
///
/// Intended for tests/dev. Keeps orders, order items, tracking events, and
/// promo codes in plain maps and applies the same promo redemption rule the
/// hosted procedure applies, including bumping the usage counter when an
/// order that redeemed a code is inserted.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    orders: RwLock<HashMap<OrderId, NewOrder>>,
    order_items: RwLock<HashMap<OrderId, Vec<NewOrderItem>>>,
    tracking: RwLock<HashMap<OrderId, Vec<TrackingEvent>>>,
    promos: RwLock<HashMap<String, PromoCodeRow>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a promo code row, keyed by its normalized text.
    pub fn seed_promo(&self, row: PromoCodeRow) {
        if let Ok(mut promos) = self.promos.write() {
            promos.insert(row.code.to_uppercase(), row);
        }
    }

    /// Record tracking events for an order, kept in insertion order.
    pub fn seed_tracking(&self, order_id: OrderId, events: Vec<TrackingEvent>) {
        if let Ok(mut tracking) = self.tracking.write() {
            tracking.entry(order_id).or_default().extend(events);
        }
    }

    /// Current usage counter for a code, if the code exists.
    pub fn promo_uses(&self, code: &str) -> Option<u32> {
        self.promos
            .read()
            .ok()
            .and_then(|promos| promos.get(&code.to_uppercase()).map(|row| row.current_uses))
    }

    fn evaluate_promo(row: &PromoCodeRow, now: DateTime<Utc>) -> PromoRpcReply {
        if !row.is_active {
            return PromoRpcReply {
                is_valid: false,
                discount_percentage: 0.0,
                message: "This promo code is no longer active.".to_string(),
            };
        }
        if now < row.valid_from {
            return PromoRpcReply {
                is_valid: false,
                discount_percentage: 0.0,
                message: "This promo code is not active yet.".to_string(),
            };
        }
        if now > row.valid_until {
            return PromoRpcReply {
                is_valid: false,
                discount_percentage: 0.0,
                message: "This promo code has expired.".to_string(),
            };
        }
        if row.current_uses >= row.max_uses {
            return PromoRpcReply {
                is_valid: false,
                discount_percentage: 0.0,
                message: "This promo code has reached its usage limit.".to_string(),
            };
        }

        PromoRpcReply {
            is_valid: true,
            discount_percentage: row.discount_percentage,
            message: format!("Promo code applied: {}% off", row.discount_percentage),
        }
    }
}

#[async_trait::async_trait]
impl StorefrontBackend for InMemoryBackend {
    async fn insert_order(&self, order: &NewOrder) -> Result<(), BackendError> {
        let mut orders = self
            .orders
            .write()
            .map_err(|_| BackendError::Transport("lock poisoned".to_string()))?;

        if orders.contains_key(&order.id) {
            return Err(BackendError::Status(409));
        }
        orders.insert(order.id, order.clone());
        drop(orders);

        // The remote side is the sole writer of usage counters; mirror that
        // here by counting the redemption at order insert.
        if let Some(code) = &order.promo_code {
            let mut promos = self
                .promos
                .write()
                .map_err(|_| BackendError::Transport("lock poisoned".to_string()))?;
            if let Some(row) = promos.get_mut(&code.to_uppercase()) {
                row.current_uses = row.current_uses.saturating_add(1);
            }
        }

        Ok(())
    }

    async fn insert_order_items(&self, items: &[NewOrderItem]) -> Result<(), BackendError> {
        let mut order_items = self
            .order_items
            .write()
            .map_err(|_| BackendError::Transport("lock poisoned".to_string()))?;

        for item in items {
            order_items
                .entry(item.order_id)
                .or_default()
                .push(item.clone());
        }

        Ok(())
    }

    async fn fetch_order(&self, id: OrderId) -> Result<Option<OrderRecord>, BackendError> {
        let orders = self
            .orders
            .read()
            .map_err(|_| BackendError::Transport("lock poisoned".to_string()))?;

        let Some(order) = orders.get(&id).cloned() else {
            return Ok(None);
        };
        drop(orders);

        let order_items = self
            .order_items
            .read()
            .map_err(|_| BackendError::Transport("lock poisoned".to_string()))?;

        let mut items = order_items.get(&id).cloned().unwrap_or_default();
        items.sort_by_key(|item| item.line_no);

        Ok(Some(OrderRecord { order, items }))
    }

    async fn fetch_tracking_events(&self, id: OrderId) -> Result<Vec<TrackingEvent>, BackendError> {
        let tracking = self
            .tracking
            .read()
            .map_err(|_| BackendError::Transport("lock poisoned".to_string()))?;

        let mut events = tracking.get(&id).cloned().unwrap_or_default();
        events.sort_by_key(|event| event.created_at);

        Ok(events)
    }

    async fn validate_promo_code(&self, code: &str) -> Result<PromoRpcReply, BackendError> {
        let promos = self
            .promos
            .read()
            .map_err(|_| BackendError::Transport("lock poisoned".to_string()))?;

        match promos.get(&code.to_uppercase()) {
            Some(row) => Ok(Self::evaluate_promo(row, Utc::now())),
            None => Ok(PromoRpcReply {
                is_valid: false,
                discount_percentage: 0.0,
                message: "Invalid promo code.".to_string(),
            }),
        }
    }
}
