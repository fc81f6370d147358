use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopkit_cart::{LineItem, ProductId};
use shopkit_core::{DomainError, DomainResult, RecordId, SessionId};
use shopkit_pricing::{OrderTotals, ShippingMethod};
use shopkit_promos::PromoCode;

/// Order identifier, minted client-side at checkout and sent with the insert.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub RecordId);

impl OrderId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for OrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Order header row for the `orders` collection.
///
/// Snapshots the totals as computed at placement time; the stored order must
/// keep showing the figures the shopper agreed to even if rates change later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub id: OrderId,
    pub session_id: SessionId,
    pub subtotal_cents: u64,
    pub discount_cents: u64,
    pub shipping_cents: u64,
    pub tax_cents: u64,
    pub total_cents: u64,
    pub shipping_method: ShippingMethod,
    /// The normalized promo code text, when one was applied at checkout.
    pub promo_code: Option<String>,
    pub placed_at: DateTime<Utc>,
}

impl NewOrder {
    /// The totals snapshot, reassembled for display mapping.
    pub fn totals(&self) -> OrderTotals {
        OrderTotals {
            subtotal_cents: self.subtotal_cents,
            discount_cents: self.discount_cents,
            shipping_cents: self.shipping_cents,
            tax_cents: self.tax_cents,
            total_cents: self.total_cents,
        }
    }
}

/// Order line row for the `order_items` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub order_id: OrderId,
    /// 1-based position, following cart order.
    pub line_no: u32,
    pub product_id: ProductId,
    pub name: String,
    pub unit_price_cents: u64,
    pub quantity: u32,
    pub size: Option<String>,
    pub color: Option<String>,
}

/// The insert payloads produced at checkout: header first, then its items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutHandoff {
    pub order: NewOrder,
    pub items: Vec<NewOrderItem>,
}

/// A placed order read back from the backend for display.
///
/// The hosted side stores the rows as inserted, so the read-back reuses the
/// insert shapes; `items` come back ordered by `line_no`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order: NewOrder,
    pub items: Vec<NewOrderItem>,
}

/// Shape a cart and its computed totals into the checkout insert payloads.
///
/// Rejects an empty cart: there is nothing to place. The caller is expected
/// to have recomputed `totals` from these exact lines immediately beforehand;
/// as a guard against wiring mistakes the subtotal is re-derived here and a
/// mismatch is an invariant violation, not a silently accepted figure.
pub fn build_order(
    session_id: SessionId,
    order_id: OrderId,
    items: &[LineItem],
    totals: OrderTotals,
    shipping_method: ShippingMethod,
    promo: Option<&PromoCode>,
    placed_at: DateTime<Utc>,
) -> DomainResult<CheckoutHandoff> {
    if items.is_empty() {
        return Err(DomainError::validation(
            "cannot place an order from an empty cart",
        ));
    }

    let mut subtotal_cents: u64 = 0;
    for item in items {
        item.validate()?;
        let line_total = (item.unit_price_cents as u128)
            .checked_mul(item.quantity as u128)
            .ok_or_else(|| DomainError::invariant("order line amount overflow"))?;
        let line_total = u64::try_from(line_total)
            .map_err(|_| DomainError::invariant("order line amount overflow"))?;
        subtotal_cents = subtotal_cents
            .checked_add(line_total)
            .ok_or_else(|| DomainError::invariant("order subtotal overflow"))?;
    }

    if subtotal_cents != totals.subtotal_cents {
        return Err(DomainError::invariant(
            "order totals do not match the cart lines they were computed from",
        ));
    }

    let order = NewOrder {
        id: order_id,
        session_id,
        subtotal_cents: totals.subtotal_cents,
        discount_cents: totals.discount_cents,
        shipping_cents: totals.shipping_cents,
        tax_cents: totals.tax_cents,
        total_cents: totals.total_cents,
        shipping_method,
        promo_code: promo.map(|code| code.as_str().to_string()),
        placed_at,
    };

    let order_items = items
        .iter()
        .enumerate()
        .map(|(i, item)| NewOrderItem {
            order_id,
            line_no: (i + 1) as u32,
            product_id: item.product_id,
            name: item.name.clone(),
            unit_price_cents: item.unit_price_cents,
            quantity: item.quantity,
            size: item.size.clone(),
            color: item.color.clone(),
        })
        .collect();

    Ok(CheckoutHandoff {
        order,
        items: order_items,
    })
}
