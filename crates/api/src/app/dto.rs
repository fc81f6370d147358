use serde::Deserialize;

use shopkit_cart::{Cart, LineItem};
use shopkit_orders::OrderRecord;
use shopkit_pricing::OrderTotals;
use shopkit_promos::{PromoApplication, PromoValidation};
use shopkit_tracking::TrackingProjection;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: String,
    pub name: String,
    pub unit_price_cents: u64,
    pub quantity: u32,
    pub size: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct ApplyPromoRequest {
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub shipping: String,
}

#[derive(Debug, Deserialize)]
pub struct TotalsQuery {
    pub shipping: Option<String>,
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn line_item_to_json(item: &LineItem) -> serde_json::Value {
    serde_json::json!({
        "id": item.id.to_string(),
        "product_id": item.product_id.to_string(),
        "name": item.name,
        "unit_price_cents": item.unit_price_cents,
        "quantity": item.quantity,
        "size": item.size,
        "color": item.color,
    })
}

pub fn cart_to_json(cart: &Cart) -> serde_json::Value {
    serde_json::json!({
        "items": cart.items().iter().map(line_item_to_json).collect::<Vec<_>>(),
        "is_empty": cart.is_empty(),
    })
}

pub fn totals_to_json(totals: &OrderTotals) -> serde_json::Value {
    serde_json::json!({
        "subtotal_cents": totals.subtotal_cents,
        "discount_cents": totals.discount_cents,
        "shipping_cents": totals.shipping_cents,
        "tax_cents": totals.tax_cents,
        "total_cents": totals.total_cents,
    })
}

pub fn promo_to_json(application: &PromoApplication) -> serde_json::Value {
    serde_json::json!({
        "code": application.code().as_str(),
        "discount_percent": application.discount().as_percent(),
    })
}

pub fn validation_to_json(validation: &PromoValidation) -> serde_json::Value {
    serde_json::json!({
        "is_valid": validation.is_valid,
        "discount_percent": validation.discount.as_percent(),
        "message": validation.message,
    })
}

pub fn order_to_json(record: &OrderRecord) -> serde_json::Value {
    serde_json::json!({
        "id": record.order.id.to_string(),
        "placed_at": record.order.placed_at.to_rfc3339(),
        "shipping_method": record.order.shipping_method.as_str(),
        "promo_code": record.order.promo_code,
        "totals": totals_to_json(&record.order.totals()),
        "items": record.items.iter().map(|item| serde_json::json!({
            "line_no": item.line_no,
            "product_id": item.product_id.to_string(),
            "name": item.name,
            "unit_price_cents": item.unit_price_cents,
            "quantity": item.quantity,
            "size": item.size,
            "color": item.color,
        })).collect::<Vec<_>>(),
    })
}

pub fn tracking_to_json(projection: &TrackingProjection) -> serde_json::Value {
    serde_json::json!({
        "current_status": projection.current_status.as_str(),
        "current_label": projection.current_status.label(),
        "completion_fraction": projection.completion_fraction,
        "latest_event": projection.latest_event.as_ref().map(|event| serde_json::json!({
            "status": event.status.as_str(),
            "description": event.description,
            "location": event.location,
            "tracking_number": event.tracking_number,
            "courier_name": event.courier_name,
            "estimated_delivery": event.estimated_delivery.map(|d| d.to_rfc3339()),
            "created_at": event.created_at.to_rfc3339(),
        })),
    })
}
