use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;

use shopkit_cart::{LineItemId, NewLineItem, ProductId};
use shopkit_core::RecordId;
use shopkit_orders::{build_order, OrderId};
use shopkit_pricing::{compute_totals, DiscountPercent, ShippingMethod};
use shopkit_promos::{PromoApplication, PromoCode};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::SessionContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(get_cart))
        .route("/items", post(add_item))
        .route("/items/:id", delete(remove_item))
        .route("/items/:id/quantity", post(set_quantity))
        .route("/totals", get(get_totals))
        .route("/promo", post(apply_promo).delete(remove_promo))
        .route("/checkout", post(checkout))
}

pub async fn get_cart(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
) -> axum::response::Response {
    let cart = services.carts().load(session.session_id()).await;
    (StatusCode::OK, Json(dto::cart_to_json(&cart))).into_response()
}

pub async fn add_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Json(body): Json<dto::AddItemRequest>,
) -> axum::response::Response {
    let session = session.session_id();

    let product_id: RecordId = match body.product_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id")
        }
    };

    let new_item = NewLineItem {
        product_id: ProductId::new(product_id),
        name: body.name,
        unit_price_cents: body.unit_price_cents,
        quantity: body.quantity,
        size: body.size,
        color: body.color,
    };

    let lock = services.session_lock(session).await;
    let _guard = lock.lock().await;

    match services.carts().add(session, new_item).await {
        Ok(id) => (
            StatusCode::CREATED,
            Json(serde_json::json!({"id": id.to_string()})),
        )
            .into_response(),
        Err(e) => errors::cart_store_error_to_response(e),
    }
}

pub async fn set_quantity(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::SetQuantityRequest>,
) -> axum::response::Response {
    let session = session.session_id();

    let item_id: RecordId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid item id")
        }
    };

    let lock = services.session_lock(session).await;
    let _guard = lock.lock().await;

    if let Err(e) = services
        .carts()
        .set_quantity(session, LineItemId::new(item_id), body.quantity)
        .await
    {
        return errors::cart_store_error_to_response(e);
    }

    let cart = services.carts().load(session).await;
    (StatusCode::OK, Json(dto::cart_to_json(&cart))).into_response()
}

pub async fn remove_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let session = session.session_id();

    let item_id: RecordId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid item id")
        }
    };

    let lock = services.session_lock(session).await;
    let _guard = lock.lock().await;

    if let Err(e) = services
        .carts()
        .remove(session, LineItemId::new(item_id))
        .await
    {
        return errors::cart_store_error_to_response(e);
    }

    let cart = services.carts().load(session).await;
    if cart.is_empty() {
        // An emptied cart retires the session's promo slot and lock entry.
        services.release_session(session).await;
    }

    (StatusCode::OK, Json(dto::cart_to_json(&cart))).into_response()
}

pub async fn get_totals(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Query(query): Query<dto::TotalsQuery>,
) -> axum::response::Response {
    let shipping = match query.shipping.as_deref() {
        None => ShippingMethod::Standard,
        Some(s) => match errors::parse_shipping_method(s) {
            Ok(m) => m,
            Err(resp) => return resp,
        },
    };

    let session = session.session_id();
    let cart = services.carts().load(session).await;
    let promo = services.applied_promo(session);
    let discount = promo
        .as_ref()
        .map(|a| a.discount())
        .unwrap_or(DiscountPercent::ZERO);

    match compute_totals(cart.items(), discount, shipping, services.pricing()) {
        Ok(totals) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "totals": dto::totals_to_json(&totals),
                "promo": promo.as_ref().map(dto::promo_to_json),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn apply_promo(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Json(body): Json<dto::ApplyPromoRequest>,
) -> axum::response::Response {
    let session = session.session_id();

    // Rejected locally before any remote call.
    let code = match PromoCode::parse(&body.code) {
        Ok(code) => code,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let lock = services.session_lock(session).await;
    let _guard = lock.lock().await;

    let validation = services.validator().validate(&code).await;
    match PromoApplication::from_validation(code, &validation) {
        // Replaces any previously applied code (no stacking).
        Some(application) => services.apply_promo(session, application),
        // Last write wins on the non-valid path too: a rejected or failed
        // validation evicts any earlier code instead of leaving its stale
        // discount applied.
        None => services.clear_promo(session),
    }

    (StatusCode::OK, Json(dto::validation_to_json(&validation))).into_response()
}

pub async fn remove_promo(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
) -> axum::response::Response {
    let session = session.session_id();

    let lock = services.session_lock(session).await;
    let _guard = lock.lock().await;

    services.clear_promo(session);
    (StatusCode::OK, Json(serde_json::json!({"removed": true}))).into_response()
}

pub async fn checkout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Json(body): Json<dto::CheckoutRequest>,
) -> axum::response::Response {
    let shipping = match errors::parse_shipping_method(&body.shipping) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    let session = session.session_id();
    let lock = services.session_lock(session).await;
    let _guard = lock.lock().await;

    let cart = services.carts().load(session).await;
    let promo = services.applied_promo(session);
    let discount = promo
        .as_ref()
        .map(|a| a.discount())
        .unwrap_or(DiscountPercent::ZERO);

    // Totals come from the live cart; client-supplied figures are never trusted.
    let totals = match compute_totals(cart.items(), discount, shipping, services.pricing()) {
        Ok(t) => t,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let order_id = OrderId::new(RecordId::new());
    let handoff = match build_order(
        session,
        order_id,
        cart.items(),
        totals,
        shipping,
        promo.as_ref().map(|a| a.code()),
        Utc::now(),
    ) {
        Ok(h) => h,
        Err(e) => return errors::domain_error_to_response(e),
    };

    // Header first, then items. On any backend failure the cart is left
    // untouched so the shopper can retry.
    if let Err(e) = services.backend().insert_order(&handoff.order).await {
        return errors::backend_error_to_response(e);
    }
    if let Err(e) = services.backend().insert_order_items(&handoff.items).await {
        return errors::backend_error_to_response(e);
    }

    if let Err(e) = services.carts().clear(session).await {
        // The order is already placed; log the stuck cart instead of failing
        // the checkout response.
        tracing::warn!(%session, error = %e, "failed to clear cart after checkout");
    }
    services.release_session(session).await;

    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "order_id": order_id.to_string(),
            "totals": dto::totals_to_json(&totals),
        })),
    )
        .into_response()
}
