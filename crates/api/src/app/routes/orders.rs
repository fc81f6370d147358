use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use shopkit_core::RecordId;
use shopkit_orders::OrderId;
use shopkit_tracking::project;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/:id", get(get_order))
        .route("/:id/tracking", get(get_tracking))
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let order_id: RecordId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid order id")
        }
    };

    match services.backend().fetch_order(OrderId::new(order_id)).await {
        Ok(Some(record)) => (StatusCode::OK, Json(dto::order_to_json(&record))).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "order not found"),
        Err(e) => errors::backend_error_to_response(e),
    }
}

pub async fn get_tracking(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let order_id: RecordId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid order id")
        }
    };

    match services
        .backend()
        .fetch_tracking_events(OrderId::new(order_id))
        .await
    {
        Ok(events) => {
            let projection = project(&events);
            (StatusCode::OK, Json(dto::tracking_to_json(&projection))).into_response()
        }
        Err(e) => errors::backend_error_to_response(e),
    }
}
