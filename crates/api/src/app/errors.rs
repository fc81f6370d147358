use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use shopkit_core::DomainError;
use shopkit_infra::backend::BackendError;
use shopkit_infra::cart_store::CartStoreError;
use shopkit_pricing::ShippingMethod;

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
    }
}

/// The hosted backend could not serve us; from the shopper's side that is a
/// gateway failure and the request is safe to retry.
pub fn backend_error_to_response(err: BackendError) -> axum::response::Response {
    json_error(StatusCode::BAD_GATEWAY, "backend_error", err.to_string())
}

pub fn cart_store_error_to_response(err: CartStoreError) -> axum::response::Response {
    match err {
        CartStoreError::Domain(e) => domain_error_to_response(e),
        CartStoreError::Storage(e) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", e.to_string())
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn parse_shipping_method(s: &str) -> Result<ShippingMethod, axum::response::Response> {
    match s.to_lowercase().as_str() {
        "standard" => Ok(ShippingMethod::Standard),
        "express" => Ok(ShippingMethod::Express),
        _ => Err(json_error(
            StatusCode::BAD_REQUEST,
            "invalid_shipping_method",
            "shipping must be one of: standard, express",
        )),
    }
}
