use axum::{
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use shopkit_core::SessionId;

use crate::app::errors;
use crate::context::SessionContext;

/// Header carrying the shopper's session id (a UUID minted by the client).
pub const SESSION_HEADER: &str = "x-session-id";

pub async fn session_middleware(
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let session_id = extract_session(req.headers())?;

    req.extensions_mut()
        .insert(SessionContext::new(session_id));

    Ok(next.run(req).await)
}

fn extract_session(headers: &HeaderMap) -> Result<SessionId, Response> {
    let header = headers.get(SESSION_HEADER).ok_or_else(|| {
        errors::json_error(
            StatusCode::BAD_REQUEST,
            "missing_session",
            format!("{SESSION_HEADER} header is required"),
        )
    })?;

    let header = header.to_str().map_err(|_| invalid_session())?;

    header.trim().parse().map_err(|_| invalid_session())
}

fn invalid_session() -> Response {
    errors::json_error(
        StatusCode::BAD_REQUEST,
        "invalid_session",
        format!("{SESSION_HEADER} must be a UUID"),
    )
}
