use axum::Router;

pub mod cart;
pub mod orders;
pub mod system;

/// Router for all session-scoped endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/cart", cart::router())
        .nest("/orders", orders::router())
}
