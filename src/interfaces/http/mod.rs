//! HTTP boundary: routing, request validation and response mapping around the
//! [`PaymentCoordinator`].

pub mod error;
mod handlers;
pub mod request;

pub use handlers::IDEMPOTENCY_KEY_HEADER;

use crate::application::coordinator::PaymentCoordinator;
use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;

/// Builds the API router.
pub fn router(coordinator: Arc<PaymentCoordinator>) -> Router {
    Router::new()
        .route("/healthz", get(handlers::handle_health))
        .route("/api/payments", post(handlers::handle_post_payment))
        .route("/api/payments/{id}", get(handlers::handle_get_payment))
        .fallback(handlers::handle_not_found)
        .with_state(coordinator)
}
