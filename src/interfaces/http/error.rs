use super::request::FieldError;
use crate::error::PaymentError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

/// Everything a handler can fail with, mapped onto HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// The request was rejected before reaching the coordinator.
    Rejected(Vec<FieldError>),
    /// The path did not name a payment.
    InvalidId,
    Payment(PaymentError),
}

impl From<PaymentError> for ApiError {
    fn from(e: PaymentError) -> Self {
        Self::Payment(e)
    }
}

fn rejected(errors: &[FieldError]) -> Response {
    let body = json!({ "status": "Rejected", "errors": errors });
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

fn not_found() -> Response {
    let body = json!({ "message": "Page not found", "error": "invalid id" });
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Rejected(errors) => rejected(&errors),
            Self::InvalidId | Self::Payment(PaymentError::PaymentNotFound(_)) => not_found(),
            Self::Payment(PaymentError::ValidationError(message)) => {
                rejected(&[FieldError::new("request", message)])
            }
            Self::Payment(e @ PaymentError::ProcessingError) => {
                let body = json!({ "message": e.to_string() });
                (StatusCode::BAD_GATEWAY, Json(body)).into_response()
            }
            Self::Payment(e) => {
                error!(error = %e, "request failed");
                let body = json!({ "message": "Internal server error" });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}
