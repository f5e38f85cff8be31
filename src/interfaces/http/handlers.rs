//! Route handlers for the payments API.

use super::error::ApiError;
use super::request::{FieldError, PostPaymentRequest};
use crate::application::coordinator::PaymentCoordinator;
use crate::domain::payment::PaymentResponse;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";
const MAX_IDEMPOTENCY_KEY_LEN: usize = 255;

fn idempotency_key(headers: &HeaderMap) -> Result<String, ApiError> {
    let reject = |message: String| {
        ApiError::Rejected(vec![FieldError::new("Idempotency-Key", message)])
    };

    let key = match headers.get(IDEMPOTENCY_KEY_HEADER) {
        Some(value) => value
            .to_str()
            .map_err(|_| reject("Idempotency-Key must be visible ASCII".to_string()))?
            .trim(),
        None => "",
    };

    if key.is_empty() {
        return Err(reject("Idempotency-Key header is required".to_string()));
    }
    if key.len() > MAX_IDEMPOTENCY_KEY_LEN {
        return Err(reject(format!(
            "Idempotency-Key must be at most {MAX_IDEMPOTENCY_KEY_LEN} characters"
        )));
    }
    Ok(key.to_string())
}

/// POST /api/payments
pub(crate) async fn handle_post_payment(
    State(coordinator): State<Arc<PaymentCoordinator>>,
    headers: HeaderMap,
    payload: Result<Json<PostPaymentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let key = idempotency_key(&headers)?;
    let Json(request) = payload.map_err(|rejection| {
        ApiError::Rejected(vec![FieldError::new("body", rejection.body_text())])
    })?;
    let input = request
        .validate(Utc::now().date_naive())
        .map_err(ApiError::Rejected)?;

    let submission = coordinator.submit(&key, input).await?;
    info!(
        payment_id = %submission.response.id,
        replayed = submission.replayed,
        "payment request served"
    );

    let status = StatusCode::from_u16(submission.status_code).unwrap_or(StatusCode::CREATED);
    Ok((status, Json(submission.response)))
}

/// GET /api/payments/{id}
pub(crate) async fn handle_get_payment(
    State(coordinator): State<Arc<PaymentCoordinator>>,
    Path(id): Path<String>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let id = Uuid::parse_str(&id).map_err(|_| {
        debug!(%id, "unparseable payment id");
        ApiError::InvalidId
    })?;
    let payment = coordinator.get_payment_by_id(id).await?;
    Ok(Json(PaymentResponse::from(&payment)))
}

/// GET /healthz
pub(crate) async fn handle_health() -> &'static str {
    "ok"
}

/// Fallback handler for unmatched routes.
pub(crate) async fn handle_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "message": "not found" })),
    )
}
