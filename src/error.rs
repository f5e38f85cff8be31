use crate::domain::payment::PaymentStatus;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Invalid ID: no payment with id {0}")]
    PaymentNotFound(Uuid),
    #[error("Error while processing payment")]
    ProcessingError,
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Payment status {from:?} is terminal")]
    InvalidTransition { from: PaymentStatus },
    #[error("Internal error: {0}")]
    InternalError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Failure reported by the authorizer gateway.
///
/// Timeouts, transport errors, non-success replies and malformed bodies all
/// collapse into this one kind; only the message differs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("upstream processing failure: {0}")]
pub struct UpstreamError(pub String);

impl UpstreamError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub type Result<T> = std::result::Result<T, PaymentError>;
