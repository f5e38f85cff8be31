use super::payment::PaymentResponse;
use serde::{Deserialize, Serialize};

/// Response previously returned for an idempotency key.
///
/// Written once, on the first successful completion for the key, and replayed
/// verbatim afterwards.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct IdempotencyRecord {
    pub status_code: u16,
    pub response: PaymentResponse,
}

impl IdempotencyRecord {
    pub fn new(status_code: u16, response: PaymentResponse) -> Self {
        Self {
            status_code,
            response,
        }
    }
}
