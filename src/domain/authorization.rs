use super::payment::{Currency, PaymentInput};
use serde::{Deserialize, Serialize};

/// Normalized request sent to the acquiring bank.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct AuthorizationRequest {
    pub card_number: String,
    /// `<month>/<year>`
    pub expiry_date: String,
    pub currency: Currency,
    pub amount: u64,
    pub cvv: String,
}

impl From<&PaymentInput> for AuthorizationRequest {
    fn from(input: &PaymentInput) -> Self {
        Self {
            card_number: input.card_number.clone(),
            expiry_date: input.expiry_date(),
            currency: input.currency,
            amount: input.amount,
            cvv: input.cvv.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct AuthorizationResponse {
    pub authorized: bool,
    #[serde(default)]
    pub authorization_code: String,
}

impl AuthorizationResponse {
    pub fn authorized(code: impl Into<String>) -> Self {
        Self {
            authorized: true,
            authorization_code: code.into(),
        }
    }

    pub fn declined(code: impl Into<String>) -> Self {
        Self {
            authorized: false,
            authorization_code: code.into(),
        }
    }
}
