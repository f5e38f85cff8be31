use crate::error::{PaymentError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    Submitted,
    Authorized,
    Declined,
}

impl PaymentStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Submitted)
    }
}

/// Currencies accepted by the acquiring bank.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Gbp,
    Eur,
}

impl Currency {
    pub fn code(self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Gbp => "GBP",
            Self::Eur => "EUR",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "USD" => Ok(Self::Usd),
            "GBP" => Ok(Self::Gbp),
            "EUR" => Ok(Self::Eur),
            _ => Err(PaymentError::ValidationError(
                "Currency must be one of: USD, GBP, EUR".to_string(),
            )),
        }
    }
}

/// A payment submission that has already passed boundary validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentInput {
    pub card_number: String,
    pub expiry_month: u32,
    pub expiry_year: i32,
    pub currency: Currency,
    /// Amount in minor currency units.
    pub amount: u64,
    pub cvv: String,
}

impl PaymentInput {
    /// Expiry as the single `<month>/<year>` token the acquirer expects.
    pub fn expiry_date(&self) -> String {
        format!("{}/{}", self.expiry_month, self.expiry_year)
    }
}

/// Canonical record of a payment and its lifecycle status.
///
/// Everything except the status and authorization code is fixed at creation.
/// The only transition is `Submitted -> Authorized | Declined`, performed once
/// through [`Payment::resolve`].
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Payment {
    id: Uuid,
    status: PaymentStatus,
    card_number: String,
    expiry_month: u32,
    expiry_year: i32,
    currency: Currency,
    amount: u64,
    authorization_code: Option<String>,
}

impl Payment {
    /// Creates a new `Submitted` payment with a freshly generated id.
    pub fn submit(input: &PaymentInput) -> Self {
        Self {
            id: Uuid::new_v4(),
            status: PaymentStatus::Submitted,
            card_number: input.card_number.clone(),
            expiry_month: input.expiry_month,
            expiry_year: input.expiry_year,
            currency: input.currency,
            amount: input.amount,
            authorization_code: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn status(&self) -> PaymentStatus {
        self.status
    }

    /// Last four characters of the card number, or the whole number if shorter.
    pub fn card_last_four(&self) -> &str {
        let start = self.card_number.len().saturating_sub(4);
        self.card_number.get(start..).unwrap_or(&self.card_number)
    }

    pub fn expiry_month(&self) -> u32 {
        self.expiry_month
    }

    pub fn expiry_year(&self) -> i32 {
        self.expiry_year
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn authorization_code(&self) -> Option<&str> {
        self.authorization_code.as_deref()
    }

    /// Moves the payment out of `Submitted` according to the acquirer's decision.
    pub fn resolve(&mut self, authorized: bool, authorization_code: String) -> Result<()> {
        if self.status.is_terminal() {
            return Err(PaymentError::InvalidTransition { from: self.status });
        }
        self.status = if authorized {
            PaymentStatus::Authorized
        } else {
            PaymentStatus::Declined
        };
        self.authorization_code = Some(authorization_code);
        Ok(())
    }
}

/// Client-facing view of a payment. This is what gets stored for replay under
/// an idempotency key, so it must not carry the card number or CVV.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub status: PaymentStatus,
    pub card_number_last_four: String,
    pub expiry_month: u32,
    pub expiry_year: i32,
    pub currency: Currency,
    pub amount: u64,
}

impl From<&Payment> for PaymentResponse {
    fn from(payment: &Payment) -> Self {
        Self {
            id: payment.id,
            status: payment.status,
            card_number_last_four: payment.card_last_four().to_string(),
            expiry_month: payment.expiry_month,
            expiry_year: payment.expiry_year,
            currency: payment.currency,
            amount: payment.amount,
        }
    }
}
