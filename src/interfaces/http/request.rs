use crate::domain::payment::{Currency, PaymentInput};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/payments`.
///
/// Every field is optional at the serde level so that missing fields are
/// reported together with the other validation failures.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct PostPaymentRequest {
    pub card_number: Option<String>,
    pub expiry_month: Option<i64>,
    pub expiry_year: Option<i64>,
    pub currency: Option<String>,
    pub amount: Option<i64>,
    pub cvv: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

fn is_numeric(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

fn card_number(value: Option<String>, errors: &mut Vec<FieldError>) -> Option<String> {
    let Some(card) = value else {
        errors.push(FieldError::new("card_number", "Card number is required"));
        return None;
    };
    let mut valid = true;
    if !(14..=19).contains(&card.len()) {
        errors.push(FieldError::new(
            "card_number",
            "Card number must be between 14 and 19 digits",
        ));
        valid = false;
    }
    if !is_numeric(&card) {
        errors.push(FieldError::new(
            "card_number",
            "Card number must contain only numeric characters",
        ));
        valid = false;
    }
    valid.then_some(card)
}

fn expiry(
    month: Option<i64>,
    year: Option<i64>,
    today: NaiveDate,
    errors: &mut Vec<FieldError>,
) -> Option<(u32, i32)> {
    let month = match month {
        None => {
            errors.push(FieldError::new("expiry_month", "Expiry month is required"));
            None
        }
        Some(m) if (1..=12).contains(&m) => Some(m as u32),
        Some(_) => {
            errors.push(FieldError::new(
                "expiry_month",
                "Expiry month must be between 1 and 12",
            ));
            None
        }
    };
    let year = match year {
        None => {
            errors.push(FieldError::new("expiry_year", "Expiry year is required"));
            None
        }
        Some(y) if (1..=9999).contains(&y) => Some(y as i32),
        Some(_) => {
            errors.push(FieldError::new(
                "expiry_year",
                "Expiry year must be a valid year",
            ));
            None
        }
    };

    let (month, year) = (month?, year?);
    if (year, month) <= (today.year(), today.month()) {
        errors.push(FieldError::new(
            "expiry_date",
            "Expiry date must be in the future",
        ));
        return None;
    }
    Some((month, year))
}

fn currency(value: Option<String>, errors: &mut Vec<FieldError>) -> Option<Currency> {
    let Some(code) = value else {
        errors.push(FieldError::new("currency", "Currency is required"));
        return None;
    };
    match code.parse() {
        Ok(currency) => Some(currency),
        Err(_) => {
            errors.push(FieldError::new(
                "currency",
                "Currency must be one of: USD, GBP, EUR",
            ));
            None
        }
    }
}

fn amount(value: Option<i64>, errors: &mut Vec<FieldError>) -> Option<u64> {
    match value {
        None => {
            errors.push(FieldError::new("amount", "Amount is required"));
            None
        }
        Some(a) if a > 0 => Some(a as u64),
        Some(_) => {
            errors.push(FieldError::new("amount", "Amount must be a positive integer"));
            None
        }
    }
}

fn cvv(value: Option<String>, errors: &mut Vec<FieldError>) -> Option<String> {
    let Some(cvv) = value else {
        errors.push(FieldError::new("cvv", "CVV is required"));
        return None;
    };
    let mut valid = true;
    if !(3..=4).contains(&cvv.len()) {
        errors.push(FieldError::new("cvv", "CVV must be 3 or 4 digits"));
        valid = false;
    }
    if !is_numeric(&cvv) {
        errors.push(FieldError::new(
            "cvv",
            "CVV must contain only numeric characters",
        ));
        valid = false;
    }
    valid.then_some(cvv)
}

impl PostPaymentRequest {
    /// Checks every field and converts the request into a [`PaymentInput`].
    ///
    /// `today` anchors the expiry check: the expiry month must be strictly
    /// after today's month. All failures are returned, not just the first.
    pub fn validate(self, today: NaiveDate) -> Result<PaymentInput, Vec<FieldError>> {
        let mut errors = Vec::new();

        let card_number = card_number(self.card_number, &mut errors);
        let expiry = expiry(self.expiry_month, self.expiry_year, today, &mut errors);
        let currency = currency(self.currency, &mut errors);
        let amount = amount(self.amount, &mut errors);
        let cvv = cvv(self.cvv, &mut errors);

        match (card_number, expiry, currency, amount, cvv) {
            (
                Some(card_number),
                Some((expiry_month, expiry_year)),
                Some(currency),
                Some(amount),
                Some(cvv),
            ) if errors.is_empty() => Ok(PaymentInput {
                card_number,
                expiry_month,
                expiry_year,
                currency,
                amount,
                cvv,
            }),
            _ => Err(errors),
        }
    }
}
