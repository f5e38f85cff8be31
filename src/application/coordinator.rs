use crate::domain::authorization::AuthorizationRequest;
use crate::domain::idempotency::IdempotencyRecord;
use crate::domain::payment::{Payment, PaymentInput, PaymentResponse};
use crate::domain::ports::{AuthorizerBox, Claim, IdempotencyStoreBox, PaymentStoreBox};
use crate::error::{PaymentError, Result};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Status code recorded for a freshly created payment.
pub const CREATED: u16 = 201;

/// Upper bound on a single authorizer call unless configured otherwise.
pub const DEFAULT_GATEWAY_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of [`PaymentCoordinator::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub status_code: u16,
    pub response: PaymentResponse,
    /// `true` when the response was replayed from an earlier submission.
    pub replayed: bool,
}

impl Submission {
    fn from_record(record: IdempotencyRecord, replayed: bool) -> Self {
        Self {
            status_code: record.status_code,
            response: record.response,
            replayed,
        }
    }
}

/// The main entry point for payment processing.
///
/// `PaymentCoordinator` guarantees that a payment submitted under a given
/// idempotency key reaches the authorizer at most once, drives each payment
/// from `Submitted` to `Authorized` or `Declined`, and is the only writer of
/// both stores.
pub struct PaymentCoordinator {
    payments: PaymentStoreBox,
    idempotency: IdempotencyStoreBox,
    authorizer: AuthorizerBox,
    gateway_timeout: Duration,
}

impl PaymentCoordinator {
    /// Creates a new `PaymentCoordinator` instance.
    ///
    /// # Arguments
    ///
    /// * `payments` - The store for payment records.
    /// * `idempotency` - The store for idempotency claims and replayable responses.
    /// * `authorizer` - The acquiring bank boundary.
    pub fn new(
        payments: PaymentStoreBox,
        idempotency: IdempotencyStoreBox,
        authorizer: AuthorizerBox,
    ) -> Self {
        Self {
            payments,
            idempotency,
            authorizer,
            gateway_timeout: DEFAULT_GATEWAY_TIMEOUT,
        }
    }

    /// Bounds every authorizer call by `gateway_timeout`.
    pub fn with_gateway_timeout(mut self, gateway_timeout: Duration) -> Self {
        self.gateway_timeout = gateway_timeout;
        self
    }

    /// Submits a payment under `idempotency_key`.
    ///
    /// The first caller for a key performs the submission; concurrent and later
    /// callers with the same key get the stored response back, whatever body
    /// they sent. If the authorizer call fails nothing is stored and the key can
    /// be retried; once the authorizer has answered, the key is always completed.
    pub async fn submit(&self, idempotency_key: &str, input: PaymentInput) -> Result<Submission> {
        let mut handle = match self.idempotency.claim(idempotency_key).await? {
            Claim::Completed(record) => {
                debug!(
                    idempotency_key,
                    payment_id = %record.response.id,
                    "replaying stored response"
                );
                return Ok(Submission::from_record(record, true));
            }
            Claim::Acquired(handle) => handle,
        };

        let payment = match self.authorize(&input).await {
            Ok(payment) => payment,
            Err(e) => {
                warn!(idempotency_key, "submission failed, releasing idempotency key");
                handle.release();
                return Err(e);
            }
        };

        // The acquirer has answered; from here on the key never goes back to free.
        let record = IdempotencyRecord::new(CREATED, PaymentResponse::from(&payment));
        handle.stage(record.clone());
        let written = self.payments.add(payment.clone()).await;
        let stored = handle.complete(record);

        match written {
            Ok(()) => {
                info!(payment_id = %payment.id(), status = ?payment.status(), "payment resolved");
                Ok(Submission::from_record(stored, false))
            }
            Err(e) => {
                error!(
                    idempotency_key,
                    payment_id = %payment.id(),
                    status = ?payment.status(),
                    error = %e,
                    "resolved payment could not be stored"
                );
                Err(e)
            }
        }
    }

    /// Looks up a payment by id.
    pub async fn get_payment_by_id(&self, id: Uuid) -> Result<Payment> {
        debug!(%id, "looking up payment");
        self.payments
            .get(id)
            .await?
            .ok_or(PaymentError::PaymentNotFound(id))
    }

    /// Records the payment as `Submitted` and asks the authorizer for a decision.
    ///
    /// Returns the resolved payment, which is not yet written back to the store.
    async fn authorize(&self, input: &PaymentInput) -> Result<Payment> {
        let mut payment = Payment::submit(input);
        // Visible as Submitted even if the authorizer call fails below
        self.payments.add(payment.clone()).await?;
        info!(
            payment_id = %payment.id(),
            card_last_four = payment.card_last_four(),
            amount = payment.amount(),
            currency = %payment.currency(),
            "payment submitted"
        );

        let request = AuthorizationRequest::from(input);
        let reply = match timeout(self.gateway_timeout, self.authorizer.process_payment(request)).await
        {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                error!(payment_id = %payment.id(), error = %e, "Error while processing upstream payment");
                return Err(PaymentError::ProcessingError);
            }
            Err(_) => {
                error!(
                    payment_id = %payment.id(),
                    timeout_ms = self.gateway_timeout.as_millis() as u64,
                    "authorizer call timed out"
                );
                return Err(PaymentError::ProcessingError);
            }
        };

        payment.resolve(reply.authorized, reply.authorization_code)?;
        Ok(payment)
    }
}
