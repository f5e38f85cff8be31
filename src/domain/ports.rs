use super::authorization::{AuthorizationRequest, AuthorizationResponse};
use super::idempotency::IdempotencyRecord;
use super::payment::Payment;
use crate::error::{Result, UpstreamError};
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Inserts the payment, overwriting any record with the same id.
    async fn add(&self, payment: Payment) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Option<Payment>>;
    async fn count(&self) -> Result<usize>;
}

/// Outcome of [`IdempotencyStore::claim`].
pub enum Claim {
    /// The caller owns the key and must finish the handle.
    Acquired(ClaimHandle),
    /// The key already completed; the stored record is to be replayed.
    Completed(IdempotencyRecord),
}

/// Exclusive right to perform the one authoritative execution for a key.
///
/// Dropping the handle without finishing it releases the claim, unless a record
/// was staged through [`ClaimSlot::stage`], in which case that record is published.
pub trait ClaimSlot: Send {
    /// Sets the record to publish if the handle is dropped before it is finished.
    fn stage(&mut self, record: IdempotencyRecord);

    /// Publishes `record` under the key and wakes every waiter.
    ///
    /// Returns the record that is stored for the key afterwards. This is
    /// `record` unless the key had already been completed through
    /// [`IdempotencyStore::save`], in which case the earlier record is kept.
    fn complete(self: Box<Self>, record: IdempotencyRecord) -> IdempotencyRecord;

    /// Clears the claim without storing anything. Waiters retry as fresh callers.
    fn release(self: Box<Self>);
}

pub type ClaimHandle = Box<dyn ClaimSlot>;

#[async_trait]
pub trait IdempotencyStore: Send + Sync {
    /// Completed record for `key`. In-flight claims are not visible here.
    async fn get(&self, key: &str) -> Result<Option<IdempotencyRecord>>;

    /// Stores `record` unless the key already has one. Returns whether it was written.
    async fn save(&self, key: &str, record: IdempotencyRecord) -> Result<bool>;

    /// Atomically claims `key`, or waits for the current claimant to finish.
    ///
    /// Resolves to [`Claim::Completed`] once a record exists for the key. If the
    /// current claimant releases instead, the wait starts over and this caller
    /// may become the new claimant.
    async fn claim(&self, key: &str) -> Result<Claim>;
}

/// Boundary to the acquiring bank.
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn process_payment(
        &self,
        request: AuthorizationRequest,
    ) -> std::result::Result<AuthorizationResponse, UpstreamError>;
}

pub type PaymentStoreBox = Box<dyn PaymentStore>;
pub type IdempotencyStoreBox = Box<dyn IdempotencyStore>;
pub type AuthorizerBox = Box<dyn Authorizer>;
