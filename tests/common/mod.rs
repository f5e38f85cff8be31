#![allow(dead_code)]

use async_trait::async_trait;
use payment_gateway::application::coordinator::PaymentCoordinator;
use payment_gateway::domain::authorization::{AuthorizationRequest, AuthorizationResponse};
use payment_gateway::domain::payment::{Currency, Payment, PaymentInput, PaymentStatus};
use payment_gateway::domain::ports::{Authorizer, PaymentStore};
use payment_gateway::error::{Result, UpstreamError};
use payment_gateway::infrastructure::in_memory::{InMemoryIdempotencyStore, InMemoryPaymentStore};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

pub fn sample_input() -> PaymentInput {
    PaymentInput {
        card_number: "2222405343248877".to_string(),
        expiry_month: 11,
        expiry_year: 2099,
        currency: Currency::Gbp,
        amount: 10000,
        cvv: "123".to_string(),
    }
}

/// Payment store that remembers the status of every write.
#[derive(Clone, Default)]
pub struct RecordingPaymentStore {
    inner: InMemoryPaymentStore,
    writes: Arc<Mutex<Vec<PaymentStatus>>>,
}

impl RecordingPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> Vec<PaymentStatus> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentStore for RecordingPaymentStore {
    async fn add(&self, payment: Payment) -> Result<()> {
        self.writes.lock().unwrap().push(payment.status());
        self.inner.add(payment).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Payment>> {
        self.inner.get(id).await
    }

    async fn count(&self) -> Result<usize> {
        self.inner.count().await
    }
}

type Reply = std::result::Result<AuthorizationResponse, UpstreamError>;

/// Authorizer double: plays scripted replies in order, then repeats the fallback.
#[derive(Clone)]
pub struct MockAuthorizer {
    script: Arc<Mutex<VecDeque<Reply>>>,
    fallback: Reply,
    delay: Duration,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<AuthorizationRequest>>>,
}

impl MockAuthorizer {
    pub fn replying(reply: AuthorizationResponse) -> Self {
        Self {
            script: Arc::default(),
            fallback: Ok(reply),
            delay: Duration::ZERO,
            calls: Arc::default(),
            requests: Arc::default(),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fallback: Err(UpstreamError::new(message)),
            ..Self::replying(AuthorizationResponse::authorized("unused"))
        }
    }

    /// Replies played before falling back.
    pub fn scripted(mut self, replies: Vec<Reply>) -> Self {
        self.script = Arc::new(Mutex::new(replies.into()));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<AuthorizationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Authorizer for MockAuthorizer {
    async fn process_payment(&self, request: AuthorizationRequest) -> Reply {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        let reply = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        reply
    }
}

pub struct Harness {
    pub coordinator: PaymentCoordinator,
    pub payments: RecordingPaymentStore,
    pub idempotency: InMemoryIdempotencyStore,
    pub authorizer: MockAuthorizer,
}

pub fn harness(authorizer: MockAuthorizer) -> Harness {
    let payments = RecordingPaymentStore::new();
    let idempotency = InMemoryIdempotencyStore::new();
    let coordinator = PaymentCoordinator::new(
        Box::new(payments.clone()),
        Box::new(idempotency.clone()),
        Box::new(authorizer.clone()),
    );
    Harness {
        coordinator,
        payments,
        idempotency,
        authorizer,
    }
}
