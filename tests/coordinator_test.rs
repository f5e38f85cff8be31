use payment_gateway::application::coordinator::CREATED;
use payment_gateway::domain::authorization::AuthorizationResponse;
use payment_gateway::domain::payment::{Currency, PaymentStatus};
use payment_gateway::domain::ports::{IdempotencyStore, PaymentStore};
use payment_gateway::error::{PaymentError, UpstreamError};
use std::time::Duration;
use uuid::Uuid;

mod common;

use common::{MockAuthorizer, harness, sample_input};

#[tokio::test]
async fn test_authorized_path_writes_twice() {
    let h = harness(MockAuthorizer::replying(AuthorizationResponse::authorized("X")));

    let submission = h.coordinator.submit("K1", sample_input()).await.unwrap();
    assert_eq!(submission.status_code, CREATED);
    assert_eq!(submission.response.status, PaymentStatus::Authorized);

    assert_eq!(
        h.payments.writes(),
        vec![PaymentStatus::Submitted, PaymentStatus::Authorized]
    );
    let payment = h
        .coordinator
        .get_payment_by_id(submission.response.id)
        .await
        .unwrap();
    assert_eq!(payment.status(), PaymentStatus::Authorized);
    assert_eq!(payment.authorization_code(), Some("X"));
}

#[tokio::test]
async fn test_authorizer_receives_normalized_request() {
    let h = harness(MockAuthorizer::replying(AuthorizationResponse::authorized("X")));

    h.coordinator.submit("K1", sample_input()).await.unwrap();

    let requests = h.authorizer.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.card_number, "2222405343248877");
    assert_eq!(request.expiry_date, "11/2099");
    assert_eq!(request.currency, Currency::Gbp);
    assert_eq!(request.amount, 10000);
    assert_eq!(request.cvv, "123");
}

#[tokio::test]
async fn test_declined_path() {
    let h = harness(MockAuthorizer::replying(AuthorizationResponse::declined("Y")));

    let submission = h.coordinator.submit("K1", sample_input()).await.unwrap();
    assert_eq!(submission.response.status, PaymentStatus::Declined);

    let payment = h
        .coordinator
        .get_payment_by_id(submission.response.id)
        .await
        .unwrap();
    assert_eq!(payment.status(), PaymentStatus::Declined);
    assert_eq!(payment.authorization_code(), Some("Y"));
    assert_eq!(
        h.payments.writes(),
        vec![PaymentStatus::Submitted, PaymentStatus::Declined]
    );
}

#[tokio::test]
async fn test_gateway_failure_keeps_payment_submitted() {
    let h = harness(MockAuthorizer::failing("connection reset"));

    let result = h.coordinator.submit("K1", sample_input()).await;
    assert!(matches!(result, Err(PaymentError::ProcessingError)));

    assert_eq!(h.payments.writes(), vec![PaymentStatus::Submitted]);
    assert_eq!(h.payments.count().await.unwrap(), 1);
    assert!(h.idempotency.get("K1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_retry_after_failure_reinvokes_gateway() {
    let authorizer = MockAuthorizer::replying(AuthorizationResponse::authorized("A2"))
        .scripted(vec![Err(UpstreamError::new("503 Service Unavailable"))]);
    let h = harness(authorizer);

    let first = h.coordinator.submit("K1", sample_input()).await;
    assert!(matches!(first, Err(PaymentError::ProcessingError)));

    let retry = h.coordinator.submit("K1", sample_input()).await.unwrap();
    assert!(!retry.replayed);
    assert_eq!(retry.response.status, PaymentStatus::Authorized);
    assert_eq!(h.authorizer.calls(), 2);

    // The failed attempt stays behind as a separate Submitted payment
    assert_eq!(h.payments.count().await.unwrap(), 2);

    // From now on the key replays the successful response
    let replay = h.coordinator.submit("K1", sample_input()).await.unwrap();
    assert!(replay.replayed);
    assert_eq!(replay.response, retry.response);
    assert_eq!(h.authorizer.calls(), 2);
}

#[tokio::test]
async fn test_gateway_timeout_is_processing_failure() {
    let authorizer = MockAuthorizer::replying(AuthorizationResponse::authorized("late"))
        .with_delay(Duration::from_secs(5));
    let mut h = harness(authorizer);
    h.coordinator = h.coordinator.with_gateway_timeout(Duration::from_millis(50));

    let result = h.coordinator.submit("K1", sample_input()).await;
    assert!(matches!(result, Err(PaymentError::ProcessingError)));
    assert_eq!(h.payments.writes(), vec![PaymentStatus::Submitted]);
    assert!(h.idempotency.get("K1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_example_scenario_replays_identical_response() {
    let h = harness(MockAuthorizer::replying(AuthorizationResponse::authorized("A1")));

    let first = h.coordinator.submit("K1", sample_input()).await.unwrap();
    assert_eq!(first.response.status, PaymentStatus::Authorized);
    assert_eq!(first.response.card_number_last_four, "8877");
    assert_eq!(first.response.amount, 10000);
    assert_eq!(first.response.currency, Currency::Gbp);

    // Any body under the same key replays the first response
    let mut other = sample_input();
    other.amount = 1;
    other.currency = Currency::Usd;
    other.card_number = "4111111111111111".to_string();
    let second = h.coordinator.submit("K1", other).await.unwrap();

    assert!(second.replayed);
    assert_eq!(second.status_code, first.status_code);
    assert_eq!(
        serde_json::to_vec(&second.response).unwrap(),
        serde_json::to_vec(&first.response).unwrap()
    );
    assert_eq!(h.authorizer.calls(), 1);
    assert_eq!(h.payments.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_different_keys_are_discriminated() {
    let authorizer = MockAuthorizer::replying(AuthorizationResponse::authorized("A"))
        .scripted(vec![Ok(AuthorizationResponse::declined("D"))]);
    let h = harness(authorizer);

    let first = h.coordinator.submit("K1", sample_input()).await.unwrap();
    let second = h.coordinator.submit("K2", sample_input()).await.unwrap();

    assert_ne!(first.response.id, second.response.id);
    assert_eq!(first.response.status, PaymentStatus::Declined);
    assert_eq!(second.response.status, PaymentStatus::Authorized);
    assert_eq!(h.payments.count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_lookup() {
    let h = harness(MockAuthorizer::replying(AuthorizationResponse::authorized("A1")));

    let unknown = Uuid::new_v4();
    assert!(matches!(
        h.coordinator.get_payment_by_id(unknown).await,
        Err(PaymentError::PaymentNotFound(id)) if id == unknown
    ));

    let submission = h.coordinator.submit("K1", sample_input()).await.unwrap();
    let found = h
        .coordinator
        .get_payment_by_id(submission.response.id)
        .await
        .unwrap();
    let stored = h.payments.get(submission.response.id).await.unwrap().unwrap();
    assert_eq!(found, stored);
}
