use clap::Parser;
use miette::{IntoDiagnostic, Result};
use payment_gateway::application::coordinator::PaymentCoordinator;
use payment_gateway::config::Config;
use payment_gateway::domain::ports::{AuthorizerBox, IdempotencyStoreBox, PaymentStoreBox};
use payment_gateway::infrastructure::acquiring_bank::AcquiringBankClient;
use payment_gateway::infrastructure::in_memory::{InMemoryIdempotencyStore, InMemoryPaymentStore};
use payment_gateway::interfaces::http;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .into_diagnostic()?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    config.validate().into_diagnostic()?;

    // Process-lifetime, in-memory storage
    let payments: PaymentStoreBox = Box::new(InMemoryPaymentStore::with_shards(config.store_shards));
    let idempotency: IdempotencyStoreBox =
        Box::new(InMemoryIdempotencyStore::with_shards(config.store_shards));

    let acquirer = AcquiringBankClient::new(&config.acquirer_url, config.acquirer_timeout())
        .into_diagnostic()?;
    info!(endpoint = acquirer.endpoint(), "using acquiring bank");
    let authorizer: AuthorizerBox = Box::new(acquirer);

    let coordinator = PaymentCoordinator::new(payments, idempotency, authorizer)
        .with_gateway_timeout(config.acquirer_timeout());
    let app = http::router(Arc::new(coordinator));

    let listener = TcpListener::bind(config.bind).await.into_diagnostic()?;
    info!(addr = %config.bind, "payment gateway listening");
    axum::serve(listener, app).await.into_diagnostic()?;

    Ok(())
}
