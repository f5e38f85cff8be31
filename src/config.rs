use crate::error::{PaymentError, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

/// Process configuration, from flags or the environment.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Address the HTTP API listens on
    #[arg(long, env = "PAYMENT_GATEWAY_BIND", default_value = "0.0.0.0:8090")]
    pub bind: SocketAddr,

    /// Base URL of the acquiring bank. Payments are posted to `<url>/payments`.
    #[arg(long, env = "ACQUIRER_URL", default_value = "http://localhost:8080")]
    pub acquirer_url: String,

    /// Upper bound on a single acquiring bank call, in milliseconds
    #[arg(long, env = "ACQUIRER_TIMEOUT_MS", default_value_t = 10_000)]
    pub acquirer_timeout_ms: u64,

    /// Number of independently locked shards in each in-memory store
    #[arg(long, env = "PAYMENT_GATEWAY_STORE_SHARDS", default_value_t = 16)]
    pub store_shards: usize,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn acquirer_timeout(&self) -> Duration {
        Duration::from_millis(self.acquirer_timeout_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.acquirer_timeout_ms == 0 {
            return Err(PaymentError::ValidationError(
                "acquirer timeout must be greater than zero".to_string(),
            ));
        }
        if self.store_shards == 0 {
            return Err(PaymentError::ValidationError(
                "store shards must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
