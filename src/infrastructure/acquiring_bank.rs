use crate::domain::authorization::{AuthorizationRequest, AuthorizationResponse};
use crate::domain::ports::Authorizer;
use crate::error::{PaymentError, Result, UpstreamError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

const PAYMENTS_PATH: &str = "/payments";

/// HTTP client for the acquiring bank.
///
/// Posts the normalized request as JSON to `<base_url>/payments` and expects a
/// `200` with `{"authorized": bool, "authorization_code": string}`. There is no
/// retry; every failure is reported as a single [`UpstreamError`].
#[derive(Clone)]
pub struct AcquiringBankClient {
    http: Client,
    endpoint: String,
}

impl AcquiringBankClient {
    /// Builds a client whose connect and total request time are bounded by `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| PaymentError::InternalError(Box::new(e)))?;

        Ok(Self {
            http,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), PAYMENTS_PATH),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Authorizer for AcquiringBankClient {
    async fn process_payment(
        &self,
        request: AuthorizationRequest,
    ) -> std::result::Result<AuthorizationResponse, UpstreamError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    UpstreamError::new("acquirer request timed out")
                } else {
                    UpstreamError::new(format!("acquirer request failed: {e}"))
                }
            })?;

        let status = response.status();
        debug!(%status, "acquirer responded");
        if !status.is_success() {
            return Err(UpstreamError::new(format!(
                "acquirer responded with {status}"
            )));
        }

        response
            .json::<AuthorizationResponse>()
            .await
            .map_err(|e| UpstreamError::new(format!("malformed acquirer response: {e}")))
    }
}
