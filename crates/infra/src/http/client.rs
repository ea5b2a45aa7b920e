//! Outbound HTTP transport for the ERP integration.
//!
//! Only transport failures and, when enabled, 5xx answers are retried here.
//! Status-level policy (429 handling, auth failures) belongs to the caller.

use std::time::Duration;

use procura_domain::ProcuraError;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tracing::debug;

use crate::errors::InfraError;

const USER_AGENT: &str = concat!("procura/", env!("CARGO_PKG_VERSION"));

/// Attempt budget and backoff for one [`HttpClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Initial try included.
    pub max_attempts: usize,
    pub base_backoff: Duration,
    pub retry_server_errors: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3, base_backoff: Duration::from_millis(200), retry_server_errors: true }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based): `base × 2^(retry−1)`.
    pub fn delay_for(&self, retry: usize) -> Duration {
        let exponent = u32::try_from(retry.saturating_sub(1)).unwrap_or(u32::MAX).min(8);
        self.base_backoff.saturating_mul(1u32 << exponent)
    }

    fn allows_another(&self, attempt: usize) -> bool {
        attempt < self.max_attempts.max(1)
    }
}

/// reqwest client plus a [`RetryPolicy`].
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    policy: RetryPolicy,
}

impl HttpClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Send `builder`, retrying per the policy.
    ///
    /// The request must be cloneable (buffered body) so it can be replayed.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, ProcuraError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let request = builder
                .try_clone()
                .ok_or_else(|| ProcuraError::Internal("streaming request bodies cannot be replayed".into()))?
                .build()
                .map_err(transport_error)?;
            let (method, url) = (request.method().clone(), request.url().clone());

            match self.client.execute(request).await {
                Ok(response) => {
                    let status = response.status();
                    debug!(attempt, %method, %url, %status, "HTTP response");
                    let retry = self.policy.retry_server_errors && status.is_server_error();
                    if !(retry && self.policy.allows_another(attempt)) {
                        return Ok(response);
                    }
                }
                Err(err) => {
                    debug!(attempt, %method, %url, error = %err, "HTTP transport failure");
                    if !(is_transient(&err) && self.policy.allows_another(attempt)) {
                        return Err(transport_error(err));
                    }
                }
            }

            let delay = self.policy.delay_for(attempt);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    policy: RetryPolicy,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(30), policy: RetryPolicy::default() }
    }
}

impl HttpClientBuilder {
    /// Per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.policy.max_attempts = attempts.max(1);
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.policy.base_backoff = backoff;
        self
    }

    /// Turn off for calls whose 5xx answer is final, such as status pushes.
    pub fn retry_server_errors(mut self, enabled: bool) -> Self {
        self.policy.retry_server_errors = enabled;
        self
    }

    pub fn build(self) -> Result<HttpClient, ProcuraError> {
        let client = ReqwestClient::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .no_proxy()
            .build()
            .map_err(transport_error)?;

        Ok(HttpClient { client, policy: self.policy })
    }
}

fn is_transient(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}

fn transport_error(err: reqwest::Error) -> ProcuraError {
    InfraError::from(err).into()
}
