//! ERP order-status client
//!
//! `PUT {base_url}/orders/{external_order_ref}/status/{code}` with a bearer
//! token. Rate-limit responses are retried with exponential backoff; every
//! other non-2xx answer ends the push. Each attempt is bounded by the request
//! timeout; backoff sleeps are not, so running out of retries always ends as
//! a rate-limited report.

use std::time::Duration;

use procura_domain::constants::MAX_RETRY_AFTER_SECS;
use procura_domain::{ErpConfig, ExternalStatus, ProcuraError, SyncReport};
use reqwest::header::RETRY_AFTER;
use reqwest::{Method, Response};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::errors::ErpError;
use crate::http::HttpClient;

const HEALTH_CHECK_TIMEOUT_SECS: u64 = 5;

/// Outbound client for the ERP status endpoint.
pub struct ErpStatusClient {
    http: HttpClient,
    base_url: Url,
    attempt_timeout: Duration,
    max_rate_limit_retries: u32,
    base_backoff: Duration,
}

impl ErpStatusClient {
    pub fn new(config: &ErpConfig) -> Result<Self, ErpError> {
        let base_url = Url::parse(config.base_url.trim())
            .map_err(|err| ErpError::Config(format!("invalid base_url: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ErpError::Config(format!("base_url {base_url} cannot carry a path")));
        }

        // 5xx answers are terminal for a push, so the transport only retries
        // connection failures.
        let attempt_timeout = Duration::from_secs(config.request_timeout_secs.max(1));
        let http = HttpClient::builder()
            .timeout(attempt_timeout)
            .max_attempts(2)
            .retry_server_errors(false)
            .build()?;

        Ok(Self {
            http,
            base_url,
            attempt_timeout,
            max_rate_limit_retries: config.max_rate_limit_retries,
            base_backoff: Duration::from_millis(config.base_backoff_ms),
        })
    }

    /// Push `status` for one ERP order.
    ///
    /// Pushing the same status twice is harmless, the endpoint is idempotent.
    #[instrument(skip(self, access_token), fields(code = status.code()))]
    pub async fn set_order_status(
        &self,
        access_token: &str,
        external_order_ref: &str,
        status: ExternalStatus,
    ) -> SyncReport {
        let url = match self.status_url(external_order_ref, status) {
            Ok(url) => url,
            Err(err) => return SyncReport::failed(err.to_string(), 0),
        };

        let mut retries_used = 0;
        loop {
            let request =
                self.http.request(Method::PUT, url.clone()).bearer_auth(access_token);

            match self.send_once(request).await {
                Ok(()) => {
                    info!(external_order_ref, retries_used, "ERP status pushed");
                    return SyncReport::synced(retries_used);
                }
                Err(ErpError::RateLimited { retry_after })
                    if retries_used < self.max_rate_limit_retries =>
                {
                    retries_used += 1;
                    let delay = self.retry_delay(retries_used, retry_after);
                    warn!(
                        external_order_ref,
                        attempt = retries_used,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "ERP rate limited status push, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(ErpError::RateLimited { .. }) => {
                    warn!(external_order_ref, retries_used, "ERP still rate limited, giving up");
                    return SyncReport::rate_limited(retries_used);
                }
                Err(err) => {
                    warn!(
                        external_order_ref,
                        category = %err.category(),
                        error = %err,
                        "ERP status push failed"
                    );
                    return SyncReport::failed(err.to_string(), retries_used);
                }
            }
        }
    }

    /// Longest a single [`Self::set_order_status`] call can take: every
    /// attempt timing out plus the largest possible wait before each retry.
    pub fn push_budget(&self) -> Duration {
        let attempts =
            self.attempt_timeout.saturating_mul(self.max_rate_limit_retries.saturating_add(1));
        (1..=self.max_rate_limit_retries).fold(attempts, |budget, retry| {
            let longest_wait = self
                .retry_delay(retry, None)
                .max(Duration::from_secs(MAX_RETRY_AFTER_SECS));
            budget.saturating_add(longest_wait)
        })
    }

    /// Check if the ERP is reachable.
    ///
    /// Performs a HEAD request to `/health`.
    ///
    /// # Returns
    /// * `Ok(true)` - ERP answered with a 2xx
    /// * `Ok(false)` - non-2xx, unreachable or timed out
    pub async fn check_health(&self) -> Result<bool, ErpError> {
        let health_endpoint = self.endpoint(&["health"])?;

        let health_client = HttpClient::builder()
            .timeout(Duration::from_secs(HEALTH_CHECK_TIMEOUT_SECS))
            .max_attempts(1)
            .build()?;

        let request = health_client.request(Method::HEAD, health_endpoint);
        match health_client.send(request).await {
            Ok(response) => Ok(response.status().is_success()),
            Err(ProcuraError::Network(_)) => {
                warn!("ERP health check failed: network error");
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn send_once(&self, request: reqwest::RequestBuilder) -> Result<(), ErpError> {
        let response = tokio::time::timeout(self.attempt_timeout, self.http.send(request))
            .await
            .map_err(|_| {
                ErpError::Network(format!("timed out after {}s", self.attempt_timeout.as_secs()))
            })??;
        let status = response.status();
        debug!(status = status.as_u16(), "received ERP status response");

        if status.is_success() {
            return Ok(());
        }

        let retry_after = retry_after(&response);
        let body = response.text().await.unwrap_or_default();
        Err(ErpError::from_status(status, retry_after, body))
    }

    fn status_url(&self, external_order_ref: &str, status: ExternalStatus) -> Result<Url, ErpError> {
        let code = status.code().to_string();
        self.endpoint(&["orders", external_order_ref, "status", code.as_str()])
    }

    /// Append escaped path segments to the base URL, keeping its own path.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ErpError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ErpError::Config("base_url cannot carry a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `Retry-After` wins when present (capped); otherwise
    /// `base_backoff × 2^(retry − 1)`.
    fn retry_delay(&self, retry_number: u32, retry_after: Option<Duration>) -> Duration {
        if let Some(server_delay) = retry_after {
            return server_delay.min(Duration::from_secs(MAX_RETRY_AFTER_SECS));
        }
        let shift = retry_number.saturating_sub(1).min(16);
        self.base_backoff.saturating_mul(1u32 << shift)
    }
}

fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
