//! OAuth refresh-token grant against the ERP authorization server.

use std::time::Duration;

use procura_domain::{ErpConfig, TokenSet};
use reqwest::Method;
use serde::Deserialize;
use tracing::{debug, warn};

use super::errors::ErpError;
use crate::http::HttpClient;

const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// Exchanges refresh tokens for new token pairs.
///
/// The grant is not idempotent (the ERP invalidates the old refresh token on
/// use), so the request is sent exactly once.
#[derive(Clone)]
pub struct ErpAuthClient {
    http: HttpClient,
    token_url: String,
    client_id: String,
    client_secret: Option<String>,
}

impl ErpAuthClient {
    pub fn new(config: &ErpConfig) -> Result<Self, ErpError> {
        if config.token_url.trim().is_empty() {
            return Err(ErpError::Config("token_url is not set".into()));
        }

        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs.max(1)))
            .max_attempts(1)
            .build()?;

        Ok(Self {
            http,
            token_url: config.token_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        })
    }

    /// Redeem `refresh_token` for a new token pair.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenSet, ErpError> {
        if refresh_token.is_empty() {
            return Err(ErpError::Auth("no refresh token stored".into()));
        }

        let mut params = vec![
            ("grant_type", "refresh_token"),
            ("client_id", self.client_id.as_str()),
            ("refresh_token", refresh_token),
        ];
        if let Some(secret) = self.client_secret.as_deref() {
            params.push(("client_secret", secret));
        }

        let request = self.http.request(Method::POST, &self.token_url).form(&params);
        let response = self.http.send(request).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "ERP token refresh rejected");
            return Err(match ErpError::from_status(status, None, body) {
                ErpError::Client { status, body } => {
                    ErpError::Auth(format!("refresh grant refused (HTTP {status}): {body}"))
                }
                other => other,
            });
        }

        let payload: TokenResponse = response
            .json()
            .await
            .map_err(|err| ErpError::Auth(format!("malformed token response: {err}")))?;
        debug!(expires_in = ?payload.expires_in, "ERP token refreshed");

        Ok(payload.into_token_set(refresh_token))
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
}

impl TokenResponse {
    /// Servers that do not rotate refresh tokens omit the field; the previous
    /// one stays valid in that case.
    fn into_token_set(self, previous_refresh_token: &str) -> TokenSet {
        TokenSet {
            access_token: self.access_token,
            refresh_token: self
                .refresh_token
                .unwrap_or_else(|| previous_refresh_token.to_string()),
            expires_in: self.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS),
        }
    }
}
