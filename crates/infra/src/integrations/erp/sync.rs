//! [`ErpStatusSync`] adapter: fresh token, then a bounded status push.
//!
//! The overall bound covers a worst-case refresh plus every rate-limit retry.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use procura_core::ErpStatusSync;
use procura_domain::{ErpConfig, ExternalStatus, SkipReason, SyncReport};
use tracing::{instrument, warn};

use super::client::ErpStatusClient;
use super::token_manager::ErpTokenManager;

/// Best-effort status mirror. Never returns an error: every failure is a
/// [`SyncReport`] outcome.
pub struct ErpStatusSyncAdapter {
    connection: Option<Connection>,
}

struct Connection {
    tokens: Arc<ErpTokenManager>,
    client: Arc<ErpStatusClient>,
    push_timeout: Duration,
}

impl ErpStatusSyncAdapter {
    pub fn new(
        tokens: Arc<ErpTokenManager>,
        client: Arc<ErpStatusClient>,
        config: &ErpConfig,
    ) -> Self {
        // One request timeout for the token refresh, then the push itself.
        let push_timeout = Duration::from_secs(config.request_timeout_secs.max(1))
            .saturating_add(client.push_budget());
        Self { connection: Some(Connection { tokens, client, push_timeout }) }
    }

    /// Adapter for deployments without ERP integration.
    pub fn disabled() -> Self {
        Self { connection: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.connection.is_some()
    }
}

#[async_trait]
impl ErpStatusSync for ErpStatusSyncAdapter {
    #[instrument(skip(self), fields(code = status.code()))]
    async fn push_status(
        &self,
        tenant_id: &str,
        external_order_ref: &str,
        status: ExternalStatus,
    ) -> SyncReport {
        let Some(connection) = &self.connection else {
            return SyncReport::skipped(SkipReason::Disabled);
        };

        let push = async {
            let token = match connection.tokens.ensure_fresh_token(tenant_id).await {
                Ok(token) => token,
                Err(err) => {
                    warn!(tenant_id, category = %err.category(), "ERP token unavailable, skipping push");
                    return SyncReport::unavailable(err.to_string());
                }
            };
            connection.client.set_order_status(&token, external_order_ref, status).await
        };

        match tokio::time::timeout(connection.push_timeout, push).await {
            Ok(report) => report,
            Err(_) => {
                warn!(
                    tenant_id,
                    external_order_ref,
                    timeout_secs = connection.push_timeout.as_secs(),
                    "ERP status push timed out"
                );
                SyncReport::failed(
                    format!("timed out after {}s", connection.push_timeout.as_secs()),
                    0,
                )
            }
        }
    }
}
