//! Per-tenant ERP token lifecycle
//!
//! - Token lookup from the persistent store
//! - Refresh within the expiry buffer, serialized per tenant
//! - Persistence of the new pair before it is handed out

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use procura_domain::{ErpTokenRecord, Result as DomainResult, TenantId, TokenSet};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::auth::ErpAuthClient;
use super::errors::ErpError;

/// Persistent storage for [`ErpTokenRecord`]s, one per tenant.
#[async_trait]
pub trait ErpTokenStore: Send + Sync {
    async fn load(&self, tenant_id: &str) -> DomainResult<Option<ErpTokenRecord>>;

    /// Insert or replace the tenant's record.
    async fn save(&self, record: &ErpTokenRecord) -> DomainResult<()>;
}

/// Hands out access tokens that are valid for at least the refresh buffer.
///
/// The ERP invalidates a refresh token when it is redeemed, so two concurrent
/// refreshes for the same tenant would leave the loser with a dead pair.
/// Refreshes therefore hold a per-tenant lock; other tenants are unaffected.
pub struct ErpTokenManager {
    store: Arc<dyn ErpTokenStore>,
    auth: ErpAuthClient,
    refresh_buffer_secs: i64,
    locks: DashMap<TenantId, Arc<Mutex<()>>>,
}

impl ErpTokenManager {
    pub fn new(store: Arc<dyn ErpTokenStore>, auth: ErpAuthClient, refresh_buffer_secs: i64) -> Self {
        Self { store, auth, refresh_buffer_secs, locks: DashMap::new() }
    }

    /// Persist the pair obtained from the tenant's initial authorization.
    #[instrument(skip(self, tokens))]
    pub async fn store_initial(
        &self,
        tenant_id: &str,
        tokens: TokenSet,
    ) -> Result<ErpTokenRecord, ErpError> {
        let lock = self.tenant_lock(tenant_id);
        let _guard = lock.lock().await;

        let record = ErpTokenRecord::from_token_set(tenant_id, tokens, Utc::now());
        self.store.save(&record).await.map_err(storage_error)?;
        info!(tenant_id, expires_at = %record.expires_at, "ERP authorization stored");
        Ok(record)
    }

    /// Return an access token that does not expire within the buffer,
    /// refreshing it first when needed.
    #[instrument(skip(self))]
    pub async fn ensure_fresh_token(&self, tenant_id: &str) -> Result<String, ErpError> {
        let record = self.load_record(tenant_id).await?;
        if !record.needs_refresh(Utc::now(), self.refresh_buffer_secs) {
            return Ok(record.access_token);
        }

        let lock = self.tenant_lock(tenant_id);
        let guard = lock.lock_owned().await;

        // Another caller may have refreshed while this one waited.
        let record = self.load_record(tenant_id).await?;
        if !record.needs_refresh(Utc::now(), self.refresh_buffer_secs) {
            debug!(tenant_id, "ERP token already refreshed by a concurrent caller");
            return Ok(record.access_token);
        }

        // Refresh and persist on a detached task holding the tenant lock, so a
        // cancelled caller can't drop a redeemed pair before it is stored.
        let store = Arc::clone(&self.store);
        let auth = self.auth.clone();
        let tenant = tenant_id.to_string();
        let task = tokio::spawn(async move {
            let _guard = guard;
            let tokens = auth.refresh(&record.refresh_token).await?;
            let refreshed = ErpTokenRecord::from_token_set(tenant, tokens, Utc::now());
            store.save(&refreshed).await.map_err(storage_error)?;
            Ok::<_, ErpError>(refreshed)
        });

        let refreshed = task
            .await
            .map_err(|err| ErpError::Storage(format!("token refresh task failed: {err}")))?
            .inspect_err(|err| {
                warn!(tenant_id, category = %err.category(), error = %err, "ERP token refresh failed");
            })?;

        info!(tenant_id, expires_at = %refreshed.expires_at, "ERP token refreshed");
        Ok(refreshed.access_token)
    }

    async fn load_record(&self, tenant_id: &str) -> Result<ErpTokenRecord, ErpError> {
        self.store
            .load(tenant_id)
            .await
            .map_err(storage_error)?
            .ok_or_else(|| ErpError::Auth(format!("tenant {tenant_id} has not authorized ERP access")))
    }

    fn tenant_lock(&self, tenant_id: &str) -> Arc<Mutex<()>> {
        Arc::clone(
            self.locks
                .entry(tenant_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        )
    }
}

fn storage_error(err: procura_domain::ProcuraError) -> ErpError {
    ErpError::Storage(err.to_string())
}
