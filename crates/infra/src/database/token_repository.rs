//! Per-tenant ERP token persistence.

use std::sync::Arc;

use async_trait::async_trait;
use procura_domain::{ErpTokenRecord, Result as DomainResult};
use rusqlite::{params, OptionalExtension};

use super::columns::{from_millis, map_sql_error, run_blocking, to_millis};
use super::manager::DbManager;
use crate::integrations::erp::ErpTokenStore;

pub struct SqliteTokenRepository {
    db: Arc<DbManager>,
}

impl SqliteTokenRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ErpTokenStore for SqliteTokenRepository {
    async fn load(&self, tenant_id: &str) -> DomainResult<Option<ErpTokenRecord>> {
        let tenant_id = tenant_id.to_string();
        run_blocking(&self.db, move |conn| {
            conn.query_row(
                "SELECT tenant_id, access_token, refresh_token, expires_at, updated_at
                 FROM erp_tokens WHERE tenant_id = ?1",
                params![tenant_id],
                |row| {
                    Ok(ErpTokenRecord {
                        tenant_id: row.get(0)?,
                        access_token: row.get(1)?,
                        refresh_token: row.get(2)?,
                        expires_at: from_millis(3, row.get(3)?)?,
                        updated_at: from_millis(4, row.get(4)?)?,
                    })
                },
            )
            .optional()
            .map_err(map_sql_error)
        })
        .await
    }

    async fn save(&self, record: &ErpTokenRecord) -> DomainResult<()> {
        let record = record.clone();
        run_blocking(&self.db, move |conn| {
            conn.execute(
                "INSERT INTO erp_tokens (tenant_id, access_token, refresh_token, expires_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT (tenant_id) DO UPDATE SET
                    access_token = excluded.access_token,
                    refresh_token = excluded.refresh_token,
                    expires_at = excluded.expires_at,
                    updated_at = excluded.updated_at",
                params![
                    record.tenant_id,
                    record.access_token,
                    record.refresh_token,
                    to_millis(record.expires_at),
                    to_millis(record.updated_at),
                ],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
    }
}
