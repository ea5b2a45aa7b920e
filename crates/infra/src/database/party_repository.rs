//! Counterpart directory backed by the `parties` table.

use std::sync::Arc;

use async_trait::async_trait;
use procura_core::PartyDirectory;
use procura_domain::{Party, Result as DomainResult};
use rusqlite::{params, OptionalExtension};

use super::columns::{bool_to_int, int_to_bool, map_sql_error, parse_text, run_blocking};
use super::manager::DbManager;

pub struct SqlitePartyRepository {
    db: Arc<DbManager>,
}

impl SqlitePartyRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Insert or update a directory entry.
    pub async fn upsert_party(&self, party: &Party) -> DomainResult<()> {
        let party = party.clone();
        run_blocking(&self.db, move |conn| {
            conn.execute(
                "INSERT INTO parties (tenant_id, id, kind, name, phone, has_account)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT (tenant_id, id) DO UPDATE SET
                    kind = excluded.kind,
                    name = excluded.name,
                    phone = excluded.phone,
                    has_account = excluded.has_account",
                params![
                    party.tenant_id,
                    party.id,
                    party.kind.to_string(),
                    party.name,
                    party.phone,
                    bool_to_int(party.has_account),
                ],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl PartyDirectory for SqlitePartyRepository {
    async fn find_party(&self, tenant_id: &str, party_id: &str) -> DomainResult<Option<Party>> {
        let (tenant_id, party_id) = (tenant_id.to_string(), party_id.to_string());
        run_blocking(&self.db, move |conn| {
            conn.query_row(
                "SELECT id, tenant_id, kind, name, phone, has_account
                 FROM parties WHERE tenant_id = ?1 AND id = ?2",
                params![tenant_id, party_id],
                |row| {
                    let kind: String = row.get(2)?;
                    Ok(Party {
                        id: row.get(0)?,
                        tenant_id: row.get(1)?,
                        kind: parse_text(2, &kind)?,
                        name: row.get(3)?,
                        phone: row.get(4)?,
                        has_account: int_to_bool(row.get(5)?),
                    })
                },
            )
            .optional()
            .map_err(map_sql_error)
        })
        .await
    }
}
