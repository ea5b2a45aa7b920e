//! Append-only timeline storage.

use std::sync::Arc;

use async_trait::async_trait;
use procura_core::TimelineRecorder;
use procura_domain::{Result as DomainResult, TimelineEvent};
use rusqlite::{params, Row};

use super::columns::{from_millis, map_sql_error, parse_text, run_blocking, to_millis};
use super::manager::DbManager;

pub struct SqliteTimelineRepository {
    db: Arc<DbManager>,
}

impl SqliteTimelineRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TimelineRecorder for SqliteTimelineRepository {
    async fn append(&self, event: &TimelineEvent) -> DomainResult<()> {
        let event = event.clone();
        run_blocking(&self.db, move |conn| {
            conn.execute(
                "INSERT INTO timeline_events (
                    id, tenant_id, order_id, event_type, description, actor_role, actor_name,
                    sync_warning, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    event.id,
                    event.tenant_id,
                    event.order_id,
                    event.event_type.to_string(),
                    event.description,
                    event.actor_role.to_string(),
                    event.actor_name,
                    event.sync_warning,
                    to_millis(event.created_at),
                ],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
    }

    async fn list_for_order(&self, tenant_id: &str, order_id: &str) -> DomainResult<Vec<TimelineEvent>> {
        let (tenant_id, order_id) = (tenant_id.to_string(), order_id.to_string());
        run_blocking(&self.db, move |conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, tenant_id, order_id, event_type, description, actor_role,
                            actor_name, sync_warning, created_at
                     FROM timeline_events
                     WHERE tenant_id = ?1 AND order_id = ?2
                     ORDER BY created_at ASC, id ASC",
                )
                .map_err(map_sql_error)?;
            let events = stmt
                .query_map(params![tenant_id, order_id], map_event_row)
                .map_err(map_sql_error)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(map_sql_error)?;
            Ok(events)
        })
        .await
    }
}

fn map_event_row(row: &Row<'_>) -> rusqlite::Result<TimelineEvent> {
    let event_type: String = row.get(3)?;
    let actor_role: String = row.get(5)?;
    Ok(TimelineEvent {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        order_id: row.get(2)?,
        event_type: parse_text(3, &event_type)?,
        description: row.get(4)?,
        actor_role: parse_text(5, &actor_role)?,
        actor_name: row.get(6)?,
        sync_warning: row.get(7)?,
        created_at: from_millis(8, row.get(8)?)?,
    })
}
