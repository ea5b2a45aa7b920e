//! Column encoding helpers shared by the repositories.
//!
//! Money is stored as TEXT so no precision is lost, timestamps as epoch
//! milliseconds.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use procura_domain::{ProcuraError, Result as DomainResult};
use rust_decimal::Decimal;
use rusqlite::types::Type;
use tokio::task;

use super::manager::DbManager;
use super::pool::PooledConnection;
use crate::errors::InfraError;

/// Run blocking SQLite work on the blocking pool with a pooled connection.
pub(crate) async fn run_blocking<T, F>(db: &Arc<DbManager>, work: F) -> DomainResult<T>
where
    F: FnOnce(&mut PooledConnection) -> DomainResult<T> + Send + 'static,
    T: Send + 'static,
{
    let db = Arc::clone(db);
    task::spawn_blocking(move || -> DomainResult<T> {
        let mut conn = db.get_connection()?;
        work(&mut conn)
    })
    .await
    .map_err(map_join_error)?
}

pub(crate) fn map_sql_error(err: rusqlite::Error) -> ProcuraError {
    ProcuraError::from(InfraError::from(err))
}

pub(crate) fn map_join_error(err: task::JoinError) -> ProcuraError {
    if err.is_cancelled() {
        ProcuraError::Internal("database task cancelled".into())
    } else {
        ProcuraError::Internal(format!("database task panic: {err}"))
    }
}

pub(crate) fn to_millis(value: DateTime<Utc>) -> i64 {
    value.timestamp_millis()
}

pub(crate) fn from_millis(idx: usize, millis: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Integer,
            format!("timestamp {millis} out of range").into(),
        )
    })
}

pub(crate) fn parse_decimal(idx: usize, raw: &str) -> rusqlite::Result<Decimal> {
    Decimal::from_str(raw)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

/// Parse a TEXT column through the type's `FromStr`.
pub(crate) fn parse_text<T>(idx: usize, raw: &str) -> rusqlite::Result<T>
where
    T: FromStr<Err = String>,
{
    raw.parse::<T>()
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, err.into()))
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}

pub(crate) fn int_to_bool(value: i64) -> bool {
    value != 0
}

pub(crate) fn usize_to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

pub(crate) fn int_to_u32(idx: usize, value: i64) -> rusqlite::Result<u32> {
    u32::try_from(value).map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Integer, Box::new(err))
    })
}
