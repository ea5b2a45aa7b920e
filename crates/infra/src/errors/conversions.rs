//! Mapping of SQLite, pool and transport failures onto [`ProcuraError`].
//!
//! HTTP status codes are not handled here: nothing calls `error_for_status`,
//! the ERP client classifies answers itself (see `ErpError::from_status`).

use procura_domain::ProcuraError;
use rusqlite::ffi::ErrorCode;

// SQLITE_CONSTRAINT_UNIQUE / SQLITE_CONSTRAINT_PRIMARYKEY
const UNIQUE_VIOLATION: [i32; 2] = [2067, 1555];
const FOREIGN_KEY_VIOLATION: i32 = 787;

/// Infrastructure-side wrapper so the foreign `From` impls live in this crate.
#[derive(Debug)]
pub struct InfraError(pub ProcuraError);

impl From<InfraError> for ProcuraError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<ProcuraError> for InfraError {
    fn from(value: ProcuraError) -> Self {
        InfraError(value)
    }
}

impl From<rusqlite::Error> for InfraError {
    fn from(err: rusqlite::Error) -> Self {
        InfraError(sqlite_error(err))
    }
}

impl From<r2d2::Error> for InfraError {
    fn from(err: r2d2::Error) -> Self {
        InfraError(ProcuraError::Database(format!("no pooled connection available: {err}")))
    }
}

impl From<reqwest::Error> for InfraError {
    fn from(err: reqwest::Error) -> Self {
        InfraError(transport_error(&err))
    }
}

fn sqlite_error(err: rusqlite::Error) -> ProcuraError {
    let (failure, message) = match err {
        rusqlite::Error::SqliteFailure(failure, message) => (failure, message.unwrap_or_default()),
        rusqlite::Error::QueryReturnedNoRows => {
            return ProcuraError::NotFound("no matching row".into());
        }
        other => return ProcuraError::Database(other.to_string()),
    };

    match failure.code {
        ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => {
            ProcuraError::Database(format!("database busy: {message}"))
        }
        ErrorCode::ConstraintViolation if UNIQUE_VIOLATION.contains(&failure.extended_code) => {
            // Only the single-pending index can fire on proposals in practice.
            if message.contains("negotiation_proposals") {
                ProcuraError::Conflict("order already has a pending proposal".into())
            } else {
                ProcuraError::Conflict(format!("duplicate record: {message}"))
            }
        }
        ErrorCode::ConstraintViolation if failure.extended_code == FOREIGN_KEY_VIOLATION => {
            ProcuraError::Database(format!("dangling reference: {message}"))
        }
        code => ProcuraError::Database(format!(
            "sqlite {code:?} ({}): {message}",
            failure.extended_code
        )),
    }
}

fn transport_error(err: &reqwest::Error) -> ProcuraError {
    if err.is_timeout() {
        ProcuraError::Network("request timed out".into())
    } else if err.is_connect() {
        ProcuraError::Network("connection failed".into())
    } else if err.is_builder() {
        ProcuraError::Internal(format!("malformed request: {err}"))
    } else {
        ProcuraError::Network(err.to_string())
    }
}
