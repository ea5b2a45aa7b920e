//! SQLite connection pool
//!
//! r2d2 pool over `rusqlite` connections. Every connection handed out has the
//! same pragmas applied.

use std::path::Path;
use std::time::Duration;

use procura_domain::{DatabaseConfig, ProcuraError, Result as DomainResult};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use tracing::{info, instrument, warn};

use crate::errors::InfraError;

pub type SqlitePool = Pool<SqliteConnectionManager>;
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Pool tuning derived from [`DatabaseConfig`].
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub max_size: u32,
    pub connection_timeout: Duration,
    pub busy_timeout: Duration,
    pub enable_wal: bool,
    pub enable_foreign_keys: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_size: 8,
            connection_timeout: Duration::from_secs(5),
            busy_timeout: Duration::from_millis(5_000),
            enable_wal: true,
            enable_foreign_keys: true,
        }
    }
}

impl From<&DatabaseConfig> for PoolConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            max_size: config.pool_size.max(1),
            busy_timeout: Duration::from_millis(config.busy_timeout_ms),
            ..Self::default()
        }
    }
}

/// Build a pool for the database at `path`, creating the file if needed.
#[instrument(skip(config), fields(db_path = ?path, pool_size = config.max_size))]
pub fn create_pool(path: &Path, config: &PoolConfig) -> DomainResult<SqlitePool> {
    let pragmas = config.clone();
    let manager = SqliteConnectionManager::file(path)
        .with_init(move |conn| apply_connection_pragmas(conn, &pragmas));

    let pool = Pool::builder()
        .max_size(config.max_size)
        .connection_timeout(config.connection_timeout)
        .build(manager)
        .map_err(|err| {
            warn!(error = %err, "Failed to create connection pool");
            ProcuraError::from(InfraError::from(err))
        })?;

    info!("SQLite connection pool created");
    Ok(pool)
}

/// Apply connection-level pragmas:
/// - WAL journal for concurrent readers
/// - NORMAL synchronous mode
/// - foreign key enforcement
/// - busy timeout for lock contention
pub fn apply_connection_pragmas(conn: &Connection, config: &PoolConfig) -> rusqlite::Result<()> {
    let mut pragma_sql = String::new();

    if config.enable_wal {
        pragma_sql.push_str("PRAGMA journal_mode=WAL;\n");
        pragma_sql.push_str("PRAGMA wal_autocheckpoint=1000;\n");
    }
    pragma_sql.push_str("PRAGMA synchronous=NORMAL;\n");
    if config.enable_foreign_keys {
        pragma_sql.push_str("PRAGMA foreign_keys=ON;\n");
    }

    conn.execute_batch(&pragma_sql)?;
    conn.busy_timeout(config.busy_timeout)
}
