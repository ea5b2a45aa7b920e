//! Database implementations

pub(crate) mod columns;
pub mod manager;
pub mod order_repository;
pub mod party_repository;
pub mod pool;
pub mod proposal_repository;
pub mod timeline_repository;
pub mod token_repository;

pub use manager::DbManager;
pub use order_repository::SqliteOrderRepository;
pub use party_repository::SqlitePartyRepository;
pub use pool::{create_pool, PoolConfig, PooledConnection, SqlitePool};
pub use proposal_repository::SqliteProposalRepository;
pub use timeline_repository::SqliteTimelineRepository;
pub use token_repository::SqliteTokenRepository;
