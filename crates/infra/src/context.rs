//! Application context - dependency injection container

use std::sync::Arc;

use procura_core::{NegotiationPorts, NegotiationService};
use procura_domain::{Config, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::database::columns::map_join_error;
use crate::database::{
    DbManager, SqliteOrderRepository, SqlitePartyRepository, SqliteProposalRepository,
    SqliteTimelineRepository, SqliteTokenRepository,
};
use crate::integrations::erp::{
    ErpAuthClient, ErpError, ErpStatusClient, ErpStatusSyncAdapter, ErpTokenManager,
};
use crate::{config, observability};

/// Application context - holds the negotiation service and its adapters
pub struct AppContext {
    pub config: Config,
    pub db: Arc<DbManager>,
    pub negotiation: Arc<NegotiationService>,
    pub parties: Arc<SqlitePartyRepository>,
    /// `None` when ERP sync is disabled.
    pub erp_tokens: Option<Arc<ErpTokenManager>>,
    erp_client: Option<Arc<ErpStatusClient>>,
}

/// Component reachability snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub database: bool,
    /// `None` when ERP sync is disabled.
    pub erp: Option<bool>,
}

impl AppContext {
    /// Load configuration, install logging and build the context.
    pub async fn from_env() -> Result<Self> {
        let config = config::load()?;
        observability::logging::init(&config.logging);
        Self::new(config).await
    }

    /// Build the context from an explicit configuration.
    pub async fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let db_config = config.database.clone();
        let db = tokio::task::spawn_blocking(move || -> Result<DbManager> {
            let manager = DbManager::from_config(&db_config)?;
            manager.run_migrations()?;
            Ok(manager)
        })
        .await
        .map_err(map_join_error)??;
        let db = Arc::new(db);

        let parties = Arc::new(SqlitePartyRepository::new(Arc::clone(&db)));

        let (erp_sync, erp_tokens, erp_client) = if config.erp.enabled {
            let tokens = Arc::new(ErpTokenManager::new(
                Arc::new(SqliteTokenRepository::new(Arc::clone(&db))),
                ErpAuthClient::new(&config.erp).map_err(ErpError::into_domain_error)?,
                config.erp.refresh_buffer_secs,
            ));
            let client =
                Arc::new(ErpStatusClient::new(&config.erp).map_err(ErpError::into_domain_error)?);
            let adapter =
                ErpStatusSyncAdapter::new(Arc::clone(&tokens), Arc::clone(&client), &config.erp);
            (adapter, Some(tokens), Some(client))
        } else {
            info!("ERP sync disabled; status pushes will be skipped");
            (ErpStatusSyncAdapter::disabled(), None, None)
        };

        let ports = NegotiationPorts {
            orders: Arc::new(SqliteOrderRepository::new(Arc::clone(&db))),
            proposals: Arc::new(SqliteProposalRepository::new(Arc::clone(&db))),
            timeline: Arc::new(SqliteTimelineRepository::new(Arc::clone(&db))),
            erp: Arc::new(erp_sync),
            parties: Arc::clone(&parties) as _,
        };
        let negotiation = Arc::new(NegotiationService::new(ports, config.negotiation.clone()));

        info!(
            db_path = %db.path().display(),
            erp_enabled = config.erp.enabled,
            "procura context ready"
        );

        Ok(Self { config, db, negotiation, parties, erp_tokens, erp_client })
    }

    /// Probe the database and, when enabled, the ERP.
    pub async fn health_check(&self) -> HealthReport {
        let db = Arc::clone(&self.db);
        let database = matches!(
            tokio::task::spawn_blocking(move || db.health_check()).await,
            Ok(Ok(()))
        );

        let erp = match &self.erp_client {
            Some(client) => Some(client.check_health().await.unwrap_or_else(|err| {
                warn!(error = %err, "ERP health check errored");
                false
            })),
            None => None,
        };

        HealthReport { database, erp }
    }
}
