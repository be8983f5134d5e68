//! Application context - dependency injection container

use std::path::{Path, PathBuf};
use std::sync::Arc;

use stocksync_core::{InventorySyncService, SyncPorts};
use stocksync_domain::{Config, InventorySyncResult, Result};
use stocksync_infra::config;
use stocksync_infra::{
    alert_transport, CommerceClient, DbManager, RunLock, SqliteSyncStore, StaticTokenProvider,
};
use tracing::info;

/// Resolve the run configuration.
///
/// An explicit file is read as-is with the environment applied on top;
/// otherwise the loader's env-then-probe strategy is used.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            let mut config = config::load_from_file(Some(path.to_path_buf()))?;
            config::apply_env_overrides(&mut config)?;
            Ok(config)
        }
        None => config::load(),
    }
}

/// Application context - holds the wired sync service for one run
pub struct AppContext {
    pub config: Config,
    pub db: Arc<DbManager>,
    pub store: Arc<SqliteSyncStore>,
    service: InventorySyncService,

    // Keep the run lock alive for the lifetime of the context
    _run_lock: RunLock,
}

impl AppContext {
    /// Take the run lock, open the database and wire every adapter.
    pub fn new(config: Config) -> Result<Self> {
        let run_lock = RunLock::acquire(lock_dir(&config.database.path))?;

        let db = Arc::new(DbManager::open(&config.database)?);
        let store = Arc::new(SqliteSyncStore::new(Arc::clone(&db)));
        let commerce = Arc::new(CommerceClient::new(&config.commerce)?);

        let ports = SyncPorts {
            token_provider: Arc::new(StaticTokenProvider::new(&config.owner_store)),
            mappings: store.clone(),
            credentials: store.clone(),
            partner_state: store.clone(),
            sync_logs: store.clone(),
            alerts: alert_transport(&config.alerts)?,
        };
        let service = InventorySyncService::new(commerce, ports, &config.sync);

        info!(
            db_path = %db.path().display(),
            alerts_enabled = config.alerts.enabled,
            api_version = %config.commerce.api_version,
            "app.context_ready"
        );

        Ok(Self { config, db, store, service, _run_lock: run_lock })
    }

    pub async fn run(&self, partner_filter: Option<&str>) -> Result<InventorySyncResult> {
        self.service.run(partner_filter).await
    }
}

/// The lock lives next to the database so runs sharing a database exclude
/// each other.
fn lock_dir(db_path: &str) -> PathBuf {
    Path::new(db_path)
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}
