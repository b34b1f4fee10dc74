pub mod cache;
pub mod config;
pub mod data;
pub mod db;
pub mod error;
pub mod filters;
pub mod handlers;
pub mod layout;
pub mod models;
pub mod orchestrator;
pub mod registry;
pub mod widgets;

use std::sync::Arc;

use config::{DashboardConfig, Settings};
use db::DbManager;

/// Shared per-request state: the DB pool manager, the tenant metadata
/// cache, and the operational config loaded from `dashboard.toml`.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbManager>,
    pub cache: Arc<cache::MetadataCache>,
    pub config: Arc<DashboardConfig>,
}

impl AppState {
    pub async fn new(settings: Settings, config: DashboardConfig) -> error::AppResult<Self> {
        let db = DbManager::connect(settings).await?;
        Ok(Self {
            db: Arc::new(db),
            cache: Arc::new(cache::MetadataCache::new()),
            config: Arc::new(config),
        })
    }
}
