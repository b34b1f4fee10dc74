use std::collections::HashMap;
use std::sync::RwLock;

use sqlx::mysql::MySqlPoolOptions;
use sqlx::MySqlPool;

use crate::config::Settings;
use crate::error::{AppError, AppResult};

/// Lazily-built MySQL connection pools: one for the global database, and a
/// small tenant-keyed map built on first use per `db_name`.
///
/// Pools are capped at a low `max_connections` to honor the minimal-pooling
/// policy documented for this deployment: the target environment enforces a
/// tight simultaneous-connection ceiling, so this is sized to stay well
/// under it rather than to maximize throughput.
pub struct DbManager {
    settings: Settings,
    global_pool: MySqlPool,
    tenant_pools: RwLock<HashMap<String, MySqlPool>>,
}

const TENANT_POOL_MAX_CONNECTIONS: u32 = 4;
const GLOBAL_POOL_MAX_CONNECTIONS: u32 = 4;

impl DbManager {
    pub async fn connect(settings: Settings) -> AppResult<Self> {
        let global_pool = MySqlPoolOptions::new()
            .max_connections(GLOBAL_POOL_MAX_CONNECTIONS)
            .connect(&settings.global_db_url())
            .await
            .map_err(|e| AppError::SourceUnavailable(format!("global db connect failed: {e}")))?;

        Ok(Self {
            settings,
            global_pool,
            tenant_pools: RwLock::new(HashMap::new()),
        })
    }

    pub fn global_pool(&self) -> &MySqlPool {
        &self.global_pool
    }

    /// Returns the pool for `db_name`, creating and caching it on first use.
    pub async fn tenant_pool(&self, db_name: &str) -> AppResult<MySqlPool> {
        if let Some(pool) = self.tenant_pools.read().unwrap().get(db_name) {
            return Ok(pool.clone());
        }

        let pool = MySqlPoolOptions::new()
            .max_connections(TENANT_POOL_MAX_CONNECTIONS)
            .connect(&self.settings.tenant_db_url(db_name))
            .await
            .map_err(|e| {
                AppError::SourceUnavailable(format!("tenant db '{db_name}' connect failed: {e}"))
            })?;

        self.tenant_pools
            .write()
            .unwrap()
            .insert(db_name.to_string(), pool.clone());

        Ok(pool)
    }
}
