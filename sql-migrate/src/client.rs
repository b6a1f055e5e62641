//! Dialect-agnostic connection pool manager (C9).
//!
//! `ClientManager` keeps named `sqlx::AnyPool` handles so a process driving
//! migrations against several databases (e.g. one per tenant, or a
//! primary plus replicas during a replication-safe rollout) doesn't need a
//! pool per call site. Pools are created lazily and reused; `close_all` is
//! the explicit shutdown hook callers invoke before process exit.

use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;

use sqlx::any::{AnyPool, AnyPoolOptions};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{MigrateError, Result};

const DEFAULT_MAX_IDLE: u32 = 5;
const DEFAULT_MAX_OPEN: u32 = 10;
const DEFAULT_MAX_LIFETIME: Duration = Duration::from_secs(600);

fn ensure_drivers_installed() {
    static INSTALLED: OnceLock<()> = OnceLock::new();
    INSTALLED.get_or_init(sqlx::any::install_default_drivers);
}

/// A named database connection this process may need, resolved once at
/// startup via `ClientManager::init_by_config`.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub name: String,
    pub database_url: String,
}

/// Manages named, lazily-created connection pools across dialects.
pub struct ClientManager {
    pools: RwLock<HashMap<String, AnyPool>>,
}

impl Default for ClientManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientManager {
    #[must_use]
    pub fn new() -> Self {
        ensure_drivers_installed();
        Self { pools: RwLock::new(HashMap::new()) }
    }

    /// Returns the pool registered under `name`, if one exists.
    pub async fn get(&self, name: &str) -> Option<AnyPool> {
        self.pools.read().await.get(name).cloned()
    }

    /// Registers `pool` under `name`, atomically closing any prior pool
    /// bound to that name first.
    pub async fn set(&self, name: impl Into<String>, pool: AnyPool) {
        let name = name.into();
        let previous = self.pools.write().await.insert(name, pool);
        if let Some(previous) = previous {
            previous.close().await;
        }
    }

    /// Returns the pool registered under `name`, opening and pinging a new
    /// one against `database_url` if none exists yet.
    pub async fn get_or_create(&self, name: &str, database_url: &str) -> Result<AnyPool> {
        if let Some(pool) = self.get(name).await {
            return Ok(pool);
        }

        info!(connection = name, "opening new connection pool");
        let pool = AnyPoolOptions::new()
            .max_connections(DEFAULT_MAX_OPEN)
            .min_connections(DEFAULT_MAX_IDLE.min(DEFAULT_MAX_OPEN))
            .max_lifetime(DEFAULT_MAX_LIFETIME)
            .connect(database_url)
            .await?;

        Self::ping(&pool).await?;
        self.set(name.to_string(), pool.clone()).await;
        Ok(pool)
    }

    /// Opens and registers a pool for every entry in `configs`, failing on
    /// the first connection that cannot be reached. All-or-nothing: if any
    /// connection fails, every pool opened during this call (and any
    /// pre-existing ones) is closed before the error is returned, so callers
    /// never end up holding a partially-initialized manager.
    pub async fn init_by_config(&self, configs: &[ConnectionConfig]) -> Result<()> {
        for config in configs {
            if let Err(err) = self.get_or_create(&config.name, &config.database_url).await {
                self.close_all().await;
                return Err(err);
            }
        }
        Ok(())
    }

    /// Pings a pool to confirm it is reachable, surfacing connection
    /// failures eagerly instead of at first query time.
    async fn ping(pool: &AnyPool) -> Result<()> {
        sqlx::query("SELECT 1").execute(pool).await?;
        debug!("connection pool responded to liveness check");
        Ok(())
    }

    /// Closes every registered pool.
    pub async fn close_all(&self) {
        let mut pools = self.pools.write().await;
        for (name, pool) in pools.drain() {
            pool.close().await;
            debug!(connection = %name, "closed connection pool");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_or_create_reuses_existing_pool() {
        let manager = ClientManager::new();
        let first = manager.get_or_create("main", "sqlite::memory:").await.unwrap();
        let second = manager.get_or_create("main", "sqlite::memory:").await.unwrap();
        assert!(first.size() > 0 || second.size() > 0);
        manager.close_all().await;
    }

    #[tokio::test]
    async fn unknown_connection_is_none() {
        let manager = ClientManager::new();
        assert!(manager.get("missing").await.is_none());
    }
}
