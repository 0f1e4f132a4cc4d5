use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::environment::EnvironmentVariables;
use crate::database::connection::{ConnectionKey, ConnectionProfile};
use crate::database::lru::LruMap;
use crate::database::products::{self, Product};
use crate::utils::errors::LookupError;

const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(300);

/// Database access for product lookups.
/// Holds a bounded cache of pools keyed by connection target (host, port, database, user).
/// With a cache capacity of 0 each lookup opens and closes its own pool.
#[derive(Clone, Debug)]
pub struct DatabaseService {
    /// The lock guards map operations only; it is never held across network I/O
    pools: Arc<Mutex<LruMap<ConnectionKey, PgPool>>>,
    /// Environment configuration
    config: Arc<EnvironmentVariables>,
}

impl DatabaseService {
    /// Creates an empty service. Pools are opened lazily on first use.
    pub fn new(config: Arc<EnvironmentVariables>) -> Self {
        Self {
            pools: Arc::new(Mutex::new(LruMap::new(config.pool_cache_capacity))),
            config,
        }
    }

    /// Runs the product listing against the given target
    pub async fn fetch_products(&self, profile: &ConnectionProfile) -> Result<Vec<Product>, LookupError> {
        let key: ConnectionKey = profile.key();
        let target: String = key.to_string();

        if !self.config.is_pooled() {
            let pool: PgPool = self.create_pool(profile).await?;
            let result = products::fetch_products(&pool, &target, self.query_timeout()).await;
            pool.close().await;
            return result;
        }

        let pool: PgPool = self.get_pool(profile).await?;
        let result = products::fetch_products(&pool, &target, self.query_timeout()).await;

        match result {
            // A busy pool is still a healthy pool
            Err(LookupError::Connection {
                source: sqlx::Error::PoolTimedOut,
                ..
            }) if self.is_saturated(&pool) => {
                warn!(
                    "All {} connections of a cached pool are busy, keeping the pool",
                    pool.size()
                );
                Err(LookupError::PoolSaturated { target })
            }
            // Don't keep a pool around for a backend that just dropped us
            Err(err) if err.is_connection() => {
                self.close_pool(&key).await;
                Err(err)
            }
            other => other,
        }
    }

    /// Gets or creates the pool for the profile's connection target
    pub async fn get_pool(&self, profile: &ConnectionProfile) -> Result<PgPool, LookupError> {
        let key: ConnectionKey = profile.key();

        // Check for existing pool
        {
            let mut pools = self.pools.lock().await;
            let cached: Option<PgPool> = pools.get(&key).cloned();
            match cached {
                Some(pool) if !pool.is_closed() => {
                    debug!("Reusing existing pool for: {}", key);
                    return Ok(pool);
                }
                Some(_) => {
                    warn!("Cached pool exists but is closed. Will recreate.");
                    debug!("Recreating closed pool for: {}", key);
                    pools.remove(&key);
                }
                None => {}
            }
        }

        debug!("Creating new pool for: {}", key);
        let pool: PgPool = self.create_pool(profile).await?;

        // Store the pool
        let mut pools = self.pools.lock().await;

        // Another request may have connected to the same target in the meantime
        let raced: Option<PgPool> = pools.get(&key).filter(|p| !p.is_closed()).cloned();
        if let Some(existing) = raced {
            drop(pools);
            debug!("Pool for {} was created concurrently, discarding duplicate", key);
            pool.close().await;
            return Ok(existing);
        }

        if let Some((evicted_key, evicted)) = pools.insert(key.clone(), pool.clone()) {
            debug!("Evicting pool for: {}", evicted_key);
            tokio::spawn(async move {
                evicted.close().await;
            });
        }

        info!(
            "Pool initialized successfully ({} of {} cache slots used)",
            pools.len(),
            self.config.pool_cache_capacity
        );
        Ok(pool)
    }

    /// Removes the pool for one target and closes it in the background
    pub async fn close_pool(&self, key: &ConnectionKey) {
        let removed: Option<PgPool> = self.pools.lock().await.remove(key);
        if let Some(pool) = removed {
            debug!("Closing pool for '{}'...", key);
            tokio::spawn(async move {
                pool.close().await;
            });
        }
    }

    /// Lists cached targets, least recently used first
    pub async fn list_active_pools(&self) -> Vec<String> {
        let pools = self.pools.lock().await;
        pools.keys().map(ToString::to_string).collect()
    }

    /// Closes every cached pool. Called once during application shutdown.
    pub async fn shutdown(&self) {
        info!("Initiating DatabaseService shutdown...");
        debug!("Cached pools at shutdown: {:?}", self.list_active_pools().await);

        let drained: Vec<(ConnectionKey, PgPool)> = self.pools.lock().await.drain();
        info!("Closing {} cached pools", drained.len());
        for (key, pool) in drained {
            debug!("Closing pool for '{}'...", key);
            pool.close().await;
        }

        info!("DatabaseService shutdown completed");
    }

    /// True when every connection the pool may open is checked out
    fn is_saturated(&self, pool: &PgPool) -> bool {
        pool.size() >= self.config.db_max_connections && pool.num_idle() == 0
    }

    fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.config.db_query_timeout_seconds)
    }

    /// Opens a pool and proves it with one live connection.
    /// Connection failures never reach the cache.
    async fn create_pool(&self, profile: &ConnectionProfile) -> Result<PgPool, LookupError> {
        PgPoolOptions::new()
            .max_connections(self.config.db_max_connections)
            .min_connections(0)
            .acquire_timeout(Duration::from_secs(self.config.db_connect_timeout_seconds))
            .idle_timeout(POOL_IDLE_TIMEOUT)
            .connect_with(profile.connect_options())
            .await
            .map_err(|source| LookupError::Connection {
                target: profile.key().to_string(),
                source,
            })
    }
}
