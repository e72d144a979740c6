use redis::aio::ConnectionManager;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Two-tier cache for candidate-set snapshots
///
/// L1 is an in-process moka cache, L2 is Redis shared across instances.
/// Both tiers expire entries after the configured TTL, so CRM edits become
/// visible to matching at the latest one TTL later (or immediately after an
/// explicit invalidation).
pub struct CacheManager {
    redis: Arc<tokio::sync::Mutex<ConnectionManager>>,
    l1_cache: moka::future::Cache<String, Arc<Vec<u8>>>,
    ttl_secs: u64,
}

impl CacheManager {
    pub async fn new(redis_url: &str, l1_size: u64, ttl_secs: u64) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = ConnectionManager::new(client).await?;

        let l1_cache = moka::future::CacheBuilder::new(l1_size)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Ok(Self {
            redis: Arc::new(tokio::sync::Mutex::new(redis)),
            l1_cache,
            ttl_secs,
        })
    }

    /// Get a value from cache (L1 first, then L2); `None` on a miss
    pub async fn get<T>(&self, key: &str) -> Result<Option<T>, CacheError>
    where
        T: DeserializeOwned,
    {
        if let Some(bytes) = self.l1_cache.get(key).await {
            tracing::trace!("L1 cache hit: {}", key);
            return Ok(Some(serde_json::from_slice(&bytes)?));
        }

        let mut conn = self.redis.lock().await;
        let value: Option<Vec<u8>> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut *conn)
            .await?;
        drop(conn);

        match value {
            Some(bytes) => {
                tracing::trace!("L2 cache hit: {}", key);
                let parsed = serde_json::from_slice(&bytes)?;
                self.l1_cache.insert(key.to_string(), Arc::new(bytes)).await;
                Ok(Some(parsed))
            }
            None => {
                tracing::trace!("Cache miss: {}", key);
                Ok(None)
            }
        }
    }

    /// Set a value in both tiers
    pub async fn set<T>(&self, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let bytes = serde_json::to_vec(value)?;

        let mut conn = self.redis.lock().await;
        let _: () = redis::cmd("SETEX")
            .arg(key)
            .arg(self.ttl_secs)
            .arg(bytes.as_slice())
            .query_async(&mut *conn)
            .await?;
        drop(conn);

        self.l1_cache.insert(key.to_string(), Arc::new(bytes)).await;

        tracing::trace!("Cache set: {}", key);
        Ok(())
    }

    /// Drop every snapshot under the service namespace
    pub async fn invalidate_all(&self) -> Result<u64, CacheError> {
        self.l1_cache.invalidate_all();

        let mut conn = self.redis.lock().await;
        let mut cursor: u64 = 0;
        let mut removed = 0u64;

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(CacheKey::pattern())
                .arg("COUNT")
                .arg(500)
                .query_async(&mut *conn)
                .await?;

            if !keys.is_empty() {
                let deleted: u64 = redis::cmd("DEL")
                    .arg(&keys)
                    .query_async(&mut *conn)
                    .await?;
                removed += deleted;
            }

            cursor = next;
            if cursor == 0 {
                break;
            }
        }

        tracing::debug!("Invalidated {} cached snapshots", removed);
        Ok(removed)
    }
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    const NAMESPACE: &'static str = "estate-match";

    /// Snapshot of all active listings
    pub fn active_properties() -> String {
        format!("{}:properties:active", Self::NAMESPACE)
    }

    /// Snapshot of all active purchase profiles
    pub fn active_profiles() -> String {
        format!("{}:profiles:active", Self::NAMESPACE)
    }

    /// Snapshot of one client's purchase profiles
    pub fn client_profiles(client_id: &str) -> String {
        format!("{}:profiles:client:{}", Self::NAMESPACE, client_id)
    }

    pub fn pattern() -> String {
        format!("{}:*", Self::NAMESPACE)
    }
}
