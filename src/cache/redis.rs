//! Redis cache store

use super::CacheStore;
use crate::error::{EnricherError, Result};
use async_trait::async_trait;
use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::{Pool, PooledConnection};
use bb8_redis::redis;
use std::time::Duration;

/// Redis store behind a bb8 connection pool
///
/// Every connection or command failure surfaces as `CacheUnavailable`;
/// callers never fall back to uncached operation.
pub struct RedisCacheStore {
    pool: Pool<RedisConnectionManager>,
}

impl RedisCacheStore {
    /// Connect and verify the server is reachable
    pub async fn connect(url: &str, pool_size: u32) -> Result<Self> {
        let manager = RedisConnectionManager::new(url).map_err(unavailable)?;
        let pool = Pool::builder()
            .max_size(pool_size.max(1))
            .build(manager)
            .await
            .map_err(unavailable)?;

        let store = Self { pool };
        store.ping().await?;
        tracing::info!(pool_size = pool_size, "Connected to Redis cache");
        Ok(store)
    }

    async fn connection(&self) -> Result<PooledConnection<'_, RedisConnectionManager>> {
        self.pool.get().await.map_err(unavailable)
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.connection().await?;
        redis::cmd("PING")
            .query_async::<String>(&mut *conn)
            .await
            .map_err(unavailable)?;
        Ok(())
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection().await?;
        redis::cmd("GET")
            .arg(key)
            .query_async::<Option<String>>(&mut *conn)
            .await
            .map_err(unavailable)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.connection().await?;
        redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(ttl.as_secs().max(1))
            .query_async::<()>(&mut *conn)
            .await
            .map_err(unavailable)
    }
}

fn unavailable(err: impl std::fmt::Display) -> EnricherError {
    EnricherError::CacheUnavailable(err.to_string())
}
