//! Key-value cache stores used by the resolver
//!
//! - `RedisCacheStore`: shared Redis instance behind a connection pool
//! - `MemoryCacheStore`: in-process store for local runs and tests
//!
//! Both expire entries with the TTL given on every write.

mod memory;
mod redis;

pub use self::memory::MemoryCacheStore;
pub use self::redis::RedisCacheStore;

use crate::config::{CacheBackend, CacheConfig};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Get / set-with-expiry store, safe for concurrent use
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch a live value, `None` when absent or expired
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value that expires after `ttl`
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;
}

/// Build the store selected by configuration
pub async fn connect(config: &CacheConfig) -> Result<Arc<dyn CacheStore>> {
    match &config.backend {
        CacheBackend::Redis { url, pool_size } => {
            let store = RedisCacheStore::connect(url, *pool_size).await?;
            Ok(Arc::new(store))
        }
        CacheBackend::Memory => {
            tracing::warn!("Using in-process cache store, entries are not shared");
            let store = Arc::new(MemoryCacheStore::new());
            store.spawn_purge_task(config.cleanup_interval());
            Ok(store)
        }
    }
}
