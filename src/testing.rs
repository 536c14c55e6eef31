//! In-crate test doubles for the cache and upstream collaborators

use crate::cache::{CacheStore, MemoryCacheStore};
use crate::error::{EnricherError, Result};
use crate::upstream::RecordQuery;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Memory store that counts every call
#[derive(Default)]
pub struct CountingCache {
    pub store: MemoryCacheStore,
    gets: AtomicUsize,
    sets: AtomicUsize,
}

impl CountingCache {
    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CacheStore for CountingCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.store.get(key).await
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.store.set_ex(key, value, ttl).await
    }
}

/// Store whose every call fails as if the server were gone
pub struct DeadCache;

#[async_trait]
impl CacheStore for DeadCache {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(EnricherError::CacheUnavailable("connection refused".to_string()))
    }

    async fn set_ex(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<()> {
        Err(EnricherError::CacheUnavailable("connection refused".to_string()))
    }
}

/// Upstream answering from a fixed table and recording every query
#[derive(Default)]
pub struct ScriptedUpstream {
    names: DashMap<(String, String), String>,
    delays: DashMap<String, Duration>,
    failing: DashMap<String, String>,
    queries: Mutex<Vec<(String, String)>>,
}

impl ScriptedUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(self, record_type: &str, id: &str, name: &str) -> Self {
        self.names
            .insert((record_type.to_string(), id.to_string()), name.to_string());
        self
    }

    /// Answer queries for `id` only after `delay`
    pub fn with_delay(self, id: &str, delay: Duration) -> Self {
        self.delays.insert(id.to_string(), delay);
        self
    }

    /// Fail queries for `id` with `message`
    pub fn with_failure(self, id: &str, message: &str) -> Self {
        self.failing.insert(id.to_string(), message.to_string());
        self
    }

    pub fn queries(&self) -> Vec<(String, String)> {
        self.queries.lock().unwrap().clone()
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl RecordQuery for ScriptedUpstream {
    async fn query_name(&self, record_type: &str, id: &str) -> Result<Option<String>> {
        self.queries
            .lock()
            .unwrap()
            .push((record_type.to_string(), id.to_string()));

        let delay = self.delays.get(id).map(|d| *d);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = self.failing.get(id) {
            return Err(EnricherError::UpstreamQuery(message.clone()));
        }

        Ok(self
            .names
            .get(&(record_type.to_string(), id.to_string()))
            .map(|name| name.clone()))
    }
}
