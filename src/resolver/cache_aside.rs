//! Cache-aside resolver

use super::types::{NameSource, Resolution, ResolutionRequest, context_key_for};
use crate::cache::CacheStore;
use crate::error::{EnricherError, Result};
use crate::upstream::RecordQuery;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Expiry applied to every cache write
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Cache keys are `{prefix}:{id}`
pub const DEFAULT_KEY_PREFIX: &str = "cache";

/// Resolver statistics for monitoring
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResolverStats {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub upstream_queries: u64,
    pub upstream_empty: u64,
    pub payload_writes: u64,
    pub errors: u64,
}

/// Resolves identifiers to display names through the cache store
///
/// The cache key is derived from the identifier only, never the type: two
/// requests for the same id under different types share one slot, and the
/// first name written wins until it expires. Identifiers are globally
/// unique in the source system.
///
/// Concurrent misses on a cold key may both query upstream and both write;
/// the writes carry the same value.
pub struct Resolver {
    /// Shared cache store
    cache: Arc<dyn CacheStore>,

    /// System of record
    upstream: Arc<dyn RecordQuery>,

    /// Expiry for every write
    ttl: Duration,

    key_prefix: String,

    stats: Arc<RwLock<ResolverStats>>,
}

impl Resolver {
    /// Create a resolver with the default 24-hour expiry
    pub fn new(cache: Arc<dyn CacheStore>, upstream: Arc<dyn RecordQuery>) -> Self {
        Self::with_options(cache, upstream, DEFAULT_TTL, DEFAULT_KEY_PREFIX)
    }

    /// Create a resolver with custom expiry and key prefix
    pub fn with_options(
        cache: Arc<dyn CacheStore>,
        upstream: Arc<dyn RecordQuery>,
        ttl: Duration,
        key_prefix: impl Into<String>,
    ) -> Self {
        let key_prefix = key_prefix.into();
        tracing::info!(
            ttl_secs = ttl.as_secs(),
            key_prefix = %key_prefix,
            "Creating cache-aside resolver"
        );

        Self {
            cache,
            upstream,
            ttl,
            key_prefix,
            stats: Arc::new(RwLock::new(ResolverStats::default())),
        }
    }

    /// Cache key for an identifier
    pub fn cache_key(&self, id: &str) -> String {
        format!("{}:{}", self.key_prefix, id)
    }

    /// Resolve one request
    ///
    /// Returns `Ok(None)` when upstream has no such record; that is not an
    /// error and the caller simply leaves the key out of the context.
    pub async fn resolve(&self, request: &ResolutionRequest) -> Result<Option<Resolution>> {
        match self.resolve_inner(request).await {
            Ok(resolution) => Ok(resolution),
            Err(e) => {
                self.stats.write().await.errors += 1;
                tracing::warn!(
                    id = ?request.id,
                    record_type = ?request.record_type,
                    error = %e,
                    "Resolution failed"
                );
                Err(e)
            }
        }
    }

    async fn resolve_inner(&self, request: &ResolutionRequest) -> Result<Option<Resolution>> {
        let id = required(request.id.as_deref(), "id")?;
        let record_type = required(request.record_type.as_deref(), "type")?;

        let cache_key = self.cache_key(id);
        let context_key = context_key_for(record_type);

        // Check cache first
        if let Some(value) = self.cache.get(&cache_key).await? {
            self.stats.write().await.cache_hits += 1;
            tracing::trace!(
                id = %id,
                context_key = %context_key,
                value = %value,
                "Name cache hit"
            );
            return Ok(Some(Resolution {
                key: context_key,
                value,
            }));
        }

        self.stats.write().await.cache_misses += 1;

        let value = match &request.source {
            NameSource::Payload(Some(value)) => {
                tracing::debug!(
                    id = %id,
                    context_key = %context_key,
                    "Name cache miss, caching payload value"
                );
                self.stats.write().await.payload_writes += 1;
                value.clone()
            }
            NameSource::Payload(None) => {
                return Err(EnricherError::InvalidArgument(format!(
                    "No payload value to cache for {} {}",
                    record_type, id
                )));
            }
            NameSource::Upstream => {
                tracing::debug!(
                    id = %id,
                    record_type = %record_type,
                    "Name cache miss, querying upstream"
                );
                self.stats.write().await.upstream_queries += 1;

                match self.upstream.query_name(record_type, id).await? {
                    Some(name) => name,
                    None => {
                        self.stats.write().await.upstream_empty += 1;
                        tracing::debug!(
                            id = %id,
                            record_type = %record_type,
                            "Upstream returned no record"
                        );
                        return Ok(None);
                    }
                }
            }
        };

        self.cache.set_ex(&cache_key, &value, self.ttl).await?;
        tracing::info!(
            id = %id,
            context_key = %context_key,
            "Resolved and cached name"
        );

        Ok(Some(Resolution {
            key: context_key,
            value,
        }))
    }

    /// Get resolver statistics
    pub async fn get_stats(&self) -> ResolverStats {
        self.stats.read().await.clone()
    }

    /// Log resolver statistics (for periodic monitoring)
    pub async fn log_stats(&self) {
        let stats = self.get_stats().await;

        let lookups = stats.cache_hits + stats.cache_misses;
        let hit_rate = if lookups > 0 {
            (stats.cache_hits as f32 / lookups as f32 * 100.0) as u32
        } else {
            0
        };

        tracing::info!(
            cache_hits = stats.cache_hits,
            cache_misses = stats.cache_misses,
            hit_rate = hit_rate,
            upstream_queries = stats.upstream_queries,
            upstream_empty = stats.upstream_empty,
            payload_writes = stats.payload_writes,
            errors = stats.errors,
            "Resolver statistics"
        );
    }
}

/// Empty strings count as missing, unlike a bare null check
fn required<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(EnricherError::InvalidArgument(format!(
            "Resolution requires `{}`",
            name
        ))),
    }
}
