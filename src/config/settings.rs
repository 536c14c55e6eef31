use crate::error::{EnricherError, Result};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Settings {
    pub cache: CacheConfig,
    pub salesforce: SalesforceConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheBackend {
    Redis { url: String, pool_size: u32 },
    Memory,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    pub ttl_secs: u64,
    pub key_prefix: String,

    /// How often the in-process store drops expired entries
    pub cleanup_interval_secs: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs.max(1))
    }
}

#[derive(Debug, Clone)]
pub struct SalesforceConfig {
    pub instance_url: String,
    pub access_token: String,
    pub api_version: String,
    pub timeout_secs: u64,
}

pub fn load_settings() -> Result<Settings> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    settings_from_lookup(|key| std::env::var(key).ok())
}

/// Build settings from an arbitrary key lookup (the process environment in production)
pub fn settings_from_lookup<F>(lookup: F) -> Result<Settings>
where
    F: Fn(&str) -> Option<String>,
{
    let required = |key: &str| {
        lookup(key)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| EnricherError::Config(format!("{} not set", key)))
    };
    let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

    // Load cache config
    let backend = match or_default("CACHE_BACKEND", "redis").to_lowercase().as_str() {
        "redis" => CacheBackend::Redis {
            url: required("REDIS_URL")?,
            pool_size: or_default("REDIS_POOL_SIZE", "16")
                .parse()
                .map_err(|_| EnricherError::Config("Invalid REDIS_POOL_SIZE".to_string()))?,
        },
        "memory" => CacheBackend::Memory,
        other => {
            return Err(EnricherError::Config(format!(
                "Unknown CACHE_BACKEND: {}",
                other
            )));
        }
    };

    let cache = CacheConfig {
        backend,
        ttl_secs: or_default("CACHE_TTL_SECS", "86400")
            .parse()
            .map_err(|_| EnricherError::Config("Invalid CACHE_TTL_SECS".to_string()))?,
        key_prefix: or_default("CACHE_KEY_PREFIX", "cache"),
        cleanup_interval_secs: or_default("CACHE_CLEANUP_INTERVAL_SECS", "300")
            .parse()
            .map_err(|_| {
                EnricherError::Config("Invalid CACHE_CLEANUP_INTERVAL_SECS".to_string())
            })?,
    };

    // Load Salesforce config
    let salesforce = SalesforceConfig {
        instance_url: required("SALESFORCE_INSTANCE_URL")?
            .trim_end_matches('/')
            .to_string(),
        access_token: required("SALESFORCE_ACCESS_TOKEN")?,
        api_version: or_default("SALESFORCE_API_VERSION", "v59.0"),
        timeout_secs: or_default("UPSTREAM_TIMEOUT_SECS", "30")
            .parse()
            .map_err(|_| EnricherError::Config("Invalid UPSTREAM_TIMEOUT_SECS".to_string()))?,
    };

    Ok(Settings { cache, salesforce })
}
