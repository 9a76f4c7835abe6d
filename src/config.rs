//! Runtime configuration resolved from the environment.

use crate::backend::{RedisAddr, RestCredentials};
use crate::limiter::QuotaTable;
use std::env;
use std::time::Duration;

/// Backend credentials and operational knobs.
///
/// The three credential slots mirror the resolution priority: a hosted REST
/// service needs both URL and token, a direct connection needs only its URL,
/// the triple needs at least a host. Incomplete combinations are left empty
/// and the factory moves on to the next candidate.
#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub rest: Option<RestCredentials>,
    pub redis_url: Option<String>,
    pub redis_addr: Option<RedisAddr>,
    /// Hard ceiling on the health-check round trip (and Redis connect).
    pub health_timeout: Duration,
    /// Per-request timeout for the REST backend's HTTP client.
    pub http_timeout: Duration,
    /// Entry cap for the in-process fallback store.
    pub memory_max_entries: usize,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            rest: None,
            redis_url: None,
            redis_addr: None,
            health_timeout: Duration::from_secs(3),
            http_timeout: Duration::from_secs(10),
            memory_max_entries: 10_000,
        }
    }
}

impl BackendSettings {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let rest = match (non_empty("AI_CACHE_REST_URL"), non_empty("AI_CACHE_REST_TOKEN")) {
            (Some(url), Some(token)) => Some(RestCredentials { url, token }),
            _ => None,
        };

        let redis_url = non_empty("AI_CACHE_REDIS_URL");

        let redis_addr = non_empty("AI_CACHE_REDIS_HOST").map(|host| RedisAddr {
            host,
            port: env_parse("AI_CACHE_REDIS_PORT").unwrap_or(6379),
            password: non_empty("AI_CACHE_REDIS_PASSWORD"),
        });

        Self {
            rest,
            redis_url,
            redis_addr,
            health_timeout: env_secs("AI_CACHE_HEALTH_TIMEOUT_SECS")
                .unwrap_or(defaults.health_timeout),
            http_timeout: env_secs("AI_CACHE_HTTP_TIMEOUT_SECS").unwrap_or(defaults.http_timeout),
            memory_max_entries: env_parse("AI_CACHE_MEMORY_MAX_ENTRIES")
                .unwrap_or(defaults.memory_max_entries),
        }
    }
}

/// Full runtime configuration: backend settings plus rate quotas.
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    pub backend: BackendSettings,
    pub quotas: QuotaTable,
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        Self {
            backend: BackendSettings::from_env(),
            quotas: QuotaTable::from_env(),
        }
    }
}

pub(crate) fn non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse::<T>().ok())
}

pub(crate) fn env_secs(key: &str) -> Option<Duration> {
    env_parse::<u64>(key).map(Duration::from_secs)
}
