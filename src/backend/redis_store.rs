//! Direct Redis backend.

use super::{Backend, WINDOW_SCRIPT};
use crate::error::ErrorContext;
use crate::{Error, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};
use std::time::Duration;
use url::Url;

static WINDOW: Lazy<Script> = Lazy::new(|| Script::new(WINDOW_SCRIPT));

/// Host/port/password connection triple.
#[derive(Debug, Clone)]
pub struct RedisAddr {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
}

/// Direct Redis connection over an auto-reconnecting connection manager.
///
/// The manager is clonable and multiplexes one underlying connection, so the
/// store is shared freely across concurrent requests. Atomicity of the
/// window increment comes from the server-side script, not from this client.
pub struct RedisStore {
    manager: ConnectionManager,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore").finish_non_exhaustive()
    }
}

impl RedisStore {
    pub async fn connect_url(url: &str) -> Result<Self> {
        let parsed = Url::parse(url).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid Redis URL: {}", e),
                ErrorContext::new()
                    .with_field_path("backend.redis_url")
                    .with_source("redis_store"),
            )
        })?;
        if !matches!(parsed.scheme(), "redis" | "rediss") {
            return Err(Error::configuration_with_context(
                format!("unsupported Redis scheme '{}'", parsed.scheme()),
                ErrorContext::new()
                    .with_field_path("backend.redis_url")
                    .with_source("redis_store"),
            ));
        }
        let client = redis::Client::open(url)?;
        let manager = ConnectionManager::new(client).await?;
        Ok(Self { manager })
    }

    pub async fn connect_addr(addr: &RedisAddr) -> Result<Self> {
        Self::connect_url(&addr_url(addr)).await
    }
}

fn addr_url(addr: &RedisAddr) -> String {
    match &addr.password {
        Some(password) => format!("redis://:{}@{}:{}", password, addr.host, addr.port),
        None => format!("redis://{}:{}", addr.host, addr.port),
    }
}

#[async_trait]
impl Backend for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.manager.clone();
        Ok(conn.get::<_, Option<String>>(key).await?)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let secs = ttl.as_secs();
        if secs == 0 {
            // EX 0 is rejected by the server; expire-now means delete.
            self.delete(key).await?;
            return Ok(());
        }
        let mut conn = self.manager.clone();
        conn.set_ex::<_, _, ()>(key, value, secs).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.manager.clone();
        let removed: i64 = conn.del(key).await?;
        Ok(removed > 0)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.manager.clone();
        Ok(conn.exists::<_, bool>(key).await?)
    }

    async fn incr_window(&self, key: &str, window: Duration) -> Result<(u64, u64)> {
        let mut conn = self.manager.clone();
        let (count, ttl): (u64, i64) = WINDOW
            .key(key)
            .arg(window.as_secs())
            .invoke_async(&mut conn)
            .await?;
        let remaining = if ttl > 0 { ttl as u64 } else { window.as_secs() };
        Ok((count, remaining))
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_rejects_non_redis_scheme() {
        let err = RedisStore::connect_url("https://cache.example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn addr_formats_url_with_and_without_password() {
        let with = RedisAddr {
            host: "cache.internal".to_string(),
            port: 6380,
            password: Some("hunter2".to_string()),
        };
        assert_eq!(addr_url(&with), "redis://:hunter2@cache.internal:6380");

        let without = RedisAddr {
            host: "cache.internal".to_string(),
            port: 6379,
            password: None,
        };
        assert_eq!(addr_url(&without), "redis://cache.internal:6379");
    }
}
