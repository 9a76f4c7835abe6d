//! Backend resolution and the process-lifetime singleton.

use super::{Backend, BackendHandle, MemoryStore, RedisStore, RestStore};
use crate::config::BackendSettings;
use crate::error::ErrorContext;
use crate::{Error, Result};
use arc_swap::ArcSwapOption;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Probe keys outlive a stalled health check by a few seconds at most.
const PROBE_TTL: Duration = Duration::from_secs(10);

/// Resolves and memoizes the storage backend for the whole process.
///
/// Candidates are tried in priority order (hosted REST service, direct Redis
/// URL, host/port/password triple); each is health-checked before being
/// accepted, and exhausting them all yields the in-process fallback store.
/// Concurrent first callers share one in-flight resolution; an explicit
/// [`reset`](Self::reset) clears the memoized handle so the next caller
/// re-resolves. Reset is a diagnostics path: in-flight callers racing a
/// reset may observe either the old or the new backend.
pub struct BackendProvider {
    settings: BackendSettings,
    current: ArcSwapOption<BackendHandle>,
    resolving: Mutex<()>,
}

impl BackendProvider {
    pub fn new(settings: BackendSettings) -> Self {
        Self {
            settings,
            current: ArcSwapOption::const_empty(),
            resolving: Mutex::new(()),
        }
    }

    /// Wrap an already-constructed store, bypassing resolution.
    ///
    /// Dependency-injection seam for tests and embedders that manage their
    /// own backend lifecycle.
    pub fn fixed(handle: BackendHandle) -> Self {
        let provider = Self::new(BackendSettings::default());
        provider.current.store(Some(Arc::new(handle)));
        provider
    }

    /// Return the resolved backend, resolving it on first use.
    pub async fn acquire(&self) -> Arc<BackendHandle> {
        if let Some(handle) = self.current.load_full() {
            return handle;
        }
        let _guard = self.resolving.lock().await;
        // A racing caller may have finished resolution while we waited.
        if let Some(handle) = self.current.load_full() {
            return handle;
        }
        let handle = Arc::new(self.resolve().await);
        self.current.store(Some(handle.clone()));
        handle
    }

    /// Drop the memoized handle, forcing re-resolution on the next call.
    pub fn reset(&self) {
        self.current.store(None);
    }

    async fn resolve(&self) -> BackendHandle {
        if let Some(credentials) = &self.settings.rest {
            let attempt = async {
                let store: Arc<dyn Backend> =
                    Arc::new(RestStore::connect(credentials, self.settings.http_timeout)?);
                self.health_check(store.as_ref()).await?;
                Ok::<_, Error>(store)
            };
            match attempt.await {
                Ok(store) => {
                    info!(backend = "rest", "cache backend resolved");
                    return BackendHandle::distributed(store);
                }
                Err(e) => warn!(error = %e, "REST backend candidate rejected"),
            }
        }

        if let Some(url) = &self.settings.redis_url {
            match self.try_redis(RedisStore::connect_url(url)).await {
                Ok(store) => {
                    info!(backend = "redis", "cache backend resolved");
                    return BackendHandle::distributed(store);
                }
                Err(e) => warn!(error = %e, "Redis URL candidate rejected"),
            }
        }

        if let Some(addr) = &self.settings.redis_addr {
            match self.try_redis(RedisStore::connect_addr(addr)).await {
                Ok(store) => {
                    info!(backend = "redis", "cache backend resolved");
                    return BackendHandle::distributed(store);
                }
                Err(e) => warn!(error = %e, "Redis host candidate rejected"),
            }
        }

        warn!("no usable distributed cache backend; continuing with in-process fallback store");
        BackendHandle::memory(Arc::new(MemoryStore::new(self.settings.memory_max_entries)))
    }

    /// Redis connection setup retries internally, so the connect phase gets
    /// the same hard timeout as the probe round trip.
    async fn try_redis(
        &self,
        connect: impl std::future::Future<Output = Result<RedisStore>>,
    ) -> Result<Arc<dyn Backend>> {
        let store = tokio::time::timeout(self.settings.health_timeout, connect)
            .await
            .map_err(|_| {
                Error::connectivity_with_context(
                    format!(
                        "connection attempt timed out after {:?}",
                        self.settings.health_timeout
                    ),
                    ErrorContext::new().with_source("backend_factory"),
                )
            })??;
        let store: Arc<dyn Backend> = Arc::new(store);
        self.health_check(store.as_ref()).await?;
        Ok(store)
    }

    /// Write a probe key, read it back, delete it; accept only on an exact
    /// value match. The whole round trip runs under a hard timeout so a
    /// backend that accepts connections but never responds cannot stall
    /// startup.
    async fn health_check(&self, store: &dyn Backend) -> Result<()> {
        let key = format!("health:probe:{}", Uuid::new_v4().simple());
        let expected = Uuid::new_v4().to_string();
        let round_trip = async {
            store.set(&key, &expected, PROBE_TTL).await?;
            let read = store.get(&key).await?;
            store.delete(&key).await?;
            if read.as_deref() == Some(expected.as_str()) {
                debug!(backend = store.name(), "health check passed");
                Ok(())
            } else {
                Err(Error::consistency_with_context(
                    "probe round trip did not return the written value",
                    ErrorContext::new()
                        .with_details(format!("read back {:?}", read))
                        .with_source("backend_factory"),
                ))
            }
        };
        tokio::time::timeout(self.settings.health_timeout, round_trip)
            .await
            .map_err(|_| {
                Error::connectivity_with_context(
                    format!(
                        "health check timed out after {:?}",
                        self.settings.health_timeout
                    ),
                    ErrorContext::new().with_source("backend_factory"),
                )
            })?
    }
}
