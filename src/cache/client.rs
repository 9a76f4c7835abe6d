//! Typed cache client over the resolved backend.

use super::{CacheKey, Namespace};
use crate::backend::BackendProvider;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Entries above this size are skipped rather than stored.
const MAX_ENTRY_BYTES: usize = 10 * 1024 * 1024;

/// Aggregate cache traffic counters.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub deletes: u64,
    pub errors: u64,
}

impl CacheStats {
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct AtomicStats {
    hits: AtomicU64,
    misses: AtomicU64,
    sets: AtomicU64,
    deletes: AtomicU64,
    errors: AtomicU64,
}

impl AtomicStats {
    fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            sets: AtomicU64::new(0),
            deletes: AtomicU64::new(0),
            errors: AtomicU64::new(0),
        }
    }

    fn to_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            sets: self.sets.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

/// Unified cache client: typed values, namespaced keys, clamped TTLs.
///
/// Backend failures never escape: reads degrade to a miss, writes to a
/// logged no-op. Values are serialized to JSON text; schema enforcement is
/// the caller's responsibility.
#[derive(Clone)]
pub struct CacheClient {
    provider: Arc<BackendProvider>,
    stats: Arc<AtomicStats>,
    max_entry_bytes: usize,
}

impl CacheClient {
    pub fn new(provider: Arc<BackendProvider>) -> Self {
        Self {
            provider,
            stats: Arc::new(AtomicStats::new()),
            max_entry_bytes: MAX_ENTRY_BYTES,
        }
    }

    pub fn with_max_entry_bytes(mut self, bytes: usize) -> Self {
        self.max_entry_bytes = bytes;
        self
    }

    /// Read a typed value; `None` on miss, expiry, decode failure, or
    /// backend error.
    pub async fn get<T: DeserializeOwned>(&self, key: &str, namespace: Namespace) -> Option<T> {
        let full = CacheKey::new(namespace, key).render();
        let handle = self.provider.acquire().await;
        match handle.store.get(&full).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    self.stats.hits.fetch_add(1, Ordering::Relaxed);
                    Some(value)
                }
                Err(e) => {
                    self.stats.errors.fetch_add(1, Ordering::Relaxed);
                    warn!(key = %full, error = %e, "cached value failed to decode; treating as miss");
                    None
                }
            },
            Ok(None) => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            Err(e) => {
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                warn!(key = %full, error = %e, "cache read failed; treating as miss");
                None
            }
        }
    }

    /// Write a typed value. The effective TTL is the requested one clamped
    /// to the namespace ceiling, or the namespace default when omitted.
    pub async fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        namespace: Namespace,
        ttl: Option<Duration>,
    ) {
        let full = CacheKey::new(namespace, key).render();
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                warn!(key = %full, error = %e, "value failed to serialize; skipping cache write");
                return;
            }
        };
        if raw.len() > self.max_entry_bytes {
            debug!(key = %full, bytes = raw.len(), "value exceeds entry size cap; skipping cache write");
            return;
        }
        let effective = namespace.effective_ttl(ttl);
        let handle = self.provider.acquire().await;
        match handle.store.set(&full, &raw, effective).await {
            Ok(()) => {
                self.stats.sets.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                warn!(key = %full, error = %e, "cache write failed; continuing without caching");
            }
        }
    }

    pub async fn exists(&self, key: &str, namespace: Namespace) -> bool {
        let full = CacheKey::new(namespace, key).render();
        let handle = self.provider.acquire().await;
        match handle.store.exists(&full).await {
            Ok(present) => present,
            Err(e) => {
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                warn!(key = %full, error = %e, "cache existence check failed");
                false
            }
        }
    }

    pub async fn delete(&self, key: &str, namespace: Namespace) -> bool {
        let full = CacheKey::new(namespace, key).render();
        let handle = self.provider.acquire().await;
        match handle.store.delete(&full).await {
            Ok(removed) => {
                if removed {
                    self.stats.deletes.fetch_add(1, Ordering::Relaxed);
                }
                removed
            }
            Err(e) => {
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                warn!(key = %full, error = %e, "cache delete failed");
                false
            }
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.to_stats()
    }
}
