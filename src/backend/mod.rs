//! 存储后端模块：分布式键值服务与进程内回退存储的统一抽象。
//!
//! # Storage Backends Module
//!
//! This module abstracts the concrete storage behind the cache and the rate
//! limiter: a distributed key-value service when one is reachable, and a
//! process-local fallback store when none is.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`Backend`] | Trait every backend satisfies (get/set/delete/exists + atomic window increment) |
//! | [`BackendProvider`] | Candidate resolution, health checking, and the memoized process singleton |
//! | [`RestStore`] | Hosted REST key-value service client (URL + bearer token) |
//! | [`RedisStore`] | Direct Redis connection (URL or host/port/password) |
//! | [`MemoryStore`] | Single-process degraded fallback with lazy TTL expiry |
//!
//! ## Resolution Order
//!
//! Candidates are tried in priority order: hosted REST service, direct
//! connection URL, host/port/password triple. Each complete candidate is
//! health-checked with a probe write/read/delete round trip under a hard
//! timeout; the first one that passes becomes the process-lifetime backend.
//! Exhausting all candidates yields [`MemoryStore`].

mod factory;
mod memory;
mod redis_store;
mod rest;

pub use factory::BackendProvider;
pub use memory::MemoryStore;
pub use redis_store::{RedisAddr, RedisStore};
pub use rest::{RestCredentials, RestStore};

use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Server-side script backing [`Backend::incr_window`].
///
/// The increment and the conditional expiry-set must be indivisible: two
/// concurrent first requests in a window would otherwise both believe they
/// initialize it. Returns `{count, ttl}`.
pub const WINDOW_SCRIPT: &str = "local count = redis.call('INCR', KEYS[1]) \
if count == 1 then \
redis.call('EXPIRE', KEYS[1], ARGV[1]) \
end \
local ttl = redis.call('TTL', KEYS[1]) \
return {count, ttl}";

/// Common interface of all storage backends.
///
/// Values are opaque JSON text; schema enforcement belongs to callers.
/// A TTL of zero means immediate expiry: a subsequent `get` returns `None`.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<bool>;
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Atomically increment `key`, starting a window of `window` length on
    /// the first increment. Returns the post-increment count and the
    /// remaining window in seconds.
    async fn incr_window(&self, key: &str, window: Duration) -> Result<(u64, u64)>;

    fn name(&self) -> &'static str;
}

/// Which side of the degradation boundary a handle sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// A distributed key-value service shared across processes.
    Distributed,
    /// The single-process fallback store.
    Memory,
}

/// The resolved backend plus its classification.
///
/// Created once per process by [`BackendProvider`] and shared by every
/// consumer; invalidated only by an explicit administrative reset.
pub struct BackendHandle {
    pub store: Arc<dyn Backend>,
    pub kind: BackendKind,
}

impl BackendHandle {
    pub fn distributed(store: Arc<dyn Backend>) -> Self {
        Self {
            store,
            kind: BackendKind::Distributed,
        }
    }

    pub fn memory(store: Arc<dyn Backend>) -> Self {
        Self {
            store,
            kind: BackendKind::Memory,
        }
    }
}
