//! Top-level runtime wiring.

use crate::backend::BackendProvider;
use crate::cache::CacheClient;
use crate::config::RuntimeConfig;
use crate::facade::{ContextCache, EmbeddingCache, ScraperCache, SessionCache};
use crate::limiter::{ClientDescriptor, QuotaTable, RateClass, RateLimitDecision, RateLimiter};
use std::sync::Arc;
use tracing::info;

/// The assembled caching and rate-limiting service.
///
/// Explicitly constructed and passed by reference (or behind an `Arc`)
/// through the embedding application's context; there is no ambient global
/// state. All components share one backend provider, so the whole runtime
/// degrades together when the distributed backend is unreachable and
/// recovers together across an administrative reset.
pub struct CacheRuntime {
    provider: Arc<BackendProvider>,
    client: CacheClient,
    limiter: RateLimiter,
    quotas: QuotaTable,
    embeddings: EmbeddingCache,
    scraper: ScraperCache,
    context: ContextCache,
    sessions: SessionCache,
}

impl CacheRuntime {
    pub fn new(config: RuntimeConfig) -> Self {
        let provider = Arc::new(BackendProvider::new(config.backend));
        let client = CacheClient::new(provider.clone());
        Self {
            limiter: RateLimiter::new(provider.clone()),
            quotas: config.quotas,
            embeddings: EmbeddingCache::new(client.clone()),
            scraper: ScraperCache::new(client.clone()),
            context: ContextCache::new(client.clone()),
            sessions: SessionCache::new(client.clone()),
            client,
            provider,
        }
    }

    /// Build from `AI_CACHE_*` environment configuration.
    pub fn from_env() -> Self {
        Self::new(RuntimeConfig::from_env())
    }

    /// Count one request and decide admission for the given rate class.
    pub async fn check_rate_limit(
        &self,
        descriptor: &ClientDescriptor,
        class: RateClass,
    ) -> RateLimitDecision {
        let quota = self.quotas.for_class(class);
        self.limiter.check(&descriptor.client_id(), &quota).await
    }

    /// The unified cache client, for callers outside the fixed facades.
    pub fn cache(&self) -> &CacheClient {
        &self.client
    }

    pub fn embeddings(&self) -> &EmbeddingCache {
        &self.embeddings
    }

    pub fn scraper(&self) -> &ScraperCache {
        &self.scraper
    }

    pub fn context(&self) -> &ContextCache {
        &self.context
    }

    pub fn sessions(&self) -> &SessionCache {
        &self.sessions
    }

    pub fn quotas(&self) -> &QuotaTable {
        &self.quotas
    }

    /// Name of the backend currently serving this process, resolving it
    /// first if no request has done so yet.
    pub async fn backend_name(&self) -> &'static str {
        self.provider.acquire().await.store.name()
    }

    /// Drop the resolved backend and force re-resolution on next use.
    ///
    /// Diagnostics and tests only; in-flight operations racing this call
    /// may land on either the old or the new backend.
    pub fn reset_backend(&self) {
        info!("administrative backend reset requested");
        self.provider.reset();
    }
}
