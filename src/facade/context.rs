//! Retrieved-context cache.

use super::{FacadeStats, HitCounters};
use crate::cache::{hash_text, CacheClient, Namespace};
use serde::{Deserialize, Serialize};

/// Context assembled for one query, plus where it came from.
///
/// `from_cache` is `false` on freshly assembled bundles and forced to
/// `true` on every cache hit, so callers can tell the two apart without
/// re-deriving that fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextBundle {
    pub context: String,
    pub source_ids: Vec<String>,
    #[serde(default)]
    pub from_cache: bool,
}

impl ContextBundle {
    pub fn new(context: impl Into<String>, source_ids: Vec<String>) -> Self {
        Self {
            context: context.into(),
            source_ids,
            from_cache: false,
        }
    }
}

/// Caches assembled retrieval context per session and query.
///
/// Keyed by `session_id` plus the hash of the query, so the same question
/// in different sessions stays isolated.
pub struct ContextCache {
    client: CacheClient,
    counters: HitCounters,
}

impl ContextCache {
    pub fn new(client: CacheClient) -> Self {
        Self {
            client,
            counters: HitCounters::default(),
        }
    }

    fn key(session_id: &str, query: &str) -> String {
        format!("ctx:{}:{}", session_id, hash_text(query))
    }

    pub async fn get(&self, session_id: &str, query: &str) -> Option<ContextBundle> {
        match self
            .client
            .get::<ContextBundle>(&Self::key(session_id, query), Namespace::Context)
            .await
        {
            Some(mut bundle) => {
                bundle.from_cache = true;
                self.counters.record_hit();
                Some(bundle)
            }
            None => {
                self.counters.record_miss();
                None
            }
        }
    }

    pub async fn set(&self, session_id: &str, query: &str, bundle: &ContextBundle) {
        self.client
            .set(
                &Self::key(session_id, query),
                bundle,
                Namespace::Context,
                None,
            )
            .await;
    }

    pub fn stats(&self) -> FacadeStats {
        self.counters.snapshot()
    }
}
