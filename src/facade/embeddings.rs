//! Embedding vector cache.

use super::{FacadeStats, HitCounters};
use crate::cache::{hash_text, CacheClient, Namespace};

/// Caches embedding vectors by query text.
///
/// Embeddings are deterministic for a given model and input, so they get
/// the longest computation-cache lifetime (7 days). Keys are hashes of the
/// normalized query text; the text itself never reaches the backend as a
/// key.
pub struct EmbeddingCache {
    client: CacheClient,
    counters: HitCounters,
}

impl EmbeddingCache {
    pub fn new(client: CacheClient) -> Self {
        Self {
            client,
            counters: HitCounters::default(),
        }
    }

    fn key(query: &str) -> String {
        format!("emb:{}", hash_text(query))
    }

    pub async fn get(&self, query: &str) -> Option<Vec<f32>> {
        match self
            .client
            .get::<Vec<f32>>(&Self::key(query), Namespace::Embeddings)
            .await
        {
            Some(vector) => {
                self.counters.record_hit();
                Some(vector)
            }
            None => {
                self.counters.record_miss();
                None
            }
        }
    }

    pub async fn set(&self, query: &str, embedding: &[f32]) {
        self.client
            .set(&Self::key(query), embedding, Namespace::Embeddings, None)
            .await;
    }

    pub fn stats(&self) -> FacadeStats {
        self.counters.snapshot()
    }
}
