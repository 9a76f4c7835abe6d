//! Cache key composition and hashing.

use super::Namespace;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A namespaced cache key: `{namespace_prefix}:{base}`.
///
/// The base part carries the facade's type prefix and a deterministic
/// identifier (usually a hash), never raw secrets or full query text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub namespace: Namespace,
    pub base: String,
}

impl CacheKey {
    pub fn new(namespace: Namespace, base: impl Into<String>) -> Self {
        Self {
            namespace,
            base: base.into(),
        }
    }

    pub fn render(&self) -> String {
        format!("{}:{}", self.namespace.prefix(), self.base)
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Deterministic hash of free text for use as a key component.
///
/// Normalizes first (lowercase, trimmed, collapsed whitespace) so that
/// trivially different spellings of the same query share a cache entry.
pub fn hash_text(text: &str) -> String {
    let normalized = text
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    hasher.finalize().iter().map(|b| format!("{:02x}", b)).collect()
}
