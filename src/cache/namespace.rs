//! Cache namespaces and TTL policy.

use serde::{Deserialize, Serialize};
use std::time::Duration;

const HOUR: u64 = 3600;
const DAY: u64 = 24 * HOUR;

/// Closed set of cache categories.
///
/// Each namespace prefixes its keys, preventing collisions between domains
/// sharing one backend, and carries the policy TTL for its category. The
/// policy TTL is both the default and the ceiling: callers cannot request
/// persistence beyond it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Namespace {
    Embeddings,
    Document,
    Scraper,
    Context,
    Session,
    Prompt,
    Message,
    ShortLived,
}

impl Namespace {
    pub fn prefix(&self) -> &'static str {
        match self {
            Namespace::Embeddings => "embeddings",
            Namespace::Document => "document",
            Namespace::Scraper => "scraper",
            Namespace::Context => "context",
            Namespace::Session => "session",
            Namespace::Prompt => "prompt",
            Namespace::Message => "message",
            Namespace::ShortLived => "short",
        }
    }

    /// Policy TTL for this category.
    pub fn policy_ttl(&self) -> Duration {
        let secs = match self {
            Namespace::Embeddings => 7 * DAY,
            Namespace::Document => DAY,
            Namespace::Scraper => 12 * HOUR,
            Namespace::Context => DAY,
            Namespace::Session => 30 * DAY,
            Namespace::Prompt => 30 * DAY,
            Namespace::Message => 7 * DAY,
            Namespace::ShortLived => HOUR,
        };
        Duration::from_secs(secs)
    }

    /// Clamp a caller-requested TTL to the category ceiling.
    pub fn effective_ttl(&self, requested: Option<Duration>) -> Duration {
        match requested {
            Some(ttl) => ttl.min(self.policy_ttl()),
            None => self.policy_ttl(),
        }
    }

    pub fn all() -> &'static [Namespace] {
        &[
            Namespace::Embeddings,
            Namespace::Document,
            Namespace::Scraper,
            Namespace::Context,
            Namespace::Session,
            Namespace::Prompt,
            Namespace::Message,
            Namespace::ShortLived,
        ]
    }
}
