//! The window rate limiter.

use super::{LocalWindows, RateQuota};
use crate::backend::BackendProvider;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Outcome of an admission check.
///
/// `Rejected` is the limiter's one intentional block and is not an error:
/// callers surface it as HTTP 429 with `Retry-After = retry_after`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed {
        /// Requests left in the current window after this one.
        remaining: u64,
        /// Time until the window rolls over.
        reset_after: Duration,
    },
    Rejected {
        /// Time the client should wait before retrying.
        retry_after: Duration,
    },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed { .. })
    }
}

/// Fixed-window request counter keyed by client id.
///
/// The resolved backend's atomic `incr_window` is the source of truth; if
/// that call fails mid-outage the limiter degrades to process-local windows
/// so admission control keeps working without waiting for re-resolution.
/// Internal failures never block a request (fail open): the local path
/// cannot fail, and the only deliberate block is the over-limit rejection.
///
/// A rejected request's increment stands: over-limit traffic keeps
/// consuming budget, so hammering a closed window does not shorten it.
pub struct RateLimiter {
    provider: Arc<BackendProvider>,
    local: LocalWindows,
}

impl RateLimiter {
    pub fn new(provider: Arc<BackendProvider>) -> Self {
        Self {
            provider,
            local: LocalWindows::new(),
        }
    }

    /// Count one request for `client_id` against `quota` and decide.
    pub async fn check(&self, client_id: &str, quota: &RateQuota) -> RateLimitDecision {
        let key = format!("rate-limit:{}", client_id);
        let handle = self.provider.acquire().await;
        let (count, remaining) = match handle.store.incr_window(&key, quota.window).await {
            Ok((count, secs)) => (count, Duration::from_secs(secs)),
            Err(e) => {
                warn!(
                    client = client_id,
                    error = %e,
                    "distributed rate-limit increment failed; counting in process-local window"
                );
                self.local.hit(&key, quota.window)
            }
        };
        if count > quota.max_requests {
            let retry_after = remaining.max(Duration::from_secs(1));
            debug!(client = client_id, count, "request over limit");
            RateLimitDecision::Rejected { retry_after }
        } else {
            RateLimitDecision::Allowed {
                remaining: quota.max_requests - count,
                reset_after: remaining,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Backend, BackendHandle};
    use crate::config::BackendSettings;
    use crate::{Error, Result};
    use async_trait::async_trait;

    fn memory_limiter() -> RateLimiter {
        RateLimiter::new(Arc::new(BackendProvider::new(BackendSettings::default())))
    }

    /// Distributed backend whose atomic increment always fails.
    struct BrokenStore;

    #[async_trait]
    impl Backend for BrokenStore {
        async fn get(&self, _: &str) -> Result<Option<String>> {
            Err(Error::connectivity("offline"))
        }
        async fn set(&self, _: &str, _: &str, _: Duration) -> Result<()> {
            Err(Error::connectivity("offline"))
        }
        async fn delete(&self, _: &str) -> Result<bool> {
            Err(Error::connectivity("offline"))
        }
        async fn exists(&self, _: &str) -> Result<bool> {
            Err(Error::connectivity("offline"))
        }
        async fn incr_window(&self, _: &str, _: Duration) -> Result<(u64, u64)> {
            Err(Error::connectivity("offline"))
        }
        fn name(&self) -> &'static str {
            "broken"
        }
    }

    #[tokio::test]
    async fn allows_up_to_the_limit_then_rejects() {
        let limiter = memory_limiter();
        let quota = RateQuota::new(3, 60);
        for expected_remaining in [2u64, 1, 0] {
            match limiter.check("client", &quota).await {
                RateLimitDecision::Allowed { remaining, .. } => {
                    assert_eq!(remaining, expected_remaining)
                }
                other => panic!("expected Allowed, got {:?}", other),
            }
        }
        match limiter.check("client", &quota).await {
            RateLimitDecision::Rejected { retry_after } => {
                assert!(retry_after > Duration::ZERO);
                assert!(retry_after <= Duration::from_secs(60));
            }
            other => panic!("expected Rejected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn failing_distributed_backend_degrades_to_local_counting() {
        let provider = Arc::new(BackendProvider::fixed(BackendHandle::distributed(
            Arc::new(BrokenStore),
        )));
        let limiter = RateLimiter::new(provider);
        let quota = RateQuota::new(2, 60);
        assert!(limiter.check("client", &quota).await.is_allowed());
        assert!(limiter.check("client", &quota).await.is_allowed());
        assert!(!limiter.check("client", &quota).await.is_allowed());
    }

    #[tokio::test]
    async fn window_rollover_reopens_admission() {
        let limiter = memory_limiter();
        let quota = RateQuota {
            max_requests: 1,
            window: Duration::from_millis(40),
        };
        assert!(limiter.check("client", &quota).await.is_allowed());
        assert!(!limiter.check("client", &quota).await.is_allowed());
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(limiter.check("client", &quota).await.is_allowed());
    }

    #[tokio::test]
    async fn clients_are_isolated() {
        let limiter = memory_limiter();
        let quota = RateQuota::new(1, 60);
        assert!(limiter.check("a", &quota).await.is_allowed());
        assert!(limiter.check("b", &quota).await.is_allowed());
        assert!(!limiter.check("a", &quota).await.is_allowed());
    }
}
