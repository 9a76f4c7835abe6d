//! 限流模块：按客户端身份计数的固定窗口限流器。
//!
//! # Rate Limiting Module
//!
//! Fixed-window request counting keyed by client identity. The distributed
//! backend's atomic increment is the cross-process source of truth; when it
//! is unavailable the limiter degrades to process-local windows with
//! identical accept/reject logic.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`RateLimiter`] | The window counter with distributed-first, local-fallback behavior |
//! | [`RateLimitDecision`] | `Allowed { remaining, reset_after }` or `Rejected { retry_after }` |
//! | [`RateQuota`] / [`QuotaTable`] | Per-class (limit, window) pairs with env overrides |
//! | [`ClientDescriptor`] | Identity/IP material extracted from a request by the caller |
//! | [`LocalWindows`] | Process-local window records with periodic sweep |
//!
//! ## Failure Semantics
//!
//! Internal failures never block a request: a failed distributed increment
//! degrades to the local window, and the local window cannot fail. The sole
//! intentional block is the explicit over-limit rejection.

mod core;
mod identity;
mod local;
mod quota;

pub use self::core::{RateLimitDecision, RateLimiter};
pub use identity::ClientDescriptor;
pub use local::LocalWindows;
pub use quota::{QuotaTable, RateClass, RateQuota};
