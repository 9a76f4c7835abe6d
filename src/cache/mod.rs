//! 统一缓存模块：命名空间、TTL 策略与类型化的缓存客户端。
//!
//! # Unified Cache Module
//!
//! One typed client over whichever backend the factory resolved, with a
//! closed set of namespaces that keep domains from colliding on a shared
//! backend and pin each category's lifetime policy.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`CacheClient`] | Typed get/set/exists/delete with TTL clamping and statistics |
//! | [`Namespace`] | Closed category set selecting key prefix and TTL policy |
//! | [`CacheKey`] | Namespace-prefixed key composition |
//! | [`CacheStats`] | Aggregate hit/miss/set/delete/error counters |
//!
//! ## Failure Semantics
//!
//! Every client operation catches backend errors and converts them to safe
//! defaults: `None` on reads, a logged no-op on writes, `false` on
//! `exists`/`delete`. A cache failure must never become a request failure.

mod client;
mod key;
mod namespace;

pub use client::{CacheClient, CacheStats};
pub use key::{hash_text, CacheKey};
pub use namespace::Namespace;
