//! Rate classes and their (limit, window) quotas.

use crate::config::env_parse;
use std::time::Duration;

/// Caller-selected rate class. The limiter itself is class-agnostic; the
/// class only selects which quota applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateClass {
    /// Login/token endpoints. Tight.
    Authentication,
    /// General API traffic.
    Api,
    /// AI-inference endpoints. Tight, quota-constrained upstream.
    Inference,
    /// Embedded widget endpoints.
    Widget,
}

/// A (limit, window) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateQuota {
    pub max_requests: u64,
    pub window: Duration,
}

impl RateQuota {
    pub const fn new(max_requests: u64, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }
}

/// Per-class quotas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaTable {
    pub authentication: RateQuota,
    pub api: RateQuota,
    pub inference: RateQuota,
    pub widget: RateQuota,
}

impl Default for QuotaTable {
    fn default() -> Self {
        Self {
            authentication: RateQuota::new(5, 60),
            api: RateQuota::new(30, 60),
            inference: RateQuota::new(10, 60),
            widget: RateQuota::new(10, 60),
        }
    }
}

impl QuotaTable {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            authentication: quota_from_env("AUTH", defaults.authentication),
            api: quota_from_env("API", defaults.api),
            inference: quota_from_env("INFERENCE", defaults.inference),
            widget: quota_from_env("WIDGET", defaults.widget),
        }
    }

    pub fn for_class(&self, class: RateClass) -> RateQuota {
        match class {
            RateClass::Authentication => self.authentication,
            RateClass::Api => self.api,
            RateClass::Inference => self.inference,
            RateClass::Widget => self.widget,
        }
    }
}

fn quota_from_env(class: &str, default: RateQuota) -> RateQuota {
    let max_requests =
        env_parse::<u64>(&format!("AI_CACHE_RATE_{}_MAX", class)).unwrap_or(default.max_requests);
    let window = env_parse::<u64>(&format!("AI_CACHE_RATE_{}_WINDOW_SECS", class))
        .map(Duration::from_secs)
        .unwrap_or(default.window);
    RateQuota {
        max_requests,
        window,
    }
}
