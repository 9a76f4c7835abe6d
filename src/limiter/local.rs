//! Process-local rate windows.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Stale records are collected at most this often.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
struct WindowRecord {
    count: u64,
    reset_at: Instant,
}

struct WindowState {
    records: HashMap<String, WindowRecord>,
    last_sweep: Instant,
}

/// Per-process window counters, used when no distributed backend is usable.
///
/// A synchronous mutex covers each whole hit: the read-then-write sequence
/// has no suspension point, which is what makes the count per-key
/// consistent inside the process. Counters here are invisible to other
/// instances; this is the documented degraded mode, not an equivalent.
pub struct LocalWindows {
    state: Mutex<WindowState>,
}

impl LocalWindows {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(WindowState {
                records: HashMap::new(),
                last_sweep: Instant::now(),
            }),
        }
    }

    /// Record one hit against `key`, opening a fresh window when none is
    /// live. Returns the post-increment count and the remaining window.
    ///
    /// Infallible by construction; a poisoned lock only occurs after a
    /// panic elsewhere, and then the window restarts rather than blocking.
    pub fn hit(&self, key: &str, window: Duration) -> (u64, Duration) {
        let now = Instant::now();
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        if now.duration_since(state.last_sweep) >= SWEEP_INTERVAL {
            state.records.retain(|_, r| r.reset_at > now);
            state.last_sweep = now;
        }
        let record = state
            .records
            .entry(key.to_string())
            .or_insert(WindowRecord {
                count: 0,
                reset_at: now + window,
            });
        if now >= record.reset_at {
            record.count = 0;
            record.reset_at = now + window;
        }
        record.count = record.count.saturating_add(1);
        (record.count, record.reset_at.saturating_duration_since(now))
    }

    #[cfg(test)]
    fn record_count(&self) -> usize {
        self.state.lock().unwrap().records.len()
    }
}

impl Default for LocalWindows {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_within_a_window() {
        let windows = LocalWindows::new();
        let window = Duration::from_secs(60);
        for expected in 1..=4u64 {
            let (count, remaining) = windows.hit("rate-limit:c", window);
            assert_eq!(count, expected);
            assert!(remaining <= window);
        }
    }

    #[test]
    fn window_reinitializes_after_reset_time() {
        let windows = LocalWindows::new();
        let window = Duration::from_millis(20);
        assert_eq!(windows.hit("rate-limit:c", window).0, 1);
        assert_eq!(windows.hit("rate-limit:c", window).0, 2);
        std::thread::sleep(Duration::from_millis(35));
        assert_eq!(windows.hit("rate-limit:c", window).0, 1);
    }

    #[test]
    fn distinct_clients_count_independently() {
        let windows = LocalWindows::new();
        let window = Duration::from_secs(60);
        assert_eq!(windows.hit("rate-limit:a", window).0, 1);
        assert_eq!(windows.hit("rate-limit:b", window).0, 1);
        assert_eq!(windows.hit("rate-limit:a", window).0, 2);
        assert_eq!(windows.record_count(), 2);
    }
}
