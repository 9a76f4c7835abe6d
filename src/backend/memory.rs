//! In-process fallback store.

use super::Backend;
use crate::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Sweeps run at most this often, piggybacked on writes.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Clone)]
struct StoreEntry {
    value: String,
    expires_at: Option<Instant>,
    last_accessed: Instant,
}

impl StoreEntry {
    fn new(value: String, ttl: Duration) -> Self {
        let now = Instant::now();
        Self {
            value,
            // Zero TTL stores an already-expired entry: the next read drops it.
            expires_at: Some(now + ttl),
            last_accessed: now,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.map(|at| now >= at).unwrap_or(false)
    }
}

struct StoreState {
    entries: HashMap<String, StoreEntry>,
    last_sweep: Instant,
}

/// Process-local map-based store with manual TTL expiry.
///
/// This is a single-process degraded substitute for the distributed backend.
/// It must never be treated as a silent behavioral equivalent for
/// multi-instance rate-limiting guarantees: counters here are only visible
/// to the process that incremented them.
///
/// Expiry is lazy: `get` and `exists` drop an entry whose absolute expiry
/// has passed. A sweep reclaims memory proactively at most once per minute,
/// and an entry cap evicts the least recently accessed entries on overflow.
pub struct MemoryStore {
    state: RwLock<StoreState>,
    max_entries: usize,
}

impl MemoryStore {
    pub fn new(max_entries: usize) -> Self {
        Self {
            state: RwLock::new(StoreState {
                entries: HashMap::new(),
                last_sweep: Instant::now(),
            }),
            max_entries,
        }
    }

    /// Live (non-expired) entry count.
    pub fn len(&self) -> usize {
        let state = self.state.read().unwrap();
        let now = Instant::now();
        state
            .entries
            .values()
            .filter(|e| !e.is_expired(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.state.write().unwrap().entries.clear();
    }

    fn maybe_sweep(state: &mut StoreState, now: Instant) {
        if now.duration_since(state.last_sweep) < SWEEP_INTERVAL {
            return;
        }
        state.entries.retain(|_, e| !e.is_expired(now));
        state.last_sweep = now;
    }

    fn evict_if_needed(&self, state: &mut StoreState, now: Instant) {
        if state.entries.len() < self.max_entries {
            return;
        }
        state.entries.retain(|_, e| !e.is_expired(now));
        while state.entries.len() >= self.max_entries {
            let oldest = state
                .entries
                .iter()
                .min_by_key(|(_, e)| e.last_accessed)
                .map(|(k, _)| k.clone());
            if let Some(k) = oldest {
                state.entries.remove(&k);
            } else {
                break;
            }
        }
    }
}

#[async_trait]
impl Backend for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut state = self.state.write().unwrap();
        let now = Instant::now();
        if let Some(entry) = state.entries.get_mut(key) {
            if entry.is_expired(now) {
                state.entries.remove(key);
                return Ok(None);
            }
            entry.last_accessed = now;
            return Ok(Some(entry.value.clone()));
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut state = self.state.write().unwrap();
        let now = Instant::now();
        Self::maybe_sweep(&mut state, now);
        self.evict_if_needed(&mut state, now);
        state
            .entries
            .insert(key.to_string(), StoreEntry::new(value.to_string(), ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.state.write().unwrap().entries.remove(key).is_some())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut state = self.state.write().unwrap();
        let now = Instant::now();
        match state.entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                state.entries.remove(key);
                Ok(false)
            }
            Some(_) => Ok(true),
            None => Ok(false),
        }
    }

    // One write guard covers the whole read-increment-write sequence, so the
    // counter is per-key consistent within the process: there is no await
    // point an overlapping request could interleave through.
    async fn incr_window(&self, key: &str, window: Duration) -> Result<(u64, u64)> {
        let mut state = self.state.write().unwrap();
        let now = Instant::now();
        let open = state
            .entries
            .get(key)
            .filter(|e| !e.is_expired(now))
            .and_then(|e| e.value.parse::<u64>().ok().map(|c| (c, e.expires_at)));
        match open {
            Some((count, expires_at)) => {
                let count = count.saturating_add(1);
                let remaining = expires_at
                    .map(|at| at.saturating_duration_since(now).as_secs())
                    .unwrap_or(window.as_secs());
                if let Some(entry) = state.entries.get_mut(key) {
                    entry.value = count.to_string();
                    entry.last_accessed = now;
                }
                Ok((count, remaining))
            }
            None => {
                state
                    .entries
                    .insert(key.to_string(), StoreEntry::new("1".to_string(), window));
                Ok((1, window.as_secs()))
            }
        }
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
