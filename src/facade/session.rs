//! Session state cache.

use super::{FacadeStats, HitCounters};
use crate::cache::{CacheClient, Namespace};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Session state as the embedding application sees it.
///
/// The `data` payload is opaque JSON; its schema belongs to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    pub user_id: Option<String>,
    pub created_at_unix: u64,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl SessionRecord {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            user_id: None,
            created_at_unix: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
            data: serde_json::Value::Null,
        }
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }
}

/// Caches session records by session id (30-day lifetime).
pub struct SessionCache {
    client: CacheClient,
    counters: HitCounters,
}

impl SessionCache {
    pub fn new(client: CacheClient) -> Self {
        Self {
            client,
            counters: HitCounters::default(),
        }
    }

    fn key(session_id: &str) -> String {
        format!("sess:{}", session_id)
    }

    pub async fn get(&self, session_id: &str) -> Option<SessionRecord> {
        match self
            .client
            .get::<SessionRecord>(&Self::key(session_id), Namespace::Session)
            .await
        {
            Some(record) => {
                self.counters.record_hit();
                Some(record)
            }
            None => {
                self.counters.record_miss();
                None
            }
        }
    }

    pub async fn set(&self, record: &SessionRecord) {
        self.client
            .set(
                &Self::key(&record.session_id),
                record,
                Namespace::Session,
                None,
            )
            .await;
    }

    pub async fn delete(&self, session_id: &str) -> bool {
        self.client
            .delete(&Self::key(session_id), Namespace::Session)
            .await
    }

    pub fn stats(&self) -> FacadeStats {
        self.counters.snapshot()
    }
}
