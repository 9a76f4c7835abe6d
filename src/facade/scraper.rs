//! Scraped page cache.

use super::{FacadeStats, HitCounters};
use crate::cache::{hash_text, CacheClient, Namespace};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// A scraped page body with its source URL and fetch time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedPage {
    pub url: String,
    pub content: String,
    pub fetched_at_unix: u64,
}

impl ScrapedPage {
    pub fn new(url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            content: content.into(),
            fetched_at_unix: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        }
    }
}

/// Caches scraped page content by URL.
///
/// Pages drift, so the lifetime is short (12 hours) relative to the
/// computation caches.
pub struct ScraperCache {
    client: CacheClient,
    counters: HitCounters,
}

impl ScraperCache {
    pub fn new(client: CacheClient) -> Self {
        Self {
            client,
            counters: HitCounters::default(),
        }
    }

    fn key(url: &str) -> String {
        format!("page:{}", hash_text(url))
    }

    pub async fn get(&self, url: &str) -> Option<ScrapedPage> {
        match self
            .client
            .get::<ScrapedPage>(&Self::key(url), Namespace::Scraper)
            .await
        {
            Some(page) => {
                self.counters.record_hit();
                Some(page)
            }
            None => {
                self.counters.record_miss();
                None
            }
        }
    }

    pub async fn set(&self, page: &ScrapedPage) {
        self.client
            .set(&Self::key(&page.url), page, Namespace::Scraper, None)
            .await;
    }

    pub fn stats(&self) -> FacadeStats {
        self.counters.snapshot()
    }
}
