//! End-to-end cache behavior on the in-process fallback backend.

use ai_cache_rust::facade::{ContextBundle, ScrapedPage, SessionRecord};
use ai_cache_rust::{CacheRuntime, Namespace, RuntimeConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn runtime() -> CacheRuntime {
    CacheRuntime::new(RuntimeConfig::default())
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Answer {
    text: String,
    confidence: f64,
}

#[tokio::test]
async fn set_then_get_returns_the_value() {
    let runtime = runtime();
    let answer = Answer {
        text: "42".to_string(),
        confidence: 0.99,
    };
    runtime
        .cache()
        .set("question-1", &answer, Namespace::Document, None)
        .await;
    let read: Option<Answer> = runtime.cache().get("question-1", Namespace::Document).await;
    assert_eq!(read, Some(answer));
}

#[tokio::test]
async fn zero_ttl_reads_back_as_miss() {
    let runtime = runtime();
    runtime
        .cache()
        .set("ephemeral", "gone", Namespace::ShortLived, Some(Duration::ZERO))
        .await;
    let read: Option<String> = runtime.cache().get("ephemeral", Namespace::ShortLived).await;
    assert_eq!(read, None);
}

#[tokio::test]
async fn exists_and_delete_round_trip() {
    let runtime = runtime();
    runtime
        .cache()
        .set("k", "v", Namespace::Document, None)
        .await;
    assert!(runtime.cache().exists("k", Namespace::Document).await);
    assert!(runtime.cache().delete("k", Namespace::Document).await);
    assert!(!runtime.cache().exists("k", Namespace::Document).await);
}

#[tokio::test]
async fn namespaces_share_the_backend_without_collisions() {
    let runtime = runtime();
    runtime
        .cache()
        .set("shared", "a document", Namespace::Document, None)
        .await;
    runtime
        .cache()
        .set("shared", "a prompt", Namespace::Prompt, None)
        .await;
    let document: Option<String> = runtime.cache().get("shared", Namespace::Document).await;
    let prompt: Option<String> = runtime.cache().get("shared", Namespace::Prompt).await;
    assert_eq!(document.as_deref(), Some("a document"));
    assert_eq!(prompt.as_deref(), Some("a prompt"));
}

#[tokio::test]
async fn embedding_vector_round_trips_identically() {
    let runtime = runtime();
    let vector = vec![0.1f32, 0.2, -0.33, 4.5];
    runtime.embeddings().set("cats vs dogs", &vector).await;
    assert_eq!(runtime.embeddings().get("cats vs dogs").await, Some(vector));
    // Normalization makes trivially different spellings share the entry.
    assert!(runtime.embeddings().get("Cats  VS dogs ").await.is_some());
}

#[tokio::test]
async fn context_hit_is_marked_from_cache() {
    let runtime = runtime();
    assert_eq!(runtime.context().get("sess-1", "what is rust").await, None);

    let bundle = ContextBundle::new(
        "Rust is a systems programming language.",
        vec!["doc-7".to_string(), "doc-9".to_string()],
    );
    assert!(!bundle.from_cache);
    runtime.context().set("sess-1", "what is rust", &bundle).await;

    let hit = runtime
        .context()
        .get("sess-1", "what is rust")
        .await
        .expect("cached bundle");
    assert!(hit.from_cache);
    assert_eq!(hit.context, bundle.context);
    assert_eq!(hit.source_ids, bundle.source_ids);

    // A different session does not see it.
    assert_eq!(runtime.context().get("sess-2", "what is rust").await, None);
}

#[tokio::test]
async fn scraped_page_round_trips() {
    let runtime = runtime();
    let page = ScrapedPage::new("https://example.com/a", "<p>body</p>");
    runtime.scraper().set(&page).await;
    assert_eq!(
        runtime.scraper().get("https://example.com/a").await,
        Some(page)
    );
    assert_eq!(runtime.scraper().get("https://example.com/b").await, None);
}

#[tokio::test]
async fn session_record_round_trips() {
    let runtime = runtime();
    let record = SessionRecord::new("sess-abc")
        .with_user_id("user-7")
        .with_data(serde_json::json!({"theme": "dark"}));
    runtime.sessions().set(&record).await;
    let read = runtime.sessions().get("sess-abc").await.expect("session");
    assert_eq!(read, record);
    assert!(runtime.sessions().delete("sess-abc").await);
    assert_eq!(runtime.sessions().get("sess-abc").await, None);
}

#[tokio::test]
async fn facade_counters_report_hits_and_misses() {
    let runtime = runtime();
    runtime.embeddings().get("absent").await;
    runtime.embeddings().set("present", &[1.0f32]).await;
    runtime.embeddings().get("present").await;
    let stats = runtime.embeddings().stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);
    assert!(stats.hit_ratio() > 0.49 && stats.hit_ratio() < 0.51);
}
