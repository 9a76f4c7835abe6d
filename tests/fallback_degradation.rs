//! Graceful degradation when no distributed backend is usable.

use ai_cache_rust::backend::{BackendKind, BackendProvider, RestCredentials};
use ai_cache_rust::{
    BackendSettings, CacheRuntime, ClientDescriptor, Namespace, QuotaTable, RateClass,
    RuntimeConfig,
};
use mockito::Matcher;
use std::time::Duration;

/// Degradation paths log warnings; run with RUST_LOG=warn to see them.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

#[tokio::test]
async fn unreachable_redis_degrades_to_memory_without_errors() {
    init_tracing();
    let config = RuntimeConfig {
        backend: BackendSettings {
            redis_url: Some("redis://127.0.0.1:1".to_string()),
            health_timeout: Duration::from_millis(500),
            ..BackendSettings::default()
        },
        quotas: QuotaTable::default(),
    };
    let runtime = CacheRuntime::new(config);

    assert_eq!(runtime.backend_name().await, "memory");

    // Cache and limiter both keep working deterministically.
    runtime
        .cache()
        .set("k", "v", Namespace::Document, None)
        .await;
    let read: Option<String> = runtime.cache().get("k", Namespace::Document).await;
    assert_eq!(read.as_deref(), Some("v"));

    let descriptor = ClientDescriptor::new().with_identity("user-1");
    assert!(runtime
        .check_rate_limit(&descriptor, RateClass::Api)
        .await
        .is_allowed());
}

#[tokio::test]
async fn probe_mismatch_rejects_the_rest_candidate() {
    init_tracing();
    let mut server = mockito::Server::new_async().await;
    let set_probe = server
        .mock("POST", "/")
        .match_body(Matcher::Regex(r#"^\["SET""#.to_string()))
        .with_body(r#"{"result":"OK"}"#)
        .create_async()
        .await;
    // The read-back returns a value that cannot match the written probe.
    let get_probe = server
        .mock("POST", "/")
        .match_body(Matcher::Regex(r#"^\["GET""#.to_string()))
        .with_body(r#"{"result":"not-the-probe-value"}"#)
        .create_async()
        .await;
    let del_probe = server
        .mock("POST", "/")
        .match_body(Matcher::Regex(r#"^\["DEL""#.to_string()))
        .with_body(r#"{"result":1}"#)
        .create_async()
        .await;

    let settings = BackendSettings {
        rest: Some(RestCredentials {
            url: server.url(),
            token: "token".to_string(),
        }),
        health_timeout: Duration::from_secs(5),
        ..BackendSettings::default()
    };
    let provider = BackendProvider::new(settings);
    let handle = provider.acquire().await;

    assert_eq!(handle.kind, BackendKind::Memory);
    set_probe.assert_async().await;
    get_probe.assert_async().await;
    del_probe.assert_async().await;
}

#[tokio::test]
async fn reset_discards_the_fallback_contents() {
    let runtime = CacheRuntime::new(RuntimeConfig::default());
    runtime
        .cache()
        .set("k", "v", Namespace::Document, None)
        .await;
    assert!(runtime.cache().exists("k", Namespace::Document).await);

    runtime.reset_backend();

    // Re-resolution builds a fresh store; the old entry is gone.
    assert_eq!(runtime.backend_name().await, "memory");
    let read: Option<String> = runtime.cache().get("k", Namespace::Document).await;
    assert_eq!(read, None);
}
