//! Wire-level tests for the hosted REST backend against a mock server.

use ai_cache_rust::backend::{Backend, RestCredentials, RestStore, WINDOW_SCRIPT};
use mockito::Matcher;
use serde_json::json;
use std::time::Duration;

async fn store(server: &mockito::Server) -> RestStore {
    RestStore::connect(
        &RestCredentials {
            url: server.url(),
            token: "secret-token".to_string(),
        },
        Duration::from_secs(5),
    )
    .expect("connect")
}

#[tokio::test]
async fn get_sends_the_command_and_bearer_token() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_header("authorization", "Bearer secret-token")
        .match_body(Matcher::Json(json!(["GET", "document:k"])))
        .with_body(r#"{"result":"cached text"}"#)
        .create_async()
        .await;

    let store = store(&server).await;
    let value = store.get("document:k").await.expect("get");
    assert_eq!(value.as_deref(), Some("cached text"));
    mock.assert_async().await;
}

#[tokio::test]
async fn get_maps_null_result_to_miss() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/")
        .match_body(Matcher::Json(json!(["GET", "document:absent"])))
        .with_body(r#"{"result":null}"#)
        .create_async()
        .await;

    let store = store(&server).await;
    assert_eq!(store.get("document:absent").await.expect("get"), None);
}

#[tokio::test]
async fn set_issues_set_with_expiry() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_body(Matcher::Json(json!(["SET", "document:k", "v", "EX", "3600"])))
        .with_body(r#"{"result":"OK"}"#)
        .create_async()
        .await;

    let store = store(&server).await;
    store
        .set("document:k", "v", Duration::from_secs(3600))
        .await
        .expect("set");
    mock.assert_async().await;
}

#[tokio::test]
async fn zero_ttl_set_degenerates_to_delete() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_body(Matcher::Json(json!(["DEL", "document:k"])))
        .with_body(r#"{"result":1}"#)
        .create_async()
        .await;

    let store = store(&server).await;
    store
        .set("document:k", "v", Duration::ZERO)
        .await
        .expect("set");
    mock.assert_async().await;
}

#[tokio::test]
async fn exists_and_delete_parse_integer_results() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/")
        .match_body(Matcher::Json(json!(["EXISTS", "document:k"])))
        .with_body(r#"{"result":1}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/")
        .match_body(Matcher::Json(json!(["DEL", "document:k"])))
        .with_body(r#"{"result":0}"#)
        .create_async()
        .await;

    let store = store(&server).await;
    assert!(store.exists("document:k").await.expect("exists"));
    assert!(!store.delete("document:k").await.expect("delete"));
}

#[tokio::test]
async fn incr_window_evaluates_the_shared_script() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_body(Matcher::Json(json!([
            "EVAL",
            WINDOW_SCRIPT,
            "1",
            "rate-limit:user-1",
            "60"
        ])))
        .with_body(r#"{"result":[3,42]}"#)
        .create_async()
        .await;

    let store = store(&server).await;
    let (count, remaining) = store
        .incr_window("rate-limit:user-1", Duration::from_secs(60))
        .await
        .expect("incr");
    assert_eq!(count, 3);
    assert_eq!(remaining, 42);
    mock.assert_async().await;
}

#[tokio::test]
async fn error_envelope_becomes_a_connectivity_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/")
        .match_body(Matcher::Json(json!(["GET", "document:k"])))
        .with_status(401)
        .with_body(r#"{"error":"unauthorized"}"#)
        .create_async()
        .await;

    let store = store(&server).await;
    let err = store.get("document:k").await.unwrap_err();
    assert!(err.to_string().contains("unauthorized"));
}
