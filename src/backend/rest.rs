//! Hosted REST key-value backend.

use super::{Backend, WINDOW_SCRIPT};
use crate::error::ErrorContext;
use crate::{Error, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Credentials for a hosted REST key-value service.
#[derive(Debug, Clone)]
pub struct RestCredentials {
    pub url: String,
    pub token: String,
}

/// Client for an Upstash-style REST key-value service.
///
/// Every command is a JSON array (`["SET", key, value, "EX", "60"]`) POSTed
/// to the service base URL with bearer-token auth; responses carry either a
/// `result` or an `error` field. The atomic window increment is delegated to
/// the server through `EVAL` so the round trip stays indivisible.
#[derive(Debug)]
pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl RestStore {
    pub fn connect(credentials: &RestCredentials, timeout: Duration) -> Result<Self> {
        let parsed = Url::parse(&credentials.url).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid REST backend URL: {}", e),
                ErrorContext::new()
                    .with_field_path("backend.rest_url")
                    .with_source("rest_store"),
            )
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::configuration_with_context(
                format!("unsupported REST backend scheme '{}'", parsed.scheme()),
                ErrorContext::new()
                    .with_field_path("backend.rest_url")
                    .with_source("rest_store"),
            ));
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: credentials.url.trim_end_matches('/').to_string(),
            token: credentials.token.clone(),
        })
    }

    async fn command(&self, parts: &[&str]) -> Result<Value> {
        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.token)
            .json(&parts)
            .send()
            .await?;
        let status = response.status();
        let body: Value = response.json().await?;
        if let Some(message) = body.get("error").and_then(|v| v.as_str()) {
            return Err(Error::connectivity_with_context(
                format!("command rejected: {}", message),
                ErrorContext::new().with_source("rest_store"),
            ));
        }
        if !status.is_success() {
            return Err(Error::connectivity_with_context(
                format!("unexpected HTTP status {}", status),
                ErrorContext::new().with_source("rest_store"),
            ));
        }
        Ok(body.get("result").cloned().unwrap_or(Value::Null))
    }

    fn malformed(detail: &str) -> Error {
        Error::connectivity_with_context(
            "malformed response",
            ErrorContext::new()
                .with_details(detail.to_string())
                .with_source("rest_store"),
        )
    }
}

#[async_trait]
impl Backend for RestStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match self.command(&["GET", key]).await? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            other => Err(Self::malformed(&format!("expected string, got {}", other))),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let secs = ttl.as_secs();
        if secs == 0 {
            // The service rejects EX 0; an immediately-expired entry and a
            // deleted one are indistinguishable to readers.
            self.delete(key).await?;
            return Ok(());
        }
        let result = self
            .command(&["SET", key, value, "EX", &secs.to_string()])
            .await?;
        match result.as_str() {
            Some("OK") => Ok(()),
            _ => Err(Self::malformed(&format!("SET returned {}", result))),
        }
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let result = self.command(&["DEL", key]).await?;
        Ok(result.as_u64().unwrap_or(0) > 0)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let result = self.command(&["EXISTS", key]).await?;
        Ok(result.as_u64().unwrap_or(0) > 0)
    }

    async fn incr_window(&self, key: &str, window: Duration) -> Result<(u64, u64)> {
        let secs = window.as_secs().to_string();
        let result = self
            .command(&["EVAL", WINDOW_SCRIPT, "1", key, &secs])
            .await?;
        let pair = result
            .as_array()
            .filter(|a| a.len() == 2)
            .ok_or_else(|| Self::malformed(&format!("EVAL returned {}", result)))?;
        let count = pair[0]
            .as_u64()
            .ok_or_else(|| Self::malformed("non-integer count"))?;
        let ttl = pair[1].as_i64().unwrap_or(-1);
        let remaining = if ttl > 0 { ttl as u64 } else { window.as_secs() };
        Ok((count, remaining))
    }

    fn name(&self) -> &'static str {
        "rest"
    }
}
