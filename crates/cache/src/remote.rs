//! Networked cache backend.
//!
//! Speaks a plain REST key-value dialect: `GET`/`PUT`/`DELETE` on
//! `{base}/kv/{key}`, with the TTL as a query parameter on writes. The
//! backing store owns expiry, so `sweep` has nothing to do here. Backend
//! failures are logged and surface as a miss, never as an error.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::{CacheStore, DEFAULT_TTL};

pub struct RemoteCache {
    client: reqwest::Client,
    base_url: String,
    default_ttl: Duration,
}

impl RemoteCache {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_default_ttl(base_url, DEFAULT_TTL)
    }

    pub fn with_default_ttl(base_url: impl Into<String>, default_ttl: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
            default_ttl,
        }
    }

    fn key_url(&self, key: &str) -> String {
        format!("{}/kv/{key}", self.base_url)
    }
}

#[async_trait]
impl CacheStore for RemoteCache {
    async fn get(&self, key: &str) -> Option<Value> {
        let response = match self.client.get(self.key_url(key)).send().await {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(
                    target: "uplevel::cache",
                    key,
                    %error,
                    "remote cache GET failed; treating as miss"
                );
                return None;
            }
        };
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return None;
        }
        if !response.status().is_success() {
            tracing::warn!(
                target: "uplevel::cache",
                key,
                status = %response.status(),
                "remote cache GET returned an error status; treating as miss"
            );
            return None;
        }
        match response.json::<Value>().await {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::warn!(
                    target: "uplevel::cache",
                    key,
                    %error,
                    "remote cache payload unreadable; treating as miss"
                );
                None
            }
        }
    }

    async fn set(&self, key: &str, value: Value, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let result = self
            .client
            .put(self.key_url(key))
            .query(&[("ttl", ttl.as_secs())])
            .json(&value)
            .send()
            .await;
        match result {
            Ok(response) if response.status().is_success() => {}
            Ok(response) => {
                tracing::warn!(
                    target: "uplevel::cache",
                    key,
                    status = %response.status(),
                    "remote cache SET rejected"
                );
            }
            Err(error) => {
                tracing::warn!(target: "uplevel::cache", key, %error, "remote cache SET failed");
            }
        }
    }

    async fn delete(&self, key: &str) {
        match self.client.delete(self.key_url(key)).send().await {
            Ok(response) if response.status().is_success() => {}
            Ok(response) => {
                tracing::warn!(
                    target: "uplevel::cache",
                    key,
                    status = %response.status(),
                    "remote cache DELETE rejected"
                );
            }
            Err(error) => {
                tracing::warn!(target: "uplevel::cache", key, %error, "remote cache DELETE failed");
            }
        }
    }

    // Expiry lives in the backing store for this backend.
    async fn sweep(&self) -> usize {
        0
    }
}
