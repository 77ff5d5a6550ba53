//! Generic TTL key-value cache.
//!
//! Memoizes expensive aggregate computations (catalog snapshots, peer maps)
//! off the request path. Two interchangeable backends sit behind one trait:
//! a process-local store and a networked store; callers cannot tell which is
//! active. The cache is strictly an optimization: every cached value is
//! cheaply recomputable, so backend failures degrade to a miss instead of an
//! error, and racing writers to one key resolve last-write-wins.

mod memory;
mod remote;
mod sweep;

pub use memory::MemoryCache;
pub use remote::RemoteCache;
pub use sweep::Sweeper;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Default entry TTL when a caller does not pass one (one hour).
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Cache keys for the service's memoized aggregates.
pub mod keys {
    /// Full catalog snapshot (skills + resources).
    pub const CATALOG_SNAPSHOT: &str = "catalog:snapshot";

    /// Peer usage map for one requesting user.
    pub fn peer_map(user_id: &str) -> String {
        format!("peers:{user_id}")
    }
}

/// TTL key-value store.
///
/// Concurrent `get`/`set`/`delete` from multiple callers are safe, but there
/// are no cross-key guarantees and no atomic check-then-act; treat results
/// as advisory.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Look up a key. An expired entry behaves as absent regardless of
    /// whether a sweep has run.
    async fn get(&self, key: &str) -> Option<Value>;

    /// Store a value. `ttl = None` applies the backend's default TTL.
    async fn set(&self, key: &str, value: Value, ttl: Option<Duration>);

    /// Remove a key.
    async fn delete(&self, key: &str);

    /// Drop every expired entry, returning how many were removed. Backends
    /// whose backing store expires keys itself report 0.
    async fn sweep(&self) -> usize;
}

/// Typed lookup over the opaque JSON payload. A payload that no longer
/// deserializes is dropped and treated as a miss.
pub async fn get_json<T: DeserializeOwned>(store: &dyn CacheStore, key: &str) -> Option<T> {
    let value = store.get(key).await?;
    match serde_json::from_value(value) {
        Ok(parsed) => Some(parsed),
        Err(error) => {
            tracing::warn!(
                target: "uplevel::cache",
                key,
                %error,
                "cached payload failed to deserialize; dropping entry"
            );
            store.delete(key).await;
            None
        }
    }
}

/// Typed store over the opaque JSON payload. Serialization failures are
/// logged and the set is skipped.
pub async fn set_json<T: Serialize>(
    store: &dyn CacheStore,
    key: &str,
    value: &T,
    ttl: Option<Duration>,
) {
    match serde_json::to_value(value) {
        Ok(json) => store.set(key, json, ttl).await,
        Err(error) => {
            tracing::warn!(
                target: "uplevel::cache",
                key,
                %error,
                "failed to serialize cache payload; skipping set"
            );
        }
    }
}

/// Memoize an expensive computation under `key`.
///
/// Returns the cached value on a hit; otherwise runs `produce`, caches the
/// result, and returns it. Computation errors pass through uncached.
pub async fn get_or_compute<T, E, F, Fut>(
    store: &dyn CacheStore,
    key: &str,
    ttl: Option<Duration>,
    produce: F,
) -> Result<T, E>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    if let Some(hit) = get_json(store, key).await {
        tracing::debug!(target: "uplevel::cache", key, "cache hit");
        return Ok(hit);
    }
    let value = produce().await?;
    set_json(store, key, &value, ttl).await;
    Ok(value)
}
