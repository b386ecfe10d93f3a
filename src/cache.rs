// Cache-aside layer over an external TTL cache. Lookup, then compute-and-store
// on miss. The two steps are deliberately not atomic: two concurrent requests
// for the same cold key may both compute and both write (last writer wins).
// Upstream fetches are idempotent, so the race only costs a duplicate call.

use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

use crate::window::{Preset, ResolvedWindow};

/// External cache boundary: string payloads, TTL in milliseconds (the backing
/// service's unit; config supplies seconds and callers convert once).
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// `Ok(None)` is the not-found sentinel, distinct from any cached value.
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    async fn set(&self, key: &str, value: String, ttl_ms: u64) -> anyhow::Result<()>;
}

/// Returns the cached value for `key`, or invokes `compute`, stores the result
/// under `key` with `ttl_ms`, and returns it. A failed `compute` propagates and
/// caches nothing, so the next call retries.
pub async fn get_or_fetch<T, F, Fut>(
    store: &dyn CacheStore,
    key: &str,
    ttl_ms: u64,
    compute: F,
) -> anyhow::Result<T>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    if let Some(raw) = store.get(key).await? {
        match serde_json::from_str::<T>(&raw) {
            Ok(value) => {
                tracing::debug!(key, "cache hit");
                return Ok(value);
            }
            Err(e) => {
                // Stale shape from an older build; recompute and overwrite.
                tracing::debug!(key, error = %e, "cache entry undecodable, recomputing");
            }
        }
    }
    let value = compute().await?;
    store.set(key, serde_json::to_string(&value)?, ttl_ms).await?;
    Ok(value)
}

/// Cache key for a usage query. Groups are sorted so key identity ignores
/// input ordering; the resolved bounds keep rolling presets from serving
/// yesterday's window.
pub fn usage_cache_key(
    app_groups: &[String],
    preset: Preset,
    window: &ResolvedWindow,
    compare: bool,
) -> String {
    let mut groups: Vec<&str> = app_groups.iter().map(String::as_str).collect();
    groups.sort_unstable();
    format!(
        "usage:v1:{}:{}:{}:{}:compare={}",
        groups.join(","),
        preset.as_str(),
        window.start_date(),
        window.end_date(),
        compare
    )
}

/// In-process `CacheStore` backed by a map with per-entry deadlines. Expired
/// entries are dropped lazily on read.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, (String, Instant)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let expired = {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some((value, deadline)) if Instant::now() < *deadline => {
                    return Ok(Some(value.clone()));
                }
                Some(_) => true,
                None => false,
            }
        };
        if expired {
            self.entries.write().await.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: String, ttl_ms: u64) -> anyhow::Result<()> {
        let deadline = Instant::now() + Duration::from_millis(ttl_ms);
        self.entries
            .write()
            .await
            .insert(key.to_string(), (value, deadline));
        Ok(())
    }
}
