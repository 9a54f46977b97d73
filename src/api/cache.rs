// src/api/cache.rs
//! Keyed response cache for the data-fetch services

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use crate::common::ClientResult;

/// Cache key built from a scope and normalized query parameters
///
/// Parameters with no value or a blank value are dropped and the rest are
/// sorted by name, so `{q: "", page: 1}` and `{page: 1}` share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(String);

impl QueryKey {
    pub fn scope(scope: &str) -> Self {
        Self(scope.trim_matches('/').to_string())
    }

    pub fn new(scope: &str, params: &[(&str, Option<String>)]) -> Self {
        let pairs = normalize_params(params);
        let scope = scope.trim_matches('/');
        if pairs.is_empty() {
            return Self(scope.to_string());
        }

        let query: Vec<String> = pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect();
        Self(format!("{}?{}", scope, query.join("&")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the scope itself and anything nested under it
    pub fn has_prefix(&self, prefix: &str) -> bool {
        let prefix = prefix.trim_matches('/');
        match self.0.strip_prefix(prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with('?') || rest.starts_with('/'),
            None => false,
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Drops empty parameters, trims values and sorts by name
pub fn normalize_params(params: &[(&str, Option<String>)]) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = params
        .iter()
        .filter_map(|(k, v)| {
            v.as_ref()
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(|v| (k.to_string(), v.to_string()))
        })
        .collect();
    pairs.sort();
    pairs
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: serde_json::Value,
    expires_at: Instant,
}

#[derive(Debug, Clone)]
pub struct QueryCache {
    entries: Arc<RwLock<HashMap<QueryKey, CacheEntry>>>,
    stale_time: Duration,
}

impl QueryCache {
    pub fn new(stale_time: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            stale_time,
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if entry.expires_at <= Instant::now() {
            return None;
        }
        serde_json::from_value(entry.value.clone()).ok()
    }

    pub async fn insert<T: Serialize>(&self, key: QueryKey, value: &T) {
        let value = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(e) => {
                debug!(key = %key, error = %e, "Skipping cache insert for unserializable value");
                return;
            }
        };

        let mut entries = self.entries.write().await;
        entries.insert(
            key,
            CacheEntry {
                value,
                expires_at: Instant::now() + self.stale_time,
            },
        );
    }

    /// Returns the fresh cached value or runs the fetcher and caches its result
    ///
    /// Failures are never cached.
    pub async fn fetch<T, Fut>(
        &self,
        key: QueryKey,
        fetcher: impl FnOnce() -> Fut,
    ) -> ClientResult<T>
    where
        T: Serialize + DeserializeOwned,
        Fut: Future<Output = ClientResult<T>>,
    {
        if let Some(hit) = self.get::<T>(&key).await {
            debug!(key = %key, "Query served from cache");
            return Ok(hit);
        }

        let value = fetcher().await?;
        self.insert(key, &value).await;
        Ok(value)
    }

    pub async fn invalidate(&self, key: &QueryKey) {
        self.entries.write().await.remove(key);
    }

    /// Removes every entry at or under the given scope, returning how many
    pub async fn invalidate_prefix(&self, prefix: &str) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !key.has_prefix(prefix));
        let removed = before - entries.len();
        debug!(prefix = %prefix, removed, "Invalidated cached queries");
        removed
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
