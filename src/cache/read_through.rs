//! Read-Through Module
//!
//! Lookup, fetch on miss, populate, return.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::{CacheKey, CacheStore};

// == Read Through ==
/// Read path shared by every cached endpoint.
///
/// Values are stored as JSON text. A payload that no longer decodes into the
/// requested type counts as a miss, so the cache can never turn a working
/// read into a failing one. Concurrent misses on one key are not coalesced;
/// each caller fetches and the last `set` wins.
#[derive(Debug, Clone)]
pub struct ReadThrough {
    cache: Arc<CacheStore>,
    ttl: Duration,
}

impl ReadThrough {
    pub fn new(cache: Arc<CacheStore>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn cache(&self) -> &Arc<CacheStore> {
        &self.cache
    }

    /// Returns the decoded value under `key`, if live and decodable.
    ///
    /// An undecodable payload is dropped and the lookup counts as a miss.
    pub fn lookup<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let raw_key = key.as_string();
        let payload = self.cache.get(&raw_key)?;

        match serde_json::from_str(&payload) {
            Ok(value) => {
                debug!(key = %raw_key, "cache hit");
                Some(value)
            }
            Err(err) => {
                warn!(key = %raw_key, error = %err, "discarding undecodable cache entry");
                self.cache.discard(&raw_key);
                None
            }
        }
    }

    /// Serializes `value` and stores it under `key` with the standard TTL.
    ///
    /// An encode failure only skips caching.
    pub fn populate<T: Serialize>(&self, key: &CacheKey, value: &T) {
        let raw_key = key.as_string();
        match serde_json::to_string(value) {
            Ok(payload) => self.cache.set(raw_key, payload, self.ttl),
            Err(err) => {
                warn!(key = %raw_key, error = %err, "value not cached: encode failed");
            }
        }
    }

    /// Serves `key` from the cache, or runs `fetch` and caches its result.
    ///
    /// Errors from `fetch` are returned untouched and nothing is stored.
    pub async fn get_or_fetch<T, E, F, Fut>(&self, key: CacheKey, fetch: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(hit) = self.lookup(&key) {
            return Ok(hit);
        }

        debug!(key = %key, "cache miss");
        let value = fetch().await?;
        self.populate(&key, &value);
        Ok(value)
    }
}
