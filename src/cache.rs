use moka::future::Cache;
use rand::RngExt;
use serde::Deserialize;
use serde::{Serialize, de::DeserializeOwned};
use std::fmt::Debug;
use std::future::Future;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::warn;

use crate::Result;
use crate::error::AstrocastError;

#[derive(Serialize, Deserialize)]
struct StoredEntry<T> {
    value: T,
    expires_at: u64, // Unix timestamp (seconds)
}

/// In-memory response cache with a per-entry time-to-live
#[derive(Clone)]
pub struct ResponseCache {
    store: Cache<String, Vec<u8>>,
}

impl Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("entries", &self.store.entry_count())
            .finish()
    }
}

impl ResponseCache {
    pub fn new(max_entries: u64) -> Self {
        Self {
            store: Cache::builder().max_capacity(max_entries).build(),
        }
    }

    /// Stores a serializable value with a time-to-live (TTL).
    #[tracing::instrument(name = "put_cache", level = "debug", skip(self, value))]
    pub async fn put<T: Serialize + Sync>(&self, key: &str, value: &T, ttl: Duration) -> Result<()> {
        let expires_at = SystemTime::now()
            .checked_add(ttl)
            .ok_or_else(|| AstrocastError::cache("TTL overflow"))
            .map(unix_seconds)?;
        let entry = StoredEntry { value, expires_at };
        let bytes = postcard::to_stdvec(&entry)
            .map_err(|e| AstrocastError::cache(format!("encode {key}: {e}")))?;

        self.store.insert(key.to_string(), bytes).await;
        Ok(())
    }

    /// Retrieves a value if it exists and has not expired.
    /// Returns `None` for cache misses or expired entries.
    #[tracing::instrument(name = "query_cache", level = "debug", skip(self))]
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        if let Some(bytes) = self.store.get(key).await {
            let entry: StoredEntry<T> = postcard::from_bytes(&bytes)
                .map_err(|e| AstrocastError::cache(format!("decode {key}: {e}")))?;
            let now = unix_seconds(SystemTime::now());

            if now < entry.expires_at {
                tracing::debug!("Key found and still fresh");
                Ok(Some(entry.value))
            } else {
                tracing::debug!("Key found but expired");
                self.remove(key).await;
                Ok(None)
            }
        } else {
            tracing::debug!("Key not found");
            Ok(None)
        }
    }

    /// Manually removes a key from the cache.
    pub async fn remove(&self, key: &str) {
        self.store.invalidate(key).await;
    }

    /// Return the cached value for `key` or fetch, store and return a fresh one.
    ///
    /// Cache failures are logged and fall through to `fetch`; fetch errors are
    /// returned unchanged and never cached.
    pub async fn get_or_fetch<T, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        fetch: F,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Sync,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        match self.get::<T>(key).await {
            Ok(Some(cached)) => return Ok(cached),
            Ok(None) => {}
            Err(e) => warn!("Ignoring unreadable cache entry {}: {}", key, e),
        }

        let value = fetch().await?;
        if let Err(e) = self.put(key, &value, jittered(ttl)).await {
            warn!("Failed to cache {}: {}", key, e);
        }
        Ok(value)
    }
}

fn unix_seconds(at: SystemTime) -> u64 {
    at.duration_since(UNIX_EPOCH).map_or(0, |d| d.as_secs())
}

/// Spread a TTL by ±10 % so neighbouring keys do not expire together
pub fn jittered(ttl: Duration) -> Duration {
    let jitter: f64 = rand::rng().random_range(0.9..1.1);
    ttl.mul_f64(jitter)
}
