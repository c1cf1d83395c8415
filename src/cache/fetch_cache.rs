use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

use super::CacheKey;
use crate::error::AppResult;

/// Default TTL for catalog queries
pub const CATALOG_TTL: Duration = Duration::from_secs(300); // 5 minutes
/// Default TTL for rarely-changing reference data such as genre lists
pub const REFERENCE_TTL: Duration = Duration::from_secs(3600); // 1 hour

struct CacheEntry {
    value: Value,
    stored_at: Instant,
    expires_at: Instant,
}

/// In-process cache for catalog responses.
///
/// Entries are evicted lazily: a read that finds an expired entry removes it
/// and reports a miss, and every write drops whatever has already expired.
/// There is no background sweep. Clones share the same
/// underlying map, so one instance can be injected into several consumers.
#[derive(Clone, Default)]
pub struct FetchCache {
    entries: Arc<Mutex<HashMap<String, CacheEntry>>>,
}

impl FetchCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Retrieves a value from the cache by key
    ///
    /// Returns `None` when the key is absent or its entry has expired.
    /// A stored value that no longer deserializes as `T` is an error.
    pub fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> AppResult<Option<T>> {
        let value = {
            let mut entries = self.entries();
            let now = Instant::now();

            match entries.get(key.as_str()) {
                Some(entry) if now >= entry.expires_at => {
                    entries.remove(key.as_str());
                    tracing::debug!(key = %key, "Cache entry expired");
                    return Ok(None);
                }
                Some(entry) => {
                    tracing::debug!(
                        key = %key,
                        age_ms = now.duration_since(entry.stored_at).as_millis() as u64,
                        "Cache hit"
                    );
                    entry.value.clone()
                }
                None => {
                    tracing::debug!(key = %key, "Cache miss");
                    return Ok(None);
                }
            }
        };

        Ok(Some(serde_json::from_value(value)?))
    }

    /// Stores a value, overwriting any existing entry for the key with a fresh expiry
    pub fn set<T: Serialize>(&self, key: &CacheKey, value: &T, ttl: Duration) {
        let value = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(key = %key, error = %e, "Cache serialization error");
                return;
            }
        };

        let stored_at = Instant::now();
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|_, entry| stored_at < entry.expires_at);
        if entries.len() < before {
            tracing::debug!(pruned = before - entries.len(), "Pruned expired cache entries");
        }
        entries.insert(
            key.as_str().to_string(),
            CacheEntry {
                value,
                stored_at,
                expires_at: stored_at + ttl,
            },
        );
    }

    /// Removes every key containing `pattern`, or everything when `pattern` is `None`.
    ///
    /// Returns the number of entries removed.
    pub fn invalidate(&self, pattern: Option<&str>) -> usize {
        let mut entries = self.entries();
        let before = entries.len();

        match pattern {
            Some(pattern) => entries.retain(|key, _| !key.contains(pattern)),
            None => entries.clear(),
        }

        let removed = before - entries.len();
        tracing::debug!(pattern = ?pattern, removed, "Cache invalidated");
        removed
    }

    /// Number of stored entries, including expired ones not yet read or pruned
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
