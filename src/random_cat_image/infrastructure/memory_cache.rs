use crate::domain::cache_store_trait::CacheStore;
use crate::domain::clock::Clock;
use crate::domain::error::FetchError;
use chrono::{DateTime, Local};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

struct Entry {
    value: String,
    expires_at: DateTime<Local>,
}

/// Process-local [`CacheStore`]. The map lock is held while a value is
/// computed, so a cold key is computed at most once even under concurrent
/// callers. The lock is global: while one fetch is in flight every other
/// caller waits, whatever its key, for up to that fetch's timeout.
pub struct InMemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl InMemoryCache {
    pub fn new(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheStore for InMemoryCache {
    fn remember(
        &self,
        key: &str,
        ttl: chrono::Duration,
        compute: &mut dyn FnMut() -> Result<String, FetchError>,
    ) -> Result<String, FetchError> {
        // A poisoned lock only means another caller panicked mid-compute;
        // the map itself is still consistent.
        let mut entries = self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let now = self.clock.now();
        entries.retain(|_, entry| entry.expires_at > now);

        if let Some(entry) = entries.get(key) {
            tracing::debug!(key, "cache hit");
            return Ok(entry.value.clone());
        }

        tracing::debug!(key, "cache miss");
        let value = compute()?;
        if ttl > chrono::Duration::zero() {
            if let Some(expires_at) = now.checked_add_signed(ttl) {
                entries.insert(
                    key.to_string(),
                    Entry {
                        value: value.clone(),
                        expires_at,
                    },
                );
            }
        }
        Ok(value)
    }
}
