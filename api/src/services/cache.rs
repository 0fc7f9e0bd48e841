//! In-memory result cache keyed by (domain, normalized location).
//!
//! Entries expire after the domain's TTL. Expiry is checked lazily when an
//! entry is read; there is no background sweeper.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::Domain;
use crate::services::gazetteer::normalize_query;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

pub struct InsightCache<V> {
    clock: Arc<dyn Clock>,
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
}

impl<V: Clone> InsightCache<V> {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn cache_key(domain: Domain, location: &str) -> String {
        format!("{}:{}", domain, normalize_query(location))
    }

    pub async fn get(&self, domain: Domain, location: &str) -> Option<V> {
        let key = Self::cache_key(domain, location);
        let now = self.clock.now();

        {
            let entries = self.entries.read().await;
            match entries.get(&key) {
                Some(entry) if entry.expires_at > now => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // Expired: re-check under the write lock, a concurrent insert may have
        // refreshed it in between.
        let mut entries = self.entries.write().await;
        match entries.get(&key) {
            Some(entry) if entry.expires_at > now => Some(entry.value.clone()),
            Some(_) => {
                tracing::debug!("Cache entry {} expired", key);
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    /// Store `value` for the domain's TTL. Last writer wins.
    pub async fn insert(&self, domain: Domain, location: &str, value: V) {
        let key = Self::cache_key(domain, location);
        let expires_at = self.clock.now() + domain.cache_ttl();
        self.entries
            .write()
            .await
            .insert(key, CacheEntry { value, expires_at });
    }

    /// Number of stored entries, expired ones included until next read.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

/// Clock that only moves when told to.
#[cfg(test)]
pub(crate) struct ManualClock {
    now: std::sync::Mutex<DateTime<Utc>>,
}

#[cfg(test)]
impl ManualClock {
    pub(crate) fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: std::sync::Mutex::new(start),
        }
    }

    pub(crate) fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}
