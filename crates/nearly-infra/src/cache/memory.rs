//! In-memory TTL cache holding refresh-token sessions and password-reset codes.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use nearly_core::ports::{Cache, CacheError};

struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|exp| now > exp)
    }
}

/// In-memory cache using a HashMap behind an async RwLock.
///
/// Data is lost on process restart, which logs every client out.
pub struct InMemoryCache {
    store: RwLock<HashMap<String, CacheEntry>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
        }
    }

    /// Drop every expired entry. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut store = self.store.write().await;
        let before = store.len();
        store.retain(|_, entry| !entry.is_expired(now));
        before - store.len()
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        let store = self.store.read().await;
        let entry = store.get(key)?;

        if entry.is_expired(Instant::now()) {
            drop(store);
            let mut store = self.store.write().await;
            store.remove(key);
            return None;
        }

        Some(entry.value.clone())
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let mut store = self.store.write().await;

        store.insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at: ttl.map(|d| Instant::now() + d),
            },
        );

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut store = self.store.write().await;
        store.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> bool {
        self.get(key).await.is_some()
    }

    async fn increment(&self, key: &str, ttl: Option<Duration>) -> Result<u64, CacheError> {
        let now = Instant::now();
        let mut store = self.store.write().await;

        let current = match store.get(key) {
            Some(entry) if !entry.is_expired(now) => Some(entry),
            _ => None,
        };
        let (count, expires_at) = match current {
            Some(entry) => {
                let count = entry.value.parse::<u64>().map_err(|_| {
                    CacheError::Serialization(format!("{key} does not hold a counter"))
                })?;
                (count.saturating_add(1), entry.expires_at)
            }
            None => (1, ttl.map(|d| now + d)),
        };

        store.insert(
            key.to_string(),
            CacheEntry {
                value: count.to_string(),
                expires_at,
            },
        );
        Ok(count)
    }

    // One write lock so two concurrent takes cannot both see the value.
    async fn take(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut store = self.store.write().await;
        Ok(store
            .remove(key)
            .filter(|entry| !entry.is_expired(Instant::now()))
            .map(|entry| entry.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = InMemoryCache::new();
        cache.set("key1", "value1", None).await.unwrap();
        assert_eq!(cache.get("key1").await, Some("value1".to_string()));
    }

    #[tokio::test]
    async fn test_delete() {
        let cache = InMemoryCache::new();
        cache.set("key1", "value1", None).await.unwrap();
        cache.delete("key1").await.unwrap();
        assert_eq!(cache.get("key1").await, None);
    }

    #[tokio::test]
    async fn test_entry_expires() {
        let cache = InMemoryCache::new();
        cache
            .set("otp:ann@example.com", "123456", Some(Duration::from_millis(10)))
            .await
            .unwrap();
        assert!(cache.exists("otp:ann@example.com").await);

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(!cache.exists("otp:ann@example.com").await);
    }

    #[tokio::test]
    async fn test_take_is_single_use() {
        let cache = InMemoryCache::new();
        cache.set("refresh:abc", "user", None).await.unwrap();
        assert_eq!(cache.take("refresh:abc").await.unwrap(), Some("user".to_string()));
        assert_eq!(cache.take("refresh:abc").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_increment_counts_and_keeps_first_expiry() {
        let cache = InMemoryCache::new();
        let ttl = Some(Duration::from_millis(20));
        assert_eq!(cache.increment("otp_attempts:ann", ttl).await.unwrap(), 1);
        assert_eq!(cache.increment("otp_attempts:ann", None).await.unwrap(), 2);

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(cache.increment("otp_attempts:ann", ttl).await.unwrap(), 1);

        cache.set("name", "ann", None).await.unwrap();
        assert!(matches!(
            cache.increment("name", None).await,
            Err(CacheError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let cache = InMemoryCache::new();
        cache.set("a", "1", Some(Duration::from_millis(5))).await.unwrap();
        cache.set("b", "2", None).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(cache.purge_expired().await, 1);
        assert!(cache.exists("b").await);
    }
}
