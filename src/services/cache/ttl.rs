use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

/// In-process map whose entries expire after a fixed TTL.
///
/// Safe to share between requests; expired entries are dropped lazily on
/// the next `insert`.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    entries: RwLock<HashMap<K, (V, Instant)>>,
    ttl: Duration,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Live value for `key`, if any.
    pub async fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|(_, expires_at)| *expires_at > Instant::now())
            .map(|(value, _)| value.clone())
    }

    pub async fn insert(&self, key: K, value: V) {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, (_, expires_at)| *expires_at > now);
        entries.insert(key, (value, now + self.ttl));
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_value_within_ttl() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("k".to_string(), 1).await;
        assert_eq!(cache.get(&"k".to_string()).await, Some(1));
        assert_eq!(cache.get(&"other".to_string()).await, None);
    }

    #[tokio::test]
    async fn expired_value_is_not_returned() {
        let cache = TtlCache::new(Duration::from_millis(10));
        cache.insert("k", 1).await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(cache.get(&"k").await, None);
    }

    #[tokio::test]
    async fn insert_evicts_expired_entries() {
        let cache = TtlCache::new(Duration::from_millis(10));
        cache.insert("old", 1).await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        cache.insert("new", 2).await;
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn clear_drops_everything() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert(1u32, "a").await;
        cache.clear().await;
        assert_eq!(cache.get(&1).await, None);
    }
}
