use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::models::{ItemId, MetadataRecord};

/// Process-wide store for metadata records
///
/// Implementations swallow their own failures: a broken cache degrades to a
/// miss and never fails a recommendation.
#[async_trait::async_trait]
pub trait MetadataCache: Send + Sync {
    async fn get(&self, id: &ItemId) -> Option<MetadataRecord>;

    async fn put(&self, id: &ItemId, record: &MetadataRecord);

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

struct CacheEntry {
    record: MetadataRecord,
    inserted_at: Instant,
}

/// In-memory TTL cache shared by every in-flight request
#[derive(Clone)]
pub struct MemoryCache {
    entries: Arc<DashMap<ItemId, CacheEntry>>,
    ttl: Duration,
}

impl MemoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every expired entry, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|_, entry| entry.inserted_at.elapsed() < ttl);
        before.saturating_sub(self.entries.len())
    }

    /// Spawns a task that purges expired entries every `interval`
    pub fn spawn_sweeper(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let removed = cache.purge_expired();
                if removed > 0 {
                    tracing::debug!(removed, remaining = cache.len(), "Purged expired metadata");
                }
            }
        })
    }
}

#[async_trait::async_trait]
impl MetadataCache for MemoryCache {
    async fn get(&self, id: &ItemId) -> Option<MetadataRecord> {
        let expired = match self.entries.get(id) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                return Some(entry.record.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries
                .remove_if(id, |_, entry| entry.inserted_at.elapsed() >= self.ttl);
        }
        None
    }

    async fn put(&self, id: &ItemId, record: &MetadataRecord) {
        self.entries.insert(
            id.clone(),
            CacheEntry {
                record: record.clone(),
                inserted_at: Instant::now(),
            },
        );
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(summary: &str) -> MetadataRecord {
        MetadataRecord {
            categories: vec!["Drama".to_string()],
            score: Some(8.0),
            summary: summary.to_string(),
            release_year: Some(1994),
            artwork_url: None,
        }
    }

    #[test]
    fn test_put_then_get() {
        let cache = MemoryCache::new(Duration::from_secs(60));
        let id = ItemId::from("278");

        tokio_test::block_on(async {
            assert_eq!(cache.get(&id).await, None);
            cache.put(&id, &record("Two imprisoned men bond")).await;
            assert_eq!(cache.get(&id).await, Some(record("Two imprisoned men bond")));
        });
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_put_overwrites() {
        let cache = MemoryCache::new(Duration::from_secs(60));
        let id = ItemId::from("278");

        tokio_test::block_on(async {
            cache.put(&id, &record("old")).await;
            cache.put(&id, &record("new")).await;
            assert_eq!(cache.get(&id).await.unwrap().summary, "new");
        });
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let cache = MemoryCache::new(Duration::from_millis(20));
        let id = ItemId::from("680");

        cache.put(&id, &record("Pulp")).await;
        assert!(cache.get(&id).await.is_some());

        tokio::time::sleep(Duration::from_millis(40)).await;

        assert_eq!(cache.get(&id).await, None);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let cache = MemoryCache::new(Duration::from_millis(20));
        cache.put(&ItemId::from("1"), &record("a")).await;
        cache.put(&ItemId::from("2"), &record("b")).await;

        tokio::time::sleep(Duration::from_millis(40)).await;
        cache.put(&ItemId::from("3"), &record("c")).await;

        assert_eq!(cache.purge_expired(), 2);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_readers() {
        let cache = MemoryCache::new(Duration::from_secs(60));
        let id = ItemId::from("155");
        cache.put(&id, &record("Batman")).await;

        let mut tasks = Vec::new();
        for _ in 0..16 {
            let cache = cache.clone();
            let id = id.clone();
            tasks.push(tokio::spawn(async move { cache.get(&id).await }));
        }

        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap().summary, "Batman");
        }
    }
}
