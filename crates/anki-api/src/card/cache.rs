//! In-process cache for the cards-by-tag page.

use std::time::Duration;

use moka::future::Cache;
use serde_json::Value;

/// How long a rendered tag page is served from memory.
pub const TAG_PAGE_TTL: Duration = Duration::from_secs(15 * 60);

/// Upper bound on cached tag pages.
const MAX_CACHED_PAGES: u64 = 1_000;

/// Rendered tag pages keyed by tag id. Entries expire after a fixed TTL and
/// are not invalidated by card edits in the meantime.
#[derive(Debug, Clone)]
pub struct TagPageCache {
    ttl: Duration,
    pages: Cache<i32, Value>,
}

impl Default for TagPageCache {
    fn default() -> Self {
        Self::new(TAG_PAGE_TTL)
    }
}

impl TagPageCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            pages: Cache::builder()
                .max_capacity(MAX_CACHED_PAGES)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get(&self, tag_id: i32) -> Option<Value> {
        self.pages.get(&tag_id).await
    }

    pub async fn insert(&self, tag_id: i32, body: Value) {
        self.pages.insert(tag_id, body).await;
    }

    /// Drop the page of a tag that no longer exists.
    pub async fn invalidate(&self, tag_id: i32) {
        self.pages.invalidate(&tag_id).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_hit_within_ttl() {
        let cache = TagPageCache::default();
        cache.insert(7, json!({ "cards_count": 2 })).await;
        assert_eq!(cache.get(7).await, Some(json!({ "cards_count": 2 })));
        assert_eq!(cache.get(8).await, None);
    }

    #[tokio::test]
    async fn test_entry_expires() {
        let cache = TagPageCache::new(Duration::from_millis(50));
        cache.insert(1, json!([])).await;
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(cache.get(1).await, None);
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let cache = TagPageCache::default();
        let other = cache.clone();
        cache.insert(3, json!("page")).await;
        assert_eq!(other.get(3).await, Some(json!("page")));

        other.invalidate(3).await;
        assert_eq!(cache.get(3).await, None);
    }
}
