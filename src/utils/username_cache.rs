use crate::utils::username_filter::normalize;
use moka::future::Cache;
use std::time::Duration;

/// Confirmed-taken usernames with a TTL.
/// true  => username is TAKEN
#[derive(Clone)]
pub struct UsernameCache {
    inner: Cache<String, bool>,
}

impl Default for UsernameCache {
    fn default() -> Self {
        Self::new(500_000, Duration::from_secs(86400)) // 24h TTL
    }
}

impl UsernameCache {
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn mark_taken(&self, username: &str) {
        self.inner.insert(normalize(username), true).await;
    }

    pub async fn forget(&self, username: &str) {
        self.inner.invalidate(&normalize(username)).await;
    }

    pub async fn is_taken(&self, username: &str) -> bool {
        self.inner.get(&normalize(username)).await.unwrap_or(false)
    }

    /// Batch mark usernames as taken
    pub async fn batch_mark(&self, usernames: &[String]) {
        let futures: Vec<_> = usernames
            .iter()
            .map(|u| self.inner.insert(normalize(u), true))
            .collect();

        // Await all insertions concurrently
        futures::future::join_all(futures).await;
    }
}
