use crate::{
    error::StoreResult,
    repository::UserRepository,
    utils::{username_cache::UsernameCache, username_filter::UsernameFilter},
};
use anyhow::{Result, anyhow};
use futures::StreamExt;
use sqlx::MySqlPool;
use tracing::warn;

/// Advisory "is this username taken?" lookup in front of the users table.
/// The unique index on `users.username` remains the source of truth.
pub struct UsernameIndex {
    filter: UsernameFilter,
    cache: UsernameCache,
}

impl Default for UsernameIndex {
    fn default() -> Self {
        Self::new(UsernameFilter::default(), UsernameCache::default())
    }
}

impl UsernameIndex {
    pub fn new(filter: UsernameFilter, cache: UsernameCache) -> Self {
        Self { filter, cache }
    }

    /// true  => username AVAILABLE
    /// false => username TAKEN
    pub async fn is_available(&self, username: &str, users: &dyn UserRepository) -> StoreResult<bool> {
        // 1️⃣ Cuckoo filter: fast negative
        if !self.filter.might_exist(username) {
            return Ok(true);
        }

        // 2️⃣ Moka cache: fast positive
        if self.cache.is_taken(username).await {
            return Ok(false);
        }

        // 3️⃣ Database fallback
        let exists = users.username_exists(username).await?;
        if exists {
            self.cache.mark_taken(username).await;
        }
        Ok(!exists)
    }

    pub async fn mark_taken(&self, username: &str) {
        self.filter.insert(username);
        self.cache.mark_taken(username).await;
    }

    pub async fn forget(&self, username: &str) {
        self.filter.remove(username);
        self.cache.forget(username).await;
    }

    /// Warm up the index using streaming + batching
    pub async fn warmup(&self, pool: &MySqlPool, batch_size: usize) -> Result<()> {
        let mut stream = sqlx::query_as::<_, (String,)>("SELECT username FROM users").fetch(pool);

        let mut batch = Vec::with_capacity(batch_size);
        let mut total = 0usize;

        while let Some(row) = stream.next().await {
            let (username,) = row.map_err(|e| anyhow!("DB row fetch failed: {}", e))?;

            batch.push(username);
            total += 1;

            if batch.len() == batch_size {
                self.load_batch(&batch).await;
                batch.clear();
            }
        }

        if !batch.is_empty() {
            self.load_batch(&batch).await;
        }

        log::info!("Username index warmup complete: {} users", total);
        Ok(())
    }

    async fn load_batch(&self, usernames: &[String]) {
        self.filter.insert_batch(usernames);
        self.cache.batch_mark(usernames).await;
    }
}

/// Runs the warmup and logs instead of failing; until it completes the
/// index falls through to the database.
pub async fn warmup_in_background(index: std::sync::Arc<UsernameIndex>, pool: MySqlPool) {
    if let Err(e) = index.warmup(&pool, 500).await {
        warn!(error = %e, "Failed to warm up username index");
    }
}
