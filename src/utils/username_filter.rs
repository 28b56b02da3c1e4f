use autoscale_cuckoo_filter::CuckooFilter;
use std::sync::{PoisonError, RwLock};

/// Expected capacity and false-positive rate.
/// Tune these based on real user counts.
const FILTER_CAPACITY: usize = 100_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

#[inline]
pub fn normalize(username: &str) -> String {
    username.trim().to_lowercase()
}

/// Probabilistic set of taken usernames. A negative answer is definitive,
/// a positive one must be confirmed elsewhere.
pub struct UsernameFilter {
    inner: RwLock<CuckooFilter<String>>,
}

impl Default for UsernameFilter {
    fn default() -> Self {
        Self::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)
    }
}

impl UsernameFilter {
    pub fn new(capacity: usize, false_positive_rate: f64) -> Self {
        Self {
            inner: RwLock::new(CuckooFilter::new(capacity, false_positive_rate)),
        }
    }

    /// Check if a username might exist (false positives possible)
    pub fn might_exist(&self, username: &str) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&normalize(username))
    }

    pub fn insert(&self, username: &str) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .add(&normalize(username));
    }

    pub fn remove(&self, username: &str) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&normalize(username));
    }

    /// Insert a batch of usernames under a single write lock
    pub fn insert_batch(&self, usernames: &[String]) {
        let mut filter = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        for username in usernames {
            filter.add(&normalize(username));
        }
    }
}
