// Time-bounded cache of fused recommendation lists
use crate::fusion::Recommendation;
use ahash::AHashMap;
use chrono::{DateTime, Duration, Utc};
use hybridrec_core::UserId;
use serde::Serialize;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<Recommendation>,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStatistics {
    pub entries: usize,
    pub users: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Recommendation cache keyed by (user, requested count).
///
/// Entries for one user live under a single map so invalidating a user touches
/// only that user's entries. Expiry is checked lazily on read.
#[derive(Debug, Clone)]
pub struct RecommendationCache {
    ttl: Duration,
    entries: AHashMap<UserId, AHashMap<usize, CacheEntry>>,
    hits: u64,
    misses: u64,
}

impl RecommendationCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: AHashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached list for `(user, n)` if one exists and has not expired at `now`.
    /// An expired entry is dropped.
    pub fn get(&mut self, user: &UserId, n: usize, now: DateTime<Utc>) -> Option<Vec<Recommendation>> {
        let Some(per_user) = self.entries.get_mut(user) else {
            self.misses += 1;
            return None;
        };

        match per_user.get(&n) {
            Some(entry) if now < entry.expires_at => {
                self.hits += 1;
                return Some(entry.value.clone());
            }
            Some(_) => {
                per_user.remove(&n);
            }
            None => {}
        }
        if per_user.is_empty() {
            self.entries.remove(user);
        }
        self.misses += 1;
        None
    }

    /// Store a list, replacing any entry for the same key
    pub fn insert(&mut self, user: UserId, n: usize, value: Vec<Recommendation>, now: DateTime<Utc>) {
        let entry = CacheEntry {
            value,
            expires_at: now.checked_add_signed(self.ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        };
        self.entries.entry(user).or_default().insert(n, entry);
    }

    /// Drop every entry for `user`. Returns the number of entries removed.
    pub fn invalidate_user(&mut self, user: &UserId) -> usize {
        self.entries.remove(user).map_or(0, |per_user| per_user.len())
    }

    /// Drop every entry expired at `now`. Returns the number of entries removed.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, per_user| {
            let before = per_user.len();
            per_user.retain(|_, entry| now < entry.expires_at);
            removed += before - per_user.len();
            !per_user.is_empty()
        });
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(|per_user| per_user.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn statistics(&self) -> CacheStatistics {
        CacheStatistics {
            entries: self.len(),
            users: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }
}

impl Default for RecommendationCache {
    fn default() -> Self {
        Self::new(Duration::hours(1))
    }
}
