use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use crate::clock::Clock;

#[derive(Debug, Clone, Copy)]
struct CachedStatus {
    enabled: bool,
    expires_at: DateTime<Utc>,
}

/// Short-lived cache of each user's enabled flag, consulted on every
/// authenticated request.
///
/// Owned by application state and passed to whoever needs it. Entries expire
/// `ttl` after insertion as measured by the injected [`Clock`]. When full,
/// expired entries are purged first and then the entry closest to expiry is
/// evicted.
#[derive(Debug)]
pub struct UserStatusCache {
    entries: DashMap<String, CachedStatus>,
    ttl: Duration,
    capacity: usize,
    clock: Arc<dyn Clock>,
}

impl UserStatusCache {
    pub fn new(ttl: Duration, capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            capacity: capacity.max(1),
            clock,
        }
    }

    /// `None` on a miss or when the cached value has expired.
    pub fn get(&self, username: &str) -> Option<bool> {
        let now = self.clock.now();
        let cached = *self.entries.get(username)?;
        if cached.expires_at <= now {
            self.entries
                .remove_if(username, |_, status| status.expires_at <= now);
            return None;
        }
        Some(cached.enabled)
    }

    pub fn insert(&self, username: &str, enabled: bool) {
        let now = self.clock.now();
        if !self.entries.contains_key(username)
            && self.entries.len() >= self.capacity
        {
            self.make_room(now);
        }
        self.entries.insert(
            username.to_string(),
            CachedStatus {
                enabled,
                expires_at: now + self.ttl,
            },
        );
    }

    pub fn invalidate(&self, username: &str) {
        self.entries.remove(username);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn make_room(&self, now: DateTime<Utc>) {
        self.entries.retain(|_, status| status.expires_at > now);
        if self.entries.len() < self.capacity {
            return;
        }

        let oldest = self
            .entries
            .iter()
            .min_by_key(|entry| entry.value().expires_at)
            .map(|entry| entry.key().clone());
        if let Some(username) = oldest {
            self.entries.remove(&username);
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::clock::ManualClock;

    fn cache(capacity: usize) -> (UserStatusCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
        ));
        let cache = UserStatusCache::new(Duration::seconds(60), capacity, clock.clone());
        (cache, clock)
    }

    #[test]
    fn entries_expire_after_ttl() {
        let (cache, clock) = cache(8);
        cache.insert("ada", false);

        clock.advance(Duration::seconds(59));
        assert_eq!(cache.get("ada"), Some(false));

        clock.advance(Duration::seconds(1));
        assert_eq!(cache.get("ada"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn invalidate_drops_the_entry() {
        let (cache, _clock) = cache(8);
        cache.insert("ada", true);
        cache.invalidate("ada");
        assert_eq!(cache.get("ada"), None);
    }

    #[test]
    fn full_cache_evicts_closest_to_expiry() {
        let (cache, clock) = cache(2);
        cache.insert("ada", true);
        clock.advance(Duration::seconds(10));
        cache.insert("bob", true);
        clock.advance(Duration::seconds(10));
        cache.insert("cy", false);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("ada"), None);
        assert_eq!(cache.get("bob"), Some(true));
        assert_eq!(cache.get("cy"), Some(false));
    }

    #[test]
    fn full_cache_prefers_purging_expired_entries() {
        let (cache, clock) = cache(2);
        cache.insert("ada", true);
        clock.advance(Duration::seconds(30));
        cache.insert("bob", true);
        clock.advance(Duration::seconds(31));
        cache.insert("cy", true);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("bob"), Some(true));
        assert_eq!(cache.get("cy"), Some(true));
    }

    #[test]
    fn refreshing_an_existing_entry_does_not_evict() {
        let (cache, _clock) = cache(1);
        cache.insert("ada", true);
        cache.insert("ada", false);
        assert_eq!(cache.get("ada"), Some(false));
    }
}
