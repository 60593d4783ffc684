//! Lookup-or-compute cache with per-entry expiry.
//!
//! Entries are stored as `key -> (value, expires_at)`. An entry without an
//! expiry lives until it is invalidated or the cache is dropped.

use std::collections::HashMap;
use std::convert::Infallible;
use std::hash::Hash;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Slot<V> {
    value: V,
    expires_at: Option<Instant>,
}

impl<V> Slot<V> {
    fn is_fresh(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

#[derive(Debug, Clone)]
pub struct TtlCache<K, V> {
    ttl: Option<Duration>,
    entries: HashMap<K, Slot<V>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Cache whose entries expire `ttl` after insertion.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl: Some(ttl),
            entries: HashMap::new(),
        }
    }

    /// Cache whose entries never expire.
    pub fn forever() -> Self {
        Self {
            ttl: None,
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Fresh value for `key`, dropping it first if it has expired.
    pub fn get(&mut self, key: &K) -> Option<V> {
        let now = Instant::now();
        match self.entries.get(key) {
            Some(slot) if slot.is_fresh(now) => Some(slot.value.clone()),
            Some(_) => {
                self.entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&mut self, key: K, value: V) {
        let expires_at = self.ttl.map(|ttl| Instant::now() + ttl);
        self.entries.insert(key, Slot { value, expires_at });
    }

    /// Return the cached value, or compute, store and return a new one.
    pub fn get_or_insert_with<F>(&mut self, key: K, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        match self.try_get_or_insert_with(key, || Ok::<V, Infallible>(compute())) {
            Ok(v) => v,
            Err(never) => match never {},
        }
    }

    /// Fallible variant of [`get_or_insert_with`](Self::get_or_insert_with); errors are not cached.
    pub fn try_get_or_insert_with<F, E>(&mut self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(v) = self.get(&key) {
            log::debug!("cache hit");
            return Ok(v);
        }
        log::debug!("cache miss");
        let v = compute()?;
        self.insert(key, v.clone());
        Ok(v)
    }

    pub fn invalidate(&mut self, key: &K) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn computes_once_within_ttl() {
        let calls = Cell::new(0);
        let mut cache = TtlCache::with_ttl(Duration::from_secs(3600));
        for _ in 0..3 {
            let v = cache.get_or_insert_with("k", || {
                calls.set(calls.get() + 1);
                42
            });
            assert_eq!(v, 42);
        }
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn zero_ttl_recomputes_every_time() {
        let calls = Cell::new(0);
        let mut cache = TtlCache::with_ttl(Duration::ZERO);
        for i in 0..3 {
            let v = cache.get_or_insert_with("k", || {
                calls.set(calls.get() + 1);
                i
            });
            assert_eq!(v, i);
        }
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn forever_entries_survive_and_invalidate_drops_them() {
        let mut cache: TtlCache<&str, u8> = TtlCache::forever();
        cache.insert("a", 1);
        assert_eq!(cache.get(&"a"), Some(1));
        assert!(cache.invalidate(&"a"));
        assert_eq!(cache.get(&"a"), None);
        assert!(!cache.invalidate(&"a"));
    }

    #[test]
    fn errors_are_not_cached() {
        let mut cache: TtlCache<&str, u8> = TtlCache::forever();
        let r: Result<u8, &str> = cache.try_get_or_insert_with("a", || Err("boom"));
        assert!(r.is_err());
        assert!(cache.is_empty());
        let r: Result<u8, &str> = cache.try_get_or_insert_with("a", || Ok(7));
        assert_eq!(r, Ok(7));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn both_lookups_share_entries() {
        let calls = Cell::new(0);
        let mut cache = TtlCache::with_ttl(Duration::from_secs(3600));
        let v = cache.get_or_insert_with("k", || {
            calls.set(calls.get() + 1);
            5
        });
        assert_eq!(v, 5);
        let r: Result<u8, &str> = cache.try_get_or_insert_with("k", || {
            calls.set(calls.get() + 1);
            Err("not called")
        });
        assert_eq!(r, Ok(5));
        assert_eq!(calls.get(), 1);
    }
}
