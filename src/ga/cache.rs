//! Concurrent fitness cache.
//!
//! Maps a chromosome's [`CacheKey`] to its fitness so identical timetables
//! (elites, unchanged clones, repeated offspring) are scored once.
//!
//! The map sits behind a `parking_lot::RwLock`; lookups take the read
//! lock, inserts the write lock. Fitness is computed outside any lock, so
//! two workers racing on the same key may both compute it; the values are
//! identical and the second insert is a no-op.
//!
//! A bounded cache evicts in insertion order (oldest first) once it holds
//! more than `max_entries` keys.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use super::CacheKey;

#[derive(Debug, Default)]
struct CacheInner {
    map: HashMap<CacheKey, f64>,
    order: VecDeque<CacheKey>,
}

/// Thread-safe fitness memo shared by all evaluation workers.
#[derive(Debug, Default)]
pub struct FitnessCache {
    inner: RwLock<CacheInner>,
    max_entries: Option<usize>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl FitnessCache {
    /// Creates an unbounded cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cache holding at most `max_entries` keys (at least 1).
    pub fn bounded(max_entries: usize) -> Self {
        Self {
            max_entries: Some(max_entries.max(1)),
            ..Self::default()
        }
    }

    /// Creates a cache from an optional bound; `None` is unbounded.
    pub fn with_capacity(max_entries: Option<usize>) -> Self {
        match max_entries {
            Some(n) => Self::bounded(n),
            None => Self::new(),
        }
    }

    /// Configured bound, if any.
    pub fn max_entries(&self) -> Option<usize> {
        self.max_entries
    }

    /// Cached fitness for `key`. Counts a hit or a miss.
    pub fn get(&self, key: &CacheKey) -> Option<f64> {
        let found = self.inner.read().map.get(key).copied();
        match found {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        found
    }

    /// Stores a fitness value, evicting the oldest entries past the bound.
    ///
    /// Re-inserting an existing key keeps its first position and value.
    pub fn insert(&self, key: CacheKey, fitness: f64) {
        let mut inner = self.inner.write();
        if inner.map.contains_key(&key) {
            return;
        }
        inner.map.insert(key, fitness);
        inner.order.push_back(key);

        if let Some(max) = self.max_entries {
            while inner.map.len() > max {
                let Some(oldest) = inner.order.pop_front() else {
                    break;
                };
                inner.map.remove(&oldest);
            }
        }
    }

    /// Returns the cached fitness or computes, stores and returns it.
    pub fn get_or_compute<F>(&self, key: CacheKey, compute: F) -> f64
    where
        F: FnOnce() -> f64,
    {
        if let Some(fitness) = self.get(&key) {
            return fitness;
        }
        let fitness = compute();
        self.insert(key, fitness);
        fitness
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.inner.read().map.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every entry and resets the counters.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.map.clear();
        inner.order.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    /// Lookups answered from the cache.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Lookups that required computing.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Fraction of lookups answered from the cache; 0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits();
        let total = hits + self.misses();
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::Chromosome;
    use crate::models::Session;
    use rayon::prelude::*;
    use std::sync::atomic::AtomicUsize;

    fn key(slot: usize) -> CacheKey {
        CacheKey::of(&[Session::new(0, 0, 0, slot)])
    }

    #[test]
    fn test_get_or_compute_memoizes() {
        let cache = FitnessCache::new();
        let calls = AtomicUsize::new(0);
        let compute = || {
            calls.fetch_add(1, Ordering::SeqCst);
            0.75
        };

        assert_eq!(cache.get_or_compute(key(1), compute), 0.75);
        assert_eq!(cache.get_or_compute(key(1), compute), 0.75);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);
        assert!((cache.hit_rate() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_bounded_evicts_oldest() {
        let cache = FitnessCache::bounded(2);
        cache.insert(key(1), 0.1);
        cache.insert(key(2), 0.2);
        cache.insert(key(3), 0.3);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&key(1)), None);
        assert_eq!(cache.get(&key(2)), Some(0.2));
        assert_eq!(cache.get(&key(3)), Some(0.3));
    }

    #[test]
    fn test_reinsert_keeps_first_value() {
        let cache = FitnessCache::bounded(2);
        cache.insert(key(1), 0.1);
        cache.insert(key(1), 0.9);
        cache.insert(key(2), 0.2);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&key(1)), Some(0.1));
    }

    #[test]
    fn test_unbounded_and_clear() {
        let cache = FitnessCache::with_capacity(None);
        assert!(cache.max_entries().is_none());
        for slot in 0..100 {
            cache.insert(key(slot), slot as f64);
        }
        assert_eq!(cache.len(), 100);
        let _ = cache.get(&key(0));

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.hits(), 0);
        assert_eq!(cache.hit_rate(), 0.0);
    }

    #[test]
    fn test_equal_chromosomes_share_entry() {
        let cache = FitnessCache::new();
        let a = Chromosome::new(vec![Session::new(0, 1, 2, 3)]);
        let b = a.clone();
        cache.insert(a.key(), 0.6);
        assert_eq!(cache.get(&b.key()), Some(0.6));
    }

    #[test]
    fn test_concurrent_access() {
        let cache = FitnessCache::bounded(64);
        let values: Vec<f64> = (0..1000usize)
            .into_par_iter()
            .map(|i| {
                let slot = i % 100;
                cache.get_or_compute(key(slot), || slot as f64 / 100.0)
            })
            .collect();

        for (i, v) in values.iter().enumerate() {
            assert_eq!(*v, (i % 100) as f64 / 100.0);
        }
        assert!(cache.len() <= 64);
        assert_eq!(cache.hits() + cache.misses(), 1000);
    }
}
