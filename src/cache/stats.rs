//! Cache Statistics Module
//!
//! Tracks hits, misses, lazily observed expirations and invalidations.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Number of lookups that returned a usable live value
    pub hits: u64,
    /// Number of lookups that found nothing (absent, expired, or a value the
    /// reader discarded as undecodable)
    pub misses: u64,
    /// Number of expired entries dropped when a lookup ran into them
    pub expirations: u64,
    /// Number of explicit deletes that removed a present entry
    pub invalidations: u64,
    /// Current number of entries held, expired-but-unswept ones included
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Turns an already counted hit into a miss, for a value the caller
    /// could not use.
    pub fn reclassify_hit_as_miss(&mut self) {
        self.hits = self.hits.saturating_sub(1);
        self.misses += 1;
    }

    pub fn record_expiration(&mut self) {
        self.expirations += 1;
    }

    pub fn record_invalidation(&mut self) {
        self.invalidations += 1;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
