//! Resolver counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Snapshot of what a resolver has done since it was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolverStats {
    /// Resolutions answered from the cache.
    pub cache_hits: u64,
    /// Resolutions with an advertised hash that was not cached.
    pub cache_misses: u64,
    /// disco#info queries handed to the transport.
    pub queries_sent: u64,
    /// Resolutions that joined a query already in flight for the same hash.
    pub queries_deduplicated: u64,
    /// Resolutions that produced no record.
    pub failures: u64,
    /// Replies whose recomputed hash differed from the advertised one.
    pub hash_mismatches: u64,
}

impl ResolverStats {
    /// Creates empty stats.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the fraction of hashed resolutions served from the cache.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_ratio(&self) -> f64 {
        let lookups = self.cache_hits + self.cache_misses;
        if lookups == 0 {
            0.0
        } else {
            self.cache_hits as f64 / lookups as f64
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    queries_sent: AtomicU64,
    queries_deduplicated: AtomicU64,
    failures: AtomicU64,
    hash_mismatches: AtomicU64,
}

impl StatsCounters {
    pub(crate) fn cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn query_sent(&self) {
        self.queries_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn query_deduplicated(&self) {
        self.queries_deduplicated.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn hash_mismatch(&self) {
        self.hash_mismatches.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> ResolverStats {
        ResolverStats {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            queries_sent: self.queries_sent.load(Ordering::Relaxed),
            queries_deduplicated: self.queries_deduplicated.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            hash_mismatches: self.hash_mismatches.load(Ordering::Relaxed),
        }
    }
}
