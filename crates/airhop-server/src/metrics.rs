//! Cache hit/miss counters per logical namespace.

use airhop_core::CacheNamespace;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
struct Counter {
    hits: AtomicU64,
    misses: AtomicU64,
}

#[derive(Debug, Default)]
pub struct CacheMetrics {
    airport: Counter,
    radius: Counter,
    neighbors: Counter,
    distance: Counter,
    route: Counter,
    country: Counter,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Percentage of lookups served from cache
    pub hit_rate: f64,
}

impl CacheStats {
    fn new(hits: u64, misses: u64) -> Self {
        let total = hits + misses;
        let hit_rate = if total > 0 {
            hits as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        Self {
            hits,
            misses,
            hit_rate,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheMetricsSnapshot {
    pub total: CacheStats,
    pub namespaces: BTreeMap<&'static str, CacheStats>,
}

impl CacheMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    fn counter(&self, namespace: CacheNamespace) -> &Counter {
        match namespace {
            CacheNamespace::Airport => &self.airport,
            CacheNamespace::Radius => &self.radius,
            CacheNamespace::Neighbors => &self.neighbors,
            CacheNamespace::Distance => &self.distance,
            CacheNamespace::Route => &self.route,
            CacheNamespace::Country => &self.country,
        }
    }

    pub fn record_hit(&self, namespace: CacheNamespace) {
        self.counter(namespace).hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self, namespace: CacheNamespace) {
        self.counter(namespace).misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a hit or a miss depending on whether a lookup produced a value.
    pub fn record<T>(&self, namespace: CacheNamespace, lookup: &Option<T>) {
        if lookup.is_some() {
            self.record_hit(namespace);
        } else {
            self.record_miss(namespace);
        }
    }

    pub fn stats(&self, namespace: CacheNamespace) -> CacheStats {
        let counter = self.counter(namespace);
        CacheStats::new(
            counter.hits.load(Ordering::Relaxed),
            counter.misses.load(Ordering::Relaxed),
        )
    }

    pub fn snapshot(&self) -> CacheMetricsSnapshot {
        let namespaces: BTreeMap<&'static str, CacheStats> = CacheNamespace::ALL
            .iter()
            .map(|ns| (ns.as_str(), self.stats(*ns)))
            .collect();
        let (hits, misses) = namespaces
            .values()
            .fold((0, 0), |(h, m), s| (h + s.hits, m + s.misses));
        CacheMetricsSnapshot {
            total: CacheStats::new(hits, misses),
            namespaces,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_per_namespace_and_total() {
        let metrics = CacheMetrics::new();
        metrics.record_hit(CacheNamespace::Route);
        metrics.record_miss(CacheNamespace::Route);
        metrics.record_miss(CacheNamespace::Neighbors);
        metrics.record(CacheNamespace::Distance, &Some(1.0));

        let route = metrics.stats(CacheNamespace::Route);
        assert_eq!(route.hits, 1);
        assert_eq!(route.misses, 1);
        assert!((route.hit_rate - 50.0).abs() < 1e-9);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total.hits, 2);
        assert_eq!(snapshot.total.misses, 2);
        assert_eq!(snapshot.namespaces["neighbors"].misses, 1);
        assert_eq!(snapshot.namespaces["airport"].hit_rate, 0.0);
    }
}
