use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Request-level counters shared by an adapter and its batch tasks.
///
/// With the `metrics` feature enabled every update is also forwarded to the
/// `metrics` facade.
#[derive(Debug, Default)]
pub struct CacheMetrics {
    requests: AtomicU64,
    chunk_hits: AtomicU64,
    chunk_misses: AtomicU64,
    batches_dispatched: AtomicU64,
    batches_failed: AtomicU64,
    chunks_stored: AtomicU64,
}

/// Point-in-time copy of [`CacheMetrics`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub taken_at: DateTime<Utc>,
    pub requests: u64,
    pub chunk_hits: u64,
    pub chunk_misses: u64,
    pub hit_rate: f64,
    pub batches_dispatched: u64,
    pub batches_failed: u64,
    pub chunks_stored: u64,
}

impl CacheMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one split: how many chunks were resident and how many were not.
    pub fn record_request(&self, cached_chunks: u64, missing_chunks: u64) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.chunk_hits.fetch_add(cached_chunks, Ordering::Relaxed);
        self.chunk_misses.fetch_add(missing_chunks, Ordering::Relaxed);

        #[cfg(feature = "metrics")]
        {
            metrics::counter!("genome_region_cache.requests", 1);
            metrics::counter!("genome_region_cache.chunk_hits", cached_chunks);
            metrics::counter!("genome_region_cache.chunk_misses", missing_chunks);
        }
    }

    pub fn record_batch_dispatched(&self) {
        self.batches_dispatched.fetch_add(1, Ordering::Relaxed);

        #[cfg(feature = "metrics")]
        metrics::counter!("genome_region_cache.batches_dispatched", 1);
    }

    pub fn record_batch_failed(&self) {
        self.batches_failed.fetch_add(1, Ordering::Relaxed);

        #[cfg(feature = "metrics")]
        metrics::counter!("genome_region_cache.batches_failed", 1);
    }

    pub fn record_chunks_stored(&self, count: u64) {
        self.chunks_stored.fetch_add(count, Ordering::Relaxed);

        #[cfg(feature = "metrics")]
        metrics::counter!("genome_region_cache.chunks_stored", count);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let chunk_hits = self.chunk_hits.load(Ordering::Relaxed);
        let chunk_misses = self.chunk_misses.load(Ordering::Relaxed);
        let total = chunk_hits + chunk_misses;

        MetricsSnapshot {
            taken_at: Utc::now(),
            requests: self.requests.load(Ordering::Relaxed),
            chunk_hits,
            chunk_misses,
            hit_rate: if total > 0 {
                chunk_hits as f64 / total as f64
            } else {
                0.0
            },
            batches_dispatched: self.batches_dispatched.load(Ordering::Relaxed),
            batches_failed: self.batches_failed.load(Ordering::Relaxed),
            chunks_stored: self.chunks_stored.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_hit_rate() {
        let metrics = CacheMetrics::new();
        assert_eq!(metrics.snapshot().hit_rate, 0.0);

        metrics.record_request(3, 1);
        metrics.record_batch_dispatched();
        metrics.record_chunks_stored(1);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.requests, 1);
        assert_eq!(snapshot.hit_rate, 0.75);
        assert_eq!(snapshot.batches_dispatched, 1);
        assert_eq!(snapshot.batches_failed, 0);
        assert_eq!(snapshot.chunks_stored, 1);
    }

    #[test]
    fn test_snapshot_serializes() {
        let metrics = CacheMetrics::new();
        metrics.record_batch_failed();

        let json = serde_json::to_string(&metrics.snapshot()).unwrap();
        let back: MetricsSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.batches_failed, 1);
    }
}
