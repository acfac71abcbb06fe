//! Metrics collection for the interpretability service
//!
//! Tracks per-endpoint request counts, failures, and saliency cache
//! effectiveness. Exported in Prometheus text format via `GET /metrics`.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Central metrics collector shared across request handlers
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    /// Chat completions served
    chat_requests: Arc<AtomicUsize>,
    /// Saliency computations served (hits + misses)
    saliency_requests: Arc<AtomicUsize>,
    /// Saliency requests answered from the cache
    saliency_cache_hits: Arc<AtomicUsize>,
    /// Attention graph scenes served
    attention_requests: Arc<AtomicUsize>,
    /// Edges across all served scenes
    scene_edges_total: Arc<AtomicU64>,
    /// Failed requests across all endpoints
    failed_requests: Arc<AtomicUsize>,
    /// Start time for uptime reporting
    start_time: Instant,
}

impl MetricsCollector {
    /// Create a new metrics collector
    #[must_use]
    pub fn new() -> Self {
        Self {
            chat_requests: Arc::new(AtomicUsize::new(0)),
            saliency_requests: Arc::new(AtomicUsize::new(0)),
            saliency_cache_hits: Arc::new(AtomicUsize::new(0)),
            attention_requests: Arc::new(AtomicUsize::new(0)),
            scene_edges_total: Arc::new(AtomicU64::new(0)),
            failed_requests: Arc::new(AtomicUsize::new(0)),
            start_time: Instant::now(),
        }
    }

    /// Record a successful chat completion
    pub fn record_chat(&self) {
        self.chat_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a served saliency request
    pub fn record_saliency(&self, cache_hit: bool) {
        self.saliency_requests.fetch_add(1, Ordering::Relaxed);
        if cache_hit {
            self.saliency_cache_hits.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a served attention graph scene
    pub fn record_attention(&self, num_edges: usize) {
        self.attention_requests.fetch_add(1, Ordering::Relaxed);
        self.scene_edges_total
            .fetch_add(num_edges as u64, Ordering::Relaxed);
    }

    /// Record a failed request on any endpoint
    pub fn record_failure(&self) {
        self.failed_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Export metrics in Prometheus text format
    #[must_use]
    pub fn to_prometheus(&self) -> String {
        format!(
            "# HELP entender_chat_requests_total Chat completions served\n\
             # TYPE entender_chat_requests_total counter\n\
             entender_chat_requests_total {}\n\
             # HELP entender_saliency_requests_total Saliency requests served\n\
             # TYPE entender_saliency_requests_total counter\n\
             entender_saliency_requests_total {}\n\
             # HELP entender_saliency_cache_hits_total Saliency requests answered from cache\n\
             # TYPE entender_saliency_cache_hits_total counter\n\
             entender_saliency_cache_hits_total {}\n\
             # HELP entender_attention_requests_total Attention graph scenes served\n\
             # TYPE entender_attention_requests_total counter\n\
             entender_attention_requests_total {}\n\
             # HELP entender_scene_edges_total Edges across all served scenes\n\
             # TYPE entender_scene_edges_total counter\n\
             entender_scene_edges_total {}\n\
             # HELP entender_failed_requests_total Failed requests\n\
             # TYPE entender_failed_requests_total counter\n\
             entender_failed_requests_total {}\n\
             # HELP entender_uptime_seconds Process uptime\n\
             # TYPE entender_uptime_seconds gauge\n\
             entender_uptime_seconds {}\n",
            self.chat_requests.load(Ordering::Relaxed),
            self.saliency_requests.load(Ordering::Relaxed),
            self.saliency_cache_hits.load(Ordering::Relaxed),
            self.attention_requests.load(Ordering::Relaxed),
            self.scene_edges_total.load(Ordering::Relaxed),
            self.failed_requests.load(Ordering::Relaxed),
            self.start_time.elapsed().as_secs(),
        )
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let metrics = MetricsCollector::new();
        let text = metrics.to_prometheus();
        assert!(text.contains("entender_chat_requests_total 0"));
        assert!(text.contains("entender_failed_requests_total 0"));
    }

    #[test]
    fn test_record_chat() {
        let metrics = MetricsCollector::new();
        metrics.record_chat();
        metrics.record_chat();
        assert!(metrics.to_prometheus().contains("entender_chat_requests_total 2"));
    }

    #[test]
    fn test_record_saliency_with_hits() {
        let metrics = MetricsCollector::new();
        metrics.record_saliency(false);
        metrics.record_saliency(true);
        let text = metrics.to_prometheus();
        assert!(text.contains("entender_saliency_requests_total 2"));
        assert!(text.contains("entender_saliency_cache_hits_total 1"));
    }

    #[test]
    fn test_record_attention_accumulates_edges() {
        let metrics = MetricsCollector::new();
        metrics.record_attention(4);
        metrics.record_attention(5);
        let text = metrics.to_prometheus();
        assert!(text.contains("entender_attention_requests_total 2"));
        assert!(text.contains("entender_scene_edges_total 9"));
    }

    #[test]
    fn test_clone_shares_counters() {
        let metrics = MetricsCollector::new();
        let clone = metrics.clone();
        clone.record_failure();
        assert!(metrics.to_prometheus().contains("entender_failed_requests_total 1"));
    }
}
