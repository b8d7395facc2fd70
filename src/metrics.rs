//! Prometheus metrics for cache population
//!
//! Provides observability metrics for the population worker and cache reads.

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_gauge, register_histogram_vec, CounterVec, Encoder, Gauge,
    HistogramVec, TextEncoder,
};

lazy_static! {
    /// Histogram: upstream fetch duration by call (seconds)
    pub static ref FETCH_DURATION: HistogramVec = register_histogram_vec!(
        "dexcache_fetch_duration_seconds",
        "Duration of upstream fetches",
        &["call"],
        vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("Failed to create fetch_duration metric");

    /// Counter: upstream fetch failures by kind
    pub static ref FETCH_FAILURES: CounterVec = register_counter_vec!(
        "dexcache_fetch_failures_total",
        "Total upstream fetch failures by kind",
        &["call", "kind"]
    )
    .expect("Failed to create fetch_failures metric");

    /// Counter: population request outcomes
    pub static ref POPULATION_OUTCOMES: CounterVec = register_counter_vec!(
        "dexcache_population_outcomes_total",
        "Population request outcomes",
        &["outcome"]
    )
    .expect("Failed to create population_outcomes metric");

    /// Gauge: population queue depth
    pub static ref QUEUE_DEPTH: Gauge = register_gauge!(
        "dexcache_queue_depth",
        "Current depth of the population queue"
    )
    .expect("Failed to create queue_depth metric");

    /// Gauge: cached entry count
    pub static ref CACHED_ENTRIES: Gauge = register_gauge!(
        "dexcache_cached_entries",
        "Number of records in the cache"
    )
    .expect("Failed to create cached_entries metric");

    /// Counter: cache reads (hit/miss)
    pub static ref CACHE_OPERATIONS: CounterVec = register_counter_vec!(
        "dexcache_cache_operations_total",
        "Cache reads by result",
        &["operation"]
    )
    .expect("Failed to create cache_operations metric");

    /// Gauge: worker health status (1 = running, 0 = stopped)
    pub static ref HEALTH_STATUS: Gauge = register_gauge!(
        "dexcache_worker_health_status",
        "Population worker health status (1 = running, 0 = stopped)"
    )
    .expect("Failed to create health_status metric");
}

/// Record an upstream fetch duration
pub fn record_fetch_duration(call: &str, duration_secs: f64) {
    FETCH_DURATION.with_label_values(&[call]).observe(duration_secs);
}

/// Increment the fetch failure counter
pub fn record_fetch_failure(call: &str, kind: &str) {
    FETCH_FAILURES.with_label_values(&[call, kind]).inc();
}

/// Record the outcome of one population request (cached, duplicate, retried, dropped)
pub fn record_outcome(outcome: &str) {
    POPULATION_OUTCOMES.with_label_values(&[outcome]).inc();
}

/// Set population queue depth
pub fn set_queue_depth(depth: i64) {
    QUEUE_DEPTH.set(depth as f64);
}

/// Set cached entry count
pub fn set_cached_entries(count: i64) {
    CACHED_ENTRIES.set(count as f64);
}

/// Record cache hit
pub fn record_cache_hit() {
    CACHE_OPERATIONS.with_label_values(&["hit"]).inc();
}

/// Record cache miss
pub fn record_cache_miss() {
    CACHE_OPERATIONS.with_label_values(&["miss"]).inc();
}

/// Set health status
pub fn set_health_status(healthy: bool) {
    HEALTH_STATUS.set(if healthy { 1.0 } else { 0.0 });
}

/// Encode all metrics as Prometheus text format
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8_lossy(&buffer).into_owned()
}
